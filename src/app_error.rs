use crate::announcer::NarrationError;
use crate::config::ConfigError;
use crate::data_manager::DataError;
use crate::recipe_parser::RecipeError;
use crate::share::ShareError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppErrorKind {
    System,
    Data,
    Recipe,
    Narration,
    Share,
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppErrorPayload {
    pub kind: AppErrorKind,
    pub message: String,
    pub detail: Option<String>,
    pub recoverable: bool,
}

/// A user-facing failure: short message for display, detail for the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    kind: AppErrorKind,
    message: String,
    detail: Option<String>,
    recoverable: bool,
}

impl AppError {
    pub fn new(kind: AppErrorKind, message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            recoverable,
        }
    }

    pub fn with_detail(
        kind: AppErrorKind,
        message: impl Into<String>,
        detail: impl Into<String>,
        recoverable: bool,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: Some(detail.into()),
            recoverable,
        }
    }

    pub fn share_unsupported() -> Self {
        Self::new(
            AppErrorKind::Share,
            "Sharing not supported here. Time for a photo!",
            true,
        )
    }

    pub fn kind(&self) -> AppErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }

    pub fn payload(&self) -> AppErrorPayload {
        AppErrorPayload {
            kind: self.kind,
            message: self.message.clone(),
            detail: self.detail.clone(),
            recoverable: self.recoverable,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({detail})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for AppError {}

impl From<NarrationError> for AppError {
    fn from(error: NarrationError) -> Self {
        let detail = error.to_string();
        let message = match error {
            NarrationError::Unavailable(_) => {
                "Voice guidance is unavailable. Follow the steps on screen"
            }
            NarrationError::Failed(_) => "Could not read the step aloud",
        };
        Self::with_detail(AppErrorKind::Narration, message, detail, true)
    }
}

impl From<ShareError> for AppError {
    fn from(error: ShareError) -> Self {
        match error {
            ShareError::Unsupported => Self::share_unsupported(),
            ShareError::Failed(_) => Self::with_detail(
                AppErrorKind::Share,
                "Sharing failed",
                error.to_string(),
                true,
            ),
        }
    }
}

impl From<DataError> for AppError {
    fn from(error: DataError) -> Self {
        let detail = error.to_string();
        let message = match error {
            DataError::Io(_) => "Failed to read or write the recipe book",
            DataError::Serde(_) => "The recipe book file is not valid JSON",
            DataError::DateTime(_) => "Could not read a cook history date",
        };
        Self::with_detail(AppErrorKind::Data, message, detail, true)
    }
}

impl From<RecipeError> for AppError {
    fn from(error: RecipeError) -> Self {
        let detail = error.to_string();
        let message = match error {
            RecipeError::Empty => "The recipe text was empty",
            RecipeError::Json(_) | RecipeError::UnexpectedShape => {
                "The recipe could not be understood"
            }
            RecipeError::MissingName { .. } => "Every recipe needs a name",
            RecipeError::MissingAction { .. } => "Every step needs an instruction",
            RecipeError::InvalidTimer { .. } => "A step timer must be a whole number of seconds",
            RecipeError::MissingIngredientName { .. } => "Every ingredient needs a name",
            RecipeError::InvalidPrice { .. } => "An ingredient price must be a positive amount",
        };
        Self::with_detail(AppErrorKind::Recipe, message, detail, true)
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        Self::with_detail(
            AppErrorKind::Config,
            "The configuration could not be loaded",
            error.to_string(),
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, AppErrorKind};
    use crate::announcer::NarrationError;
    use crate::recipe_parser::RecipeError;
    use crate::share::ShareError;

    #[test]
    fn unsupported_share_becomes_photo_notice() {
        let error = AppError::from(ShareError::Unsupported);
        assert_eq!(error.kind(), AppErrorKind::Share);
        assert_eq!(
            error.message(),
            "Sharing not supported here. Time for a photo!"
        );
        assert!(error.detail().is_none());
        assert!(error.is_recoverable());
    }

    #[test]
    fn narration_error_keeps_detail() {
        let error = AppError::from(NarrationError::Unavailable("espeak".to_string()));
        assert_eq!(error.kind(), AppErrorKind::Narration);
        assert!(error.detail().unwrap_or_default().contains("espeak"));
    }

    #[test]
    fn payload_serializes_camel_case() {
        let error = AppError::from(RecipeError::MissingName { index: 2 });
        let json = serde_json::to_value(error.payload()).expect("serialize");
        assert_eq!(json["kind"], "recipe");
        assert_eq!(json["recoverable"], true);
        assert_eq!(json["detail"], "recipe 2 has no name");
    }
}
