use crate::announcer::SpeechMode;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "sous-chef.toml";
const ENV_PREFIX: &str = "SOUS_CHEF__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub speech: SpeechMode,
    pub speech_program: Option<String>,
    pub speech_rate: f32,
    pub voice: Option<String>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("sous-chef"),
            speech: SpeechMode::System,
            speech_program: None,
            speech_rate: 0.95,
            voice: None,
            log_filter: "sous_chef=info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    data_dir: Option<PathBuf>,
    speech: Option<SpeechMode>,
    speech_program: Option<String>,
    speech_rate: Option<f32>,
    voice: Option<String>,
    log_filter: Option<String>,
}

/// Defaults, then the config file, then `SOUS_CHEF__*` variables.
pub fn load_settings(explicit_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();
    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw, &path)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound && explicit_path.is_none() => {}
        Err(source) => return Err(ConfigError::Read { path, source }),
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str, path: &Path) -> Result<(), ConfigError> {
    let file: FileSettings = toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(v) = file.data_dir {
        settings.data_dir = v;
    }
    if let Some(v) = file.speech {
        settings.speech = v;
    }
    if let Some(v) = file.speech_program {
        settings.speech_program = non_blank(v);
    }
    if let Some(v) = file.speech_rate {
        settings.speech_rate = validate_rate("speech_rate", v)?;
    }
    if let Some(v) = file.voice {
        settings.voice = Some(v);
    }
    if let Some(v) = file.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

pub fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

    if let Some(v) = var("DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }
    if let Some(v) = var("SPEECH") {
        settings.speech = match v.trim().to_lowercase().as_str() {
            "system" | "on" => SpeechMode::System,
            "disabled" | "off" => SpeechMode::Disabled,
            _ => return Err(invalid("SPEECH", &v)),
        };
    }
    if let Some(v) = var("SPEECH_PROGRAM") {
        settings.speech_program = non_blank(v);
    }
    if let Some(v) = var("SPEECH_RATE") {
        let rate = v.trim().parse::<f32>().map_err(|_| invalid("SPEECH_RATE", &v))?;
        settings.speech_rate = validate_rate("SPEECH_RATE", rate)?;
    }
    if let Some(v) = var("VOICE") {
        settings.voice = non_blank(v);
    }
    if let Some(v) = var("LOG") {
        settings.log_filter = v;
    }
    Ok(())
}

fn validate_rate(key: &str, rate: f32) -> Result<f32, ConfigError> {
    if rate.is_finite() && (0.1..=4.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(invalid(key, &rate.to_string()))
    }
}

fn non_blank(value: String) -> Option<String> {
    Some(value).filter(|value| !value.trim().is_empty())
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
