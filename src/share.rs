use std::io::{self, Write};
use thiserror::Error;
use tracing::{info, warn};

pub trait ShareAction: Send {
    fn share(&mut self, title: &str, text: &str) -> Result<(), ShareError>;
}

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("sharing is not supported on this platform")]
    Unsupported,
    #[error("share failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareMessage {
    pub title: String,
    pub text: String,
}

impl ShareMessage {
    pub fn for_recipe(recipe_name: &str) -> Self {
        Self {
            title: format!("I just cooked {recipe_name}!"),
            text: format!(
                "Just finished making {recipe_name} with my AI Chef. It was so easy!"
            ),
        }
    }
}

pub fn share_message(action: &mut dyn ShareAction, message: &ShareMessage) -> Result<(), ShareError> {
    match action.share(&message.title, &message.text) {
        Ok(()) => {
            info!("shared \"{}\"", message.title);
            Ok(())
        }
        Err(ShareError::Unsupported) => {
            info!("sharing unsupported, falling back to notice");
            Err(ShareError::Unsupported)
        }
        Err(err) => {
            warn!("share failed: {err}");
            Err(err)
        }
    }
}

pub fn share_completion(
    action: &mut dyn ShareAction,
    recipe_name: &str,
) -> Result<ShareMessage, ShareError> {
    let message = ShareMessage::for_recipe(recipe_name);
    share_message(action, &message)?;
    Ok(message)
}

pub struct StdoutShare<W: Write + Send = io::Stdout> {
    out: W,
}

impl StdoutShare<io::Stdout> {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutShare<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> StdoutShare<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ShareAction for StdoutShare<W> {
    fn share(&mut self, title: &str, text: &str) -> Result<(), ShareError> {
        writeln!(self.out, "\n{title}\n{text}\n")
            .and_then(|_| self.out.flush())
            .map_err(|err| ShareError::Failed(err.to_string()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedShare;

impl ShareAction for UnsupportedShare {
    fn share(&mut self, _title: &str, _text: &str) -> Result<(), ShareError> {
        Err(ShareError::Unsupported)
    }
}
