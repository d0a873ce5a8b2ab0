use serde::{Deserialize, Serialize};
use std::io;
use std::process::{Child, Command, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

const BASE_WORDS_PER_MINUTE: f32 = 175.0;

#[cfg(target_os = "macos")]
const DEFAULT_PROGRAM: &str = "say";
#[cfg(not(target_os = "macos"))]
const DEFAULT_PROGRAM: &str = "espeak";

/// A new utterance always pre-empts the previous one.
pub trait Announcer: Send {
    fn speak(&mut self, text: &str) -> Result<(), NarrationError>;

    fn cancel(&mut self);
}

#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("speech engine unavailable: {0}")]
    Unavailable(String),
    #[error("speech engine failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechMode {
    #[default]
    System,
    Disabled,
}

#[derive(Debug)]
pub struct SpeechAnnouncer {
    muted: bool,
    mode: SpeechMode,
    program: Vec<String>,
    rate: f32,
    voice: Option<String>,
    current: Option<Child>,
}

impl Default for SpeechAnnouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechAnnouncer {
    pub fn new() -> Self {
        Self::with_mode(SpeechMode::System)
    }

    pub fn with_mode(mode: SpeechMode) -> Self {
        Self {
            muted: false,
            mode,
            program: vec![DEFAULT_PROGRAM.to_string()],
            rate: 0.95,
            voice: None,
            current: None,
        }
    }

    /// Extra words go before the rate, voice and text arguments.
    pub fn with_program(mut self, program: &str) -> Self {
        let words: Vec<String> = program.split_whitespace().map(str::to_string).collect();
        if !words.is_empty() {
            self.program = words;
        }
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate.max(0.1);
        self
    }

    pub fn with_voice(mut self, voice: Option<String>) -> Self {
        self.voice = voice.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_current();
        }
    }

    pub fn words_per_minute(&self) -> u32 {
        (BASE_WORDS_PER_MINUTE * self.rate).round() as u32
    }

    fn stop_current(&mut self) {
        let Some(mut child) = self.current.take() else {
            return;
        };
        match child.try_wait() {
            Ok(Some(_)) => {}
            Ok(None) => {
                if let Err(err) = child.kill() {
                    debug!("failed to stop narration process: {err}");
                }
                let _ = child.wait();
            }
            Err(err) => debug!("failed to poll narration process: {err}"),
        }
    }

    fn speech_command(&self, text: &str) -> Command {
        let rate_flag = if cfg!(target_os = "macos") { "-r" } else { "-s" };
        let mut command = Command::new(&self.program[0]);
        command
            .args(&self.program[1..])
            .arg(rate_flag)
            .arg(self.words_per_minute().to_string());
        if let Some(voice) = &self.voice {
            command.arg("-v").arg(voice);
        }
        command
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl Announcer for SpeechAnnouncer {
    fn speak(&mut self, text: &str) -> Result<(), NarrationError> {
        self.stop_current();
        if self.muted || self.mode == SpeechMode::Disabled {
            debug!(muted = self.muted, "narration skipped: {text}");
            return Ok(());
        }
        match self.speech_command(text).spawn() {
            Ok(child) => {
                debug!(pid = child.id(), "narrating: {text}");
                self.current = Some(child);
                Ok(())
            }
            Err(err) => {
                warn!(program = %self.program[0], "speech command failed to start: {err}");
                Err(match err.kind() {
                    io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                        NarrationError::Unavailable(err.to_string())
                    }
                    _ => NarrationError::Failed(err.to_string()),
                })
            }
        }
    }

    fn cancel(&mut self) {
        self.stop_current();
    }
}

impl Drop for SpeechAnnouncer {
    fn drop(&mut self) {
        self.stop_current();
    }
}
