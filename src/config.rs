use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::app_dirs::AppDirs;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DisplayMode {
    /// all items at once
    Full,
    /// one item at a time
    Sequential,
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuizMode {
    /// token and position must match
    Ordered,
    /// only membership matters
    Unordered,
}

/// Settings chosen once per run and reused for every round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub display_mode: DisplayMode,
    pub quiz_mode: QuizMode,
    pub delay_seconds: f64,
    pub word_count: usize,
    pub math_challenge: bool,
    pub fixed_delay: bool,
    pub letters_only: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("delay must be a finite number of seconds, 0 or more, got {0}")]
    InvalidDelay(f64),
    #[error("word count must be between 1 and {max}, got {requested}")]
    InvalidWordCount { requested: usize, max: usize },
}

impl Config {
    /// Check every field; `vocabulary_size` is the size of the list this
    /// configuration draws from.
    pub fn validate(&self, vocabulary_size: usize) -> Result<(), ConfigError> {
        if !valid_delay(self.delay_seconds) {
            return Err(ConfigError::InvalidDelay(self.delay_seconds));
        }
        if self.word_count == 0 || self.word_count > vocabulary_size {
            return Err(ConfigError::InvalidWordCount {
                requested: self.word_count,
                max: vocabulary_size,
            });
        }
        Ok(())
    }
}

pub fn valid_delay(seconds: f64) -> bool {
    seconds.is_finite() && seconds >= 0.0
}

/// Remembers the last configuration between runs
pub trait ConfigStore {
    fn load(&self) -> Option<Config>;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Option<Config> {
        let bytes = fs::read(&self.path).ok()?;
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!("ignoring unreadable config {}: {e}", self.path.display());
                None
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
