//! Crate error type
//!
//! Nothing on the page is fatal: callers log these and fall back to defaults.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    /// A data or config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// page.toml did not parse
    #[error("invalid page config: {0}")]
    Config(#[from] toml::de::Error),

    /// page.toml parsed but holds an unusable value
    #[error("invalid page config value {field} = {value}: {reason}")]
    ConfigValue {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },

    /// Timeline JSON did not parse
    #[error("invalid timeline data: {0}")]
    Timeline(#[from] serde_json::Error),

    /// Countdown target is not a valid local date-time
    #[error("invalid countdown target '{0}' (expected YYYY-MM-DDTHH:MM:SS)")]
    CountdownTarget(String),

    /// Background music could not start
    #[error("audio playback failed: {0}")]
    Playback(String),
}

impl PageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PageError::Io {
            path: path.into(),
            source,
        }
    }
}
