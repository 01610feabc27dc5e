//! # Effects Error Types
//!
//! Errors only exist at the configuration boundary. Per-frame calls clamp or
//! skip degenerate input instead of failing.

use thiserror::Error;

/// Errors that can occur while setting up the effects stack.
#[derive(Error, Debug)]
pub enum EffectsError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        /// Path that was being read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::EffectsConfig`].
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The config could not be written back out as TOML.
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The config parsed but a value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for effects setup.
pub type EffectsResult<T> = Result<T, EffectsError>;
