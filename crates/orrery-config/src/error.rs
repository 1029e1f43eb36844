//! Errors raised while persisting loader settings.

use std::path::PathBuf;

/// Failures of [`Config::load_or_create`](crate::Config::load_or_create),
/// [`Config::save`](crate::Config::save) and
/// [`Config::validate`](crate::Config::validate).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("cannot read settings from {}: {source}", path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The settings directory or file could not be written.
    #[error("cannot write settings to {}: {source}", path.display())]
    Write {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid RON for [`Config`](crate::Config).
    #[error("malformed settings in {}: {source}", path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Location and cause reported by the RON reader.
        #[source]
        source: ron::error::SpannedError,
    },

    /// The settings could not be rendered as RON.
    #[error("cannot serialize settings: {0}")]
    Serialize(#[source] ron::Error),

    /// A physical constant is out of range.
    #[error("physics.{field} must be positive, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}
