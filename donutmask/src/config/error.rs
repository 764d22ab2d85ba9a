//! Configuration error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Invalid or unreadable configuration.
///
/// Any of these stops a run before a single point is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A distance is NaN or infinite.
    #[error("{field} must be a finite number, got {value}")]
    NonFiniteDistance { field: &'static str, value: f64 },

    /// A distance is below zero.
    #[error("{field} must not be negative, got {value}")]
    NegativeDistance { field: &'static str, value: f64 },

    /// Minimum distance exceeds maximum distance.
    #[error("Minimum distance ({min} m) exceeds maximum distance ({max} m)")]
    DistanceOrder { min: f64, max: f64 },

    /// A distance longer than half the earth's circumference.
    #[error("{field} must not exceed {limit} m, got {value}")]
    DistanceTooLarge {
        field: &'static str,
        value: f64,
        limit: f64,
    },

    /// Clustering enabled but no bandwidth given.
    #[error("Clustering is enabled but no bandwidth was given")]
    MissingBandwidth,

    /// Bandwidth not strictly positive and finite.
    #[error("Bandwidth must be a positive number of meters, got {0}")]
    InvalidBandwidth(f64),

    /// A count limit that must be at least one is zero.
    #[error("{0} must be at least 1")]
    ZeroLimit(&'static str),

    /// A settings value could not be parsed.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A `section.key` name that does not exist.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// The settings file could not be read or written.
    #[error("Failed to access config file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// The settings file is not valid INI.
    #[error("Failed to parse config file: {0}")]
    Parse(String),

    /// No home directory to place the default settings file in.
    #[error("Could not determine home directory")]
    NoHomeDirectory,
}
