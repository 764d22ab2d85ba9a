//! CLI error type.

use std::fmt;
use std::io;
use std::path::PathBuf;

use donutmask::config::ConfigError;
use donutmask::region::RegionError;
use donutmask::AnalysisError;

/// Errors reported by `donutmask` commands.
#[derive(Debug)]
pub enum CliError {
    /// A file could not be read or written.
    Io { path: PathBuf, source: io::Error },

    /// A file is not valid JSON.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Valid JSON but not usable GeoJSON.
    GeoJson { path: PathBuf, message: String },

    /// Boundary polygons could not be loaded.
    Regions(RegionError),

    /// Settings file or setting error.
    Config(ConfigError),

    /// Masking or metrics failed.
    Analysis(AnalysisError),

    /// Installing the Ctrl-C handler failed.
    Signal(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io { path, source } => {
                write!(f, "Failed to access {}: {}", path.display(), source)
            }
            CliError::Json { path, source } => {
                write!(f, "Invalid JSON in {}: {}", path.display(), source)
            }
            CliError::GeoJson { path, message } => {
                write!(f, "Unsupported GeoJSON in {}: {}", path.display(), message)
            }
            CliError::Regions(e) => write!(f, "Failed to load regions: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Analysis(e) => write!(f, "{}", e),
            CliError::Signal(msg) => write!(f, "Failed to set signal handler: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io { source, .. } => Some(source),
            CliError::Json { source, .. } => Some(source),
            CliError::Regions(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Analysis(e) => Some(e),
            CliError::GeoJson { .. } | CliError::Signal(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<RegionError> for CliError {
    fn from(e: RegionError) -> Self {
        CliError::Regions(e)
    }
}

impl From<AnalysisError> for CliError {
    fn from(e: AnalysisError) -> Self {
        CliError::Analysis(e)
    }
}

impl From<donutmask::MaskingError> for CliError {
    fn from(e: donutmask::MaskingError) -> Self {
        CliError::Analysis(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_display() {
        let err = CliError::GeoJson {
            path: PathBuf::from("points.geojson"),
            message: "feature 3 is not a Point".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported GeoJSON in points.geojson: feature 3 is not a Point"
        );
    }

    #[test]
    fn test_cli_error_from_config_error() {
        let err: CliError = ConfigError::MissingBandwidth.into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
