//! Settings file handling and shared validation.
//!
//! Settings live in an INI file (default `~/.donutmask/config.ini`) and are
//! turned into [`MaskingConfig`](crate::masking::MaskingConfig) and
//! [`ClusterConfig`](crate::cluster::ClusterConfig) values before a run.

mod error;
mod file;

pub use error::ConfigError;
pub use file::{
    config_directory, config_file_path, ClusteringSettings, ConfigFile, ConfigKey, MaskingSettings,
    RunSettings, CONFIG_FILE_NAME,
};

/// Check that a distance is finite and not negative.
pub(crate) fn validate_distance(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFiniteDistance { field, value });
    }
    if value < 0.0 {
        return Err(ConfigError::NegativeDistance { field, value });
    }
    Ok(())
}
