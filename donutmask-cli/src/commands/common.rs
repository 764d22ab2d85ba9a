//! Argument types shared across commands.

use std::path::Path;

use clap::ValueEnum;
use donutmask::config::ConfigFile;
use donutmask::coord::Crs;

use crate::error::CliError;

/// Coordinate reference system selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CrsArg {
    /// Geographic longitude/latitude (EPSG:4326)
    Wgs84,
    /// Spherical Web Mercator meters (EPSG:3857)
    WebMercator,
}

impl From<CrsArg> for Crs {
    fn from(arg: CrsArg) -> Self {
        match arg {
            CrsArg::Wgs84 => Crs::Wgs84,
            CrsArg::WebMercator => Crs::WebMercator,
        }
    }
}

/// Load settings from `path`, or from the default location.
///
/// An explicit path must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    match path {
        Some(path) => Ok(ConfigFile::load_from(path)?),
        None => Ok(ConfigFile::load()?),
    }
}
