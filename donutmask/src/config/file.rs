//! INI settings file.
//!
//! ```ini
//! [masking]
//! min_distance_m = 100
//! max_distance_m = 1000
//! max_attempts_per_point = 1000
//! max_sampling_iterations = 10000
//!
//! [clustering]
//! enabled = false
//! bandwidth_m =
//! min_points = 3
//!
//! [run]
//! parallel = false
//! seed =
//! time_budget_secs =
//! display_crs = EPSG:4326
//! ```
//!
//! Missing keys keep their defaults. Empty values clear optional settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;

use super::error::ConfigError;
use crate::cluster::{ClusterConfig, DEFAULT_MIN_POINTS};
use crate::coord::Crs;
use crate::masking::{
    ExecutionMode, MaskingConfig, DEFAULT_MAX_ATTEMPTS_PER_POINT, DEFAULT_MAX_DISTANCE_M,
    DEFAULT_MIN_DISTANCE_M,
};
use crate::sampler::{RandomSource, DEFAULT_MAX_SAMPLING_ITERATIONS};

/// Name of the settings file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// `~/.donutmask`
pub fn config_directory() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".donutmask"))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// `~/.donutmask/config.ini`
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

/// `[masking]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskingSettings {
    pub min_distance_m: f64,
    pub max_distance_m: f64,
    pub max_attempts_per_point: u32,
    pub max_sampling_iterations: u32,
}

impl Default for MaskingSettings {
    fn default() -> Self {
        Self {
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            max_distance_m: DEFAULT_MAX_DISTANCE_M,
            max_attempts_per_point: DEFAULT_MAX_ATTEMPTS_PER_POINT,
            max_sampling_iterations: DEFAULT_MAX_SAMPLING_ITERATIONS,
        }
    }
}

/// `[clustering]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringSettings {
    pub enabled: bool,
    pub bandwidth_m: Option<f64>,
    pub min_points: usize,
}

impl Default for ClusteringSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            bandwidth_m: None,
            min_points: DEFAULT_MIN_POINTS,
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSettings {
    pub parallel: bool,
    pub seed: Option<u64>,
    pub time_budget_secs: Option<u64>,
    pub display_crs: Crs,
}

/// Parsed contents of the settings file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub masking: MaskingSettings,
    pub clustering: ClusteringSettings,
    pub run: RunSettings,
}

impl ConfigFile {
    /// Load from the default location, or defaults if no file exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from `path`. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(e) => ConfigError::Parse(e.to_string()),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse settings from INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    /// Save to the default location, creating the directory if needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to `path`, creating parent directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        self.to_ini().write_to_file(path).map_err(io_error)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Build a validated masking configuration.
    pub fn to_masking_config(&self) -> Result<MaskingConfig, ConfigError> {
        let masking = &self.masking;
        let mut config = MaskingConfig::new(masking.min_distance_m, masking.max_distance_m)
            .with_max_attempts(masking.max_attempts_per_point)
            .with_max_sampling_iterations(masking.max_sampling_iterations)
            .with_display_crs(self.run.display_crs);
        if self.run.parallel {
            config = config.with_execution(ExecutionMode::Parallel);
        }
        if let Some(seed) = self.run.seed {
            config.random_source = RandomSource::Seeded(seed);
        }
        if let Some(secs) = self.run.time_budget_secs {
            config = config.with_run_time_budget(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    /// Build a validated cluster configuration, or `None` when disabled.
    pub fn to_cluster_config(&self) -> Result<Option<ClusterConfig>, ConfigError> {
        if !self.clustering.enabled {
            return Ok(None);
        }
        let bandwidth = self
            .clustering
            .bandwidth_m
            .ok_or(ConfigError::MissingBandwidth)?;
        let config = ClusterConfig::new(bandwidth).with_min_points(self.clustering.min_points);
        config.validate()?;
        Ok(Some(config))
    }
}

/// Every setting, addressable as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    MaskingMinDistance,
    MaskingMaxDistance,
    MaskingMaxAttempts,
    MaskingMaxSamplingIterations,
    ClusteringEnabled,
    ClusteringBandwidth,
    ClusteringMinPoints,
    RunParallel,
    RunSeed,
    RunTimeBudget,
    RunDisplayCrs,
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        use ConfigKey::*;
        &[
            MaskingMinDistance,
            MaskingMaxDistance,
            MaskingMaxAttempts,
            MaskingMaxSamplingIterations,
            ClusteringEnabled,
            ClusteringBandwidth,
            ClusteringMinPoints,
            RunParallel,
            RunSeed,
            RunTimeBudget,
            RunDisplayCrs,
        ]
    }

    pub fn section(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            MaskingMinDistance
            | MaskingMaxDistance
            | MaskingMaxAttempts
            | MaskingMaxSamplingIterations => "masking",
            ClusteringEnabled | ClusteringBandwidth | ClusteringMinPoints => "clustering",
            RunParallel | RunSeed | RunTimeBudget | RunDisplayCrs => "run",
        }
    }

    pub fn key_name(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            MaskingMinDistance => "min_distance_m",
            MaskingMaxDistance => "max_distance_m",
            MaskingMaxAttempts => "max_attempts_per_point",
            MaskingMaxSamplingIterations => "max_sampling_iterations",
            ClusteringEnabled => "enabled",
            ClusteringBandwidth => "bandwidth_m",
            ClusteringMinPoints => "min_points",
            RunParallel => "parallel",
            RunSeed => "seed",
            RunTimeBudget => "time_budget_secs",
            RunDisplayCrs => "display_crs",
        }
    }

    /// Dotted name, e.g. `masking.min_distance_m`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as written to the file; empty for unset options.
    pub fn get(&self, config: &ConfigFile) -> String {
        use ConfigKey::*;
        match self {
            MaskingMinDistance => config.masking.min_distance_m.to_string(),
            MaskingMaxDistance => config.masking.max_distance_m.to_string(),
            MaskingMaxAttempts => config.masking.max_attempts_per_point.to_string(),
            MaskingMaxSamplingIterations => config.masking.max_sampling_iterations.to_string(),
            ClusteringEnabled => config.clustering.enabled.to_string(),
            ClusteringBandwidth => optional(config.clustering.bandwidth_m),
            ClusteringMinPoints => config.clustering.min_points.to_string(),
            RunParallel => config.run.parallel.to_string(),
            RunSeed => optional(config.run.seed),
            RunTimeBudget => optional(config.run.time_budget_secs),
            RunDisplayCrs => config.run.display_crs.to_string(),
        }
    }

    /// Parse `value` and store it in `config`.
    ///
    /// Only the syntax is checked here; ranges are checked when the typed
    /// configs are built.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        use ConfigKey::*;
        let value = value.trim();
        match self {
            MaskingMinDistance => config.masking.min_distance_m = self.parse(value)?,
            MaskingMaxDistance => config.masking.max_distance_m = self.parse(value)?,
            MaskingMaxAttempts => config.masking.max_attempts_per_point = self.parse(value)?,
            MaskingMaxSamplingIterations => {
                config.masking.max_sampling_iterations = self.parse(value)?
            }
            ClusteringEnabled => config.clustering.enabled = self.parse_bool(value)?,
            ClusteringBandwidth => config.clustering.bandwidth_m = self.parse_optional(value)?,
            ClusteringMinPoints => config.clustering.min_points = self.parse(value)?,
            RunParallel => config.run.parallel = self.parse_bool(value)?,
            RunSeed => config.run.seed = self.parse_optional(value)?,
            RunTimeBudget => config.run.time_budget_secs = self.parse_optional(value)?,
            RunDisplayCrs => {
                config.run.display_crs = value
                    .parse::<Crs>()
                    .map_err(|reason| self.invalid(value, reason))?
            }
        }
        Ok(())
    }

    fn parse<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        value
            .parse::<T>()
            .map_err(|e| self.invalid(value, e.to_string()))
    }

    fn parse_optional<T>(&self, value: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        if value.is_empty() {
            return Ok(None);
        }
        self.parse(value).map(Some)
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
