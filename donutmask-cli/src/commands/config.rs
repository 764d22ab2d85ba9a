//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, `config path` and
//! `config init` for viewing and modifying the settings file. `--config`
//! selects the same file `mask --config` reads.

use std::path::PathBuf;

use clap::Subcommand;
use donutmask::config::{config_file_path, ConfigFile, ConfigKey};

use super::common::load_settings;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., masking.min_distance_m)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., masking.min_distance_m)
        key: String,

        /// Value to set (empty to clear an optional setting)
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Settings file a config subcommand operates on.
struct SettingsFile {
    path: PathBuf,
    explicit: bool,
}

impl SettingsFile {
    fn resolve(path: Option<PathBuf>) -> Result<Self, CliError> {
        Ok(match path {
            Some(path) => Self {
                path,
                explicit: true,
            },
            None => Self {
                path: config_file_path()?,
                explicit: false,
            },
        })
    }

    /// Read the file. Only the default file may be missing.
    fn load(&self) -> Result<ConfigFile, CliError> {
        load_settings(self.explicit.then_some(self.path.as_path()))
    }

    /// Read the file, or start from defaults if it does not exist yet.
    fn load_or_default(&self) -> Result<ConfigFile, CliError> {
        if self.path.exists() {
            Ok(ConfigFile::load_from(&self.path)?)
        } else {
            Ok(ConfigFile::default())
        }
    }
}

/// Run a config subcommand against `path`, or the default settings file.
pub fn run(command: ConfigCommands, path: Option<PathBuf>) -> Result<(), CliError> {
    let file = SettingsFile::resolve(path)?;
    match command {
        ConfigCommands::Get { key } => {
            let value = get_value(&file, &key)?;
            println!("{}", value.as_deref().unwrap_or("(not set)"));
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let name = set_value(&file, &key, &value)?;
            println!("Set {} = {} in {}", name, value, file.path.display());
            Ok(())
        }
        ConfigCommands::List => print_settings(&file.load()?),
        ConfigCommands::Path => {
            println!("{}", file.path.display());
            Ok(())
        }
        ConfigCommands::Init { force } => init(&file, force),
    }
}

/// Current value of `key`, `None` when unset.
fn get_value(file: &SettingsFile, key: &str) -> Result<Option<String>, CliError> {
    let key: ConfigKey = key.parse()?;
    let value = key.get(&file.load()?);
    Ok((!value.is_empty()).then_some(value))
}

/// Store `value` under `key` and return the key's full name.
fn set_value(file: &SettingsFile, key: &str, value: &str) -> Result<String, CliError> {
    let key: ConfigKey = key.parse()?;
    let mut settings = file.load_or_default()?;
    key.set(&mut settings, value)?;
    settings.save_to(&file.path)?;
    Ok(key.name())
}

fn print_settings(settings: &ConfigFile) -> Result<(), CliError> {
    let mut section = None;
    for key in ConfigKey::all() {
        if section != Some(key.section()) {
            if section.is_some() {
                println!();
            }
            println!("[{}]", key.section());
            section = Some(key.section());
        }
        let value = key.get(settings);
        let shown = if value.is_empty() { "(not set)" } else { value.as_str() };
        println!("  {} = {}", key.key_name(), shown);
    }
    Ok(())
}

fn init(file: &SettingsFile, force: bool) -> Result<(), CliError> {
    if file.path.exists() && !force {
        println!(
            "Settings file already exists at {} (use --force to overwrite)",
            file.path.display()
        );
        return Ok(());
    }
    ConfigFile::default().save_to(&file.path)?;
    println!("Wrote default settings to {}", file.path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn explicit(path: PathBuf) -> SettingsFile {
        SettingsFile::resolve(Some(path)).unwrap()
    }

    #[test]
    fn test_set_creates_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.ini");
        let file = explicit(path.clone());

        let name = set_value(&file, "masking.max_distance_m", "750").unwrap();
        assert_eq!(name, "masking.max_distance_m");

        let settings = ConfigFile::load_from(&path).unwrap();
        assert_eq!(settings.masking.max_distance_m, 750.0);
        assert_eq!(
            get_value(&file, "masking.max_distance_m").unwrap().as_deref(),
            Some("750")
        );
    }

    #[test]
    fn test_set_reaches_mask_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.ini");
        let file = explicit(path.clone());
        set_value(&file, "masking.min_distance_m", "20").unwrap();
        set_value(&file, "masking.max_distance_m", "40").unwrap();

        let config = load_settings(Some(path.as_path()))
            .unwrap()
            .to_masking_config()
            .unwrap();
        assert_eq!(config.min_distance_m, 20.0);
        assert_eq!(config.max_distance_m, 40.0);
    }

    #[test]
    fn test_get_from_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        let file = explicit(dir.path().join("missing.ini"));
        assert!(matches!(
            get_value(&file, "masking.min_distance_m"),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_unset_optional_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.ini");
        ConfigFile::default().save_to(&path).unwrap();
        assert_eq!(get_value(&explicit(path), "run.seed").unwrap(), None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = TempDir::new().unwrap();
        let file = explicit(dir.path().join("settings.ini"));
        assert!(matches!(
            set_value(&file, "masking.nope", "1"),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.ini");
        let file = explicit(path.clone());
        set_value(&file, "run.seed", "42").unwrap();

        init(&file, false).unwrap();
        assert_eq!(ConfigFile::load_from(&path).unwrap().run.seed, Some(42));

        init(&file, true).unwrap();
        assert_eq!(ConfigFile::load_from(&path).unwrap().run.seed, None);
    }
}
