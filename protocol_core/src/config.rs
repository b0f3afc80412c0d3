//! Configuration file support for Dayplan.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/dayplan/config.toml`.

use crate::catalog::get_default_catalog;
use crate::{Catalog, Error, ExerciseCatalogEntry, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub feedback: FeedbackConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Ratings used when finishing a day without explicit values
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_rating")]
    pub default_difficulty: u8,

    #[serde(default = "default_rating")]
    pub default_energy: u8,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            default_difficulty: default_rating(),
            default_energy: default_rating(),
        }
    }
}

/// Extra exercises appended after the built-in catalog
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub custom: Vec<ExerciseCatalogEntry>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("dayplan")
}

fn default_rating() -> u8 {
    3
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("dayplan").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("default_difficulty", self.feedback.default_difficulty),
            ("default_energy", self.feedback.default_energy),
        ] {
            if !(1..=5).contains(&value) {
                return Err(Error::Config(format!(
                    "feedback.{} must be between 1 and 5, got {}",
                    name, value
                )));
            }
        }

        // Built-in and custom entries share one id space
        let mut entries = get_default_catalog().entries.clone();
        entries.extend(self.catalog.custom.iter().cloned());
        let errors = Catalog { entries }.validate();
        if !errors.is_empty() {
            for error in &errors {
                tracing::error!("Catalog: {}", error);
            }
            return Err(Error::CatalogValidation(errors.join("; ")));
        }
        Ok(())
    }

    /// Built-in catalog followed by the configured custom exercises
    pub fn catalog(&self) -> Catalog {
        get_default_catalog().with_custom(&self.catalog.custom)
    }
}
