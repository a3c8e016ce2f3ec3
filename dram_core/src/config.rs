//! Configuration file support for dram.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/dram/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub finance: FinanceConfig,
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

/// Budget and savings projection parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FinanceConfig {
    /// Weekly drinks budget; `None` disables budget tracking
    #[serde(default)]
    pub weekly_budget: Option<f64>,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_target_reduction_percent")]
    pub target_reduction_percent: f64,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            weekly_budget: None,
            currency: default_currency(),
            target_reduction_percent: default_target_reduction_percent(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir().join(".local/share"));
    base.join("dram")
}

fn default_currency() -> String {
    "JPY".into()
}

fn default_target_reduction_percent() -> f64 {
    30.0
}

fn home_dir() -> PathBuf {
    dirs::home_dir()
        .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
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
        let base = dirs::config_dir().unwrap_or_else(|| home_dir().join(".config"));
        base.join("dram").join("config.toml")
    }

    /// Reject values the calculators would silently clamp
    pub fn validate(&self) -> Result<()> {
        if let Some(budget) = self.finance.weekly_budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(Error::Config(format!(
                    "weekly_budget must be non-negative, got {}",
                    budget
                )));
            }
        }
        let target = self.finance.target_reduction_percent;
        if !(0.0..=100.0).contains(&target) {
            return Err(Error::Config(format!(
                "target_reduction_percent must be in [0, 100], got {}",
                target
            )));
        }
        Ok(())
    }
}
