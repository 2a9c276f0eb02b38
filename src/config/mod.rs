use crate::backends::huggingface::DEFAULT_BASE_URL;
use crate::cascades::{DEFAULT_CACHE_CAPACITY, DecisionCache, ModelTier, TierTable};
use crate::console::VerbosityLevel;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub mod error;

pub use error::{ConfigError, ConfigResult};

pub const API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";
pub const SUPPORTED_BACKENDS: [&str; 2] = ["huggingface", "mock"];
const VERBOSITY_LEVELS: [&str; 4] = ["quiet", "normal", "verbose", "debug"];

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ModelOverride {
    pub model: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_backend")]
    pub default_backend: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub ledger_dir: Option<PathBuf>,
    #[serde(default)]
    pub verbosity: Option<String>,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Keyed by tier name.
    #[serde(default)]
    pub models: BTreeMap<String, ModelOverride>,
}

fn default_backend() -> String {
    "huggingface".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_backend: default_backend(),
            api_key: None,
            base_url: default_base_url(),
            ledger_dir: None,
            verbosity: None,
            cache: CacheConfig::default(),
            models: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Read the config at `path`, writing defaults there first if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path).context("Failed to read config file")?;
            let config: Self = toml::from_str(&content)
                .map_err(ConfigError::from)
                .context("Failed to parse config file")?;
            config.validate()?;
            config
        } else {
            let config = Self::default();
            config.save_to(path)?;
            config
        };

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;
        fs::write(path, content).context("Failed to write config file")
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !SUPPORTED_BACKENDS.contains(&self.default_backend.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "default_backend".to_string(),
                value: self.default_backend.clone(),
            });
        }

        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: self.base_url.clone(),
            });
        }

        if self.cache.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.capacity".to_string(),
                value: "0".to_string(),
            });
        }

        for tier_name in self.models.keys() {
            if tier_name.parse::<ModelTier>().is_err() {
                return Err(ConfigError::InvalidValue {
                    field: "models".to_string(),
                    value: tier_name.clone(),
                });
            }
        }

        Ok(())
    }

    /// The environment variable wins over the file when it is set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.is_empty()))
    }

    pub fn ledger_dir(&self) -> Result<PathBuf> {
        match &self.ledger_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::config_dir()?.join("ledger")),
        }
    }

    pub fn tier_table(&self) -> ConfigResult<TierTable> {
        let mut table = TierTable::default();
        for (tier_name, model) in &self.models {
            let tier: ModelTier = tier_name.parse().map_err(|_| ConfigError::InvalidValue {
                field: "models".to_string(),
                value: tier_name.clone(),
            })?;
            if let Some(model_id) = &model.model {
                table = table.with_model_id(tier, model_id.clone());
            }
        }
        Ok(table)
    }

    pub fn decision_cache(&self) -> DecisionCache {
        DecisionCache::new(
            self.cache.capacity,
            self.cache.ttl_secs.map(Duration::from_secs),
        )
    }

    /// Apply a `cascade config set <key> <value>` update.
    pub fn update_setting(&mut self, key: &str, value: String) -> ConfigResult<()> {
        let invalid = |field: &str, value: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        };

        match key {
            "default_backend" => self.default_backend = value,
            "api_key" => self.api_key = Some(value),
            "base_url" => self.base_url = value,
            "ledger_dir" => self.ledger_dir = Some(PathBuf::from(value)),
            "verbosity" => {
                if !VERBOSITY_LEVELS.contains(&value.as_str()) {
                    return Err(invalid(key, &value));
                }
                self.verbosity = Some(value);
            }
            "cache.capacity" => {
                self.cache.capacity = value.parse().map_err(|_| invalid(key, &value))?;
            }
            "cache.ttl_secs" => {
                self.cache.ttl_secs = Some(value.parse().map_err(|_| invalid(key, &value))?);
            }
            _ => {
                let tier = key
                    .strip_prefix("models.")
                    .and_then(|rest| rest.strip_suffix(".model"))
                    .and_then(|tier| tier.parse::<ModelTier>().ok())
                    .ok_or_else(|| ConfigError::UnknownConfigKey {
                        key: key.to_string(),
                    })?;
                self.models.insert(
                    tier.as_str().to_string(),
                    ModelOverride { model: Some(value) },
                );
            }
        }

        self.validate()
    }

    /// Get the configured verbosity level, falling back to Normal if not set
    pub fn get_verbosity(&self) -> VerbosityLevel {
        self.verbosity
            .as_ref()
            .and_then(|v| match v.as_str() {
                "quiet" => Some(VerbosityLevel::Quiet),
                "normal" => Some(VerbosityLevel::Normal),
                "verbose" => Some(VerbosityLevel::Verbose),
                "debug" => Some(VerbosityLevel::Debug),
                _ => None,
            })
            .unwrap_or(VerbosityLevel::Normal)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    fn config_dir() -> Result<PathBuf> {
        let path = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| ConfigError::NoHomeDirectory)?;
        let mut path = PathBuf::from(path);
        path.push(".config");
        path.push("cascade");
        Ok(path)
    }
}

/// Keep the first and last four characters of a key, hide the rest.
pub fn mask_api_key(api_key: &str) -> String {
    if api_key.chars().count() > 8 {
        let chars: Vec<char> = api_key.chars().collect();
        let prefix: String = chars.iter().take(4).collect();
        let suffix: String = chars.iter().rev().take(4).rev().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
