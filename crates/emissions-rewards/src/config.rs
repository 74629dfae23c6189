use anyhow::Result;
use emissions_types::ModuleParams;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

pub const LOG_LEVEL_ENV: &str = "EMISSIONS_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "EMISSIONS_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// One of `pretty`, `compact` or `json`
    pub format: String,
    /// Extra `target=level` directives, e.g. `emissions_storage = "debug"`
    pub module_filters: BTreeMap<String, String>,
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            module_filters: BTreeMap::new(),
            file_output: None,
        }
    }
}

/// Host-side settings of the reward engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    /// Genesis module params; see [`ModuleParams::load_from_path_or_default`]
    pub params_path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var(LOG_LEVEL_ENV) {
            self.logging.level = level;
        }
        if let Ok(format) = env::var(LOG_FORMAT_ENV) {
            self.logging.format = format;
        }
        if let Ok(path) = env::var(emissions_types::params::PARAMS_PATH_ENV) {
            self.params_path = Some(PathBuf::from(path));
        }
    }

    /// Genesis params, falling back to defaults when none are configured
    pub fn load_params(&self) -> ModuleParams {
        ModuleParams::load_from_path_or_default(self.params_path.clone())
    }
}
