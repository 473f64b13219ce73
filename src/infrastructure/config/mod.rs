// ============================================================
// CONFIGURATION
// ============================================================
// Layered settings: built-in defaults, then an optional TOML
// file, then LISTING_MERGE_* environment variables

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::listing::MergeConfig;

pub const CONFIG_FILE_NAME: &str = "listing-merge.toml";
pub const ENV_PREFIX: &str = "LISTING_MERGE_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
    pub merge: MergeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            merge: MergeConfig::default(),
        }
    }
}

pub struct ConfigService {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Read this file instead of `listing-merge.toml`; it must exist
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    #[cfg(test)]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    fn figment(&self, file: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(&self.env_prefix).split("__"))
    }

    pub fn load(&self) -> Result<AppConfig> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }

        let file = match &self.file {
            Some(path) if !path.is_file() => {
                return Err(AppError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => path.clone(),
            None => PathBuf::from(CONFIG_FILE_NAME),
        };

        let config: AppConfig = self.figment(&file).extract()?;
        config.merge.validate().map_err(AppError::Config)?;

        debug!(file = %file.display(), log_filter = %config.log_filter, "Configuration loaded");
        Ok(config)
    }
}
