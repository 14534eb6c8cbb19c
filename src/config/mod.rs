//! Pluggable configuration provider system.
//!
//! ```rust,no_run
//! use plugin_services::config::{ConfigBuilder, ServiceConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ConfigBuilder::new()
//!     .env()
//!     .file("/etc/plugin-services/config.json")
//!     .build();
//! let config = ServiceConfig::load(&provider).await?;
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod env;
pub mod file;
pub mod memory;
pub mod provider;

pub use composite::CompositeConfigProvider;
pub use env::{DEFAULT_ENV_PREFIX, EnvConfigProvider};
pub use file::FileConfigProvider;
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub const KEY_PLUGIN_DIRS: &str = "plugins.dirs";
pub const KEY_APP_SUB_URL: &str = "server.app_sub_url";

/// Keys read by [`ServiceConfig::load`].
pub const KNOWN_KEYS: &[&str] = &[KEY_PLUGIN_DIRS, KEY_APP_SUB_URL];

/// Settings the services read at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directories scanned for plugin manifests.
    #[serde(default)]
    pub plugin_dirs: Vec<PathBuf>,
    /// Path prefix when served below the host root, e.g. `/grafana`.
    #[serde(default)]
    pub app_sub_url: String,
}

impl ServiceConfig {
    pub async fn load(provider: &dyn ConfigProvider) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = provider.get_raw(KEY_PLUGIN_DIRS).await? {
            config.plugin_dirs = parse_dirs(&raw)?;
        }

        if let Some(raw) = provider.get_raw(KEY_APP_SUB_URL).await? {
            let trimmed = raw.trim().trim_end_matches('/');
            if !trimmed.is_empty() && !trimmed.starts_with('/') {
                return Err(ConfigError::InvalidValue {
                    key: KEY_APP_SUB_URL.to_string(),
                    message: format!("must start with '/', got {:?}", raw),
                });
            }
            config.app_sub_url = trimmed.to_string();
        }

        tracing::debug!(
            plugin_dirs = config.plugin_dirs.len(),
            app_sub_url = %config.app_sub_url,
            provider = provider.name(),
            "Loaded service config"
        );
        Ok(config)
    }
}

/// A JSON array of paths, or an OS path list (`:`-separated on Unix).
fn parse_dirs(raw: &str) -> ConfigResult<Vec<PathBuf>> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        return serde_json::from_str(raw).map_err(|e| ConfigError::InvalidValue {
            key: KEY_PLUGIN_DIRS.to_string(),
            message: e.to_string(),
        });
    }
    Ok(std::env::split_paths(raw)
        .filter(|p| !p.as_os_str().is_empty())
        .collect())
}

/// Configuration builder for fluent API
#[derive(Default)]
pub struct ConfigBuilder {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add environment variable provider with the default prefix
    pub fn env(mut self) -> Self {
        self.providers.push(Box::new(EnvConfigProvider::new()));
        self
    }

    pub fn env_with_prefix(mut self, prefix: &str) -> Self {
        self.providers
            .push(Box::new(EnvConfigProvider::prefixed(prefix)));
        self
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.providers
            .push(Box::new(FileConfigProvider::new(path)));
        self
    }

    pub fn memory(mut self, provider: MemoryConfigProvider) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> CompositeConfigProvider {
        let mut composite = CompositeConfigProvider::new();
        for provider in self.providers {
            composite.add_provider(provider);
        }
        composite
    }
}
