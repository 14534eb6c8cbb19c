//! Environment Variable Configuration Provider
//!
//! Keys map to variables by uppercasing and replacing `.` with `_`, so
//! `server.app_sub_url` with prefix `PLUGIN_SERVICES_` reads
//! `PLUGIN_SERVICES_SERVER_APP_SUB_URL`.
//!
//! That mapping cannot be reversed for keys containing `_`. `list_keys`
//! reports [`KNOWN_KEYS`] exactly; other variables come back with every `_`
//! read as `.`.

use super::provider::ConfigProvider;
use super::{ConfigError, ConfigResult, KNOWN_KEYS};

pub const DEFAULT_ENV_PREFIX: &str = "PLUGIN_SERVICES_";

/// Read-only environment variable configuration provider.
#[derive(Debug, Clone)]
pub struct EnvConfigProvider {
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Provider using [`DEFAULT_ENV_PREFIX`]
    pub fn new() -> Self {
        Self::prefixed(DEFAULT_ENV_PREFIX)
    }

    pub fn unprefixed() -> Self {
        Self { prefix: None }
    }

    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn env_key(&self, key: &str) -> String {
        let key = key.to_uppercase().replace('.', "_");
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, key),
            None => key,
        }
    }

    fn key_from_env(&self, env_name: &str) -> Option<String> {
        let stripped = match &self.prefix {
            Some(prefix) => env_name.strip_prefix(prefix.as_str())?,
            None => env_name,
        };
        if let Some(known) = KNOWN_KEYS.iter().find(|k| self.env_key(k) == env_name) {
            return Some(known.to_string());
        }
        Some(stripped.to_lowercase().replace('_', "."))
    }
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfigProvider for EnvConfigProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        match std::env::var(self.env_key(key)) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::Env(e)),
        }
    }

    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>> {
        let env_prefix = self.env_key(prefix);
        Ok(std::env::vars()
            .filter(|(k, _)| k.starts_with(&env_prefix))
            .filter_map(|(k, _)| self.key_from_env(&k))
            .collect())
    }
}
