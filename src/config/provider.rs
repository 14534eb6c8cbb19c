//! Configuration Provider Trait

use serde::de::DeserializeOwned;

use super::ConfigResult;

/// Read access to a source of configuration values.
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Get a raw configuration value
    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;

    /// List keys matching a prefix
    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>>;
}

/// Extension methods for typed configuration access
pub trait ConfigProviderExt: ConfigProvider {
    /// Get a value parsed as JSON
    fn get<T: DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<T>>> + Send
    where
        Self: Sync,
    {
        async move {
            match self.get_raw(key).await? {
                Some(raw) => {
                    let value: T = serde_json::from_str(&raw).map_err(|e| {
                        super::ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: e.to_string(),
                        }
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProviderExt for P {}
