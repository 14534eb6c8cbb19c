//! Composite Configuration Provider
//!
//! Chains multiple configuration providers with priority ordering.
//! Earlier providers have higher priority.

use super::ConfigResult;
use super::provider::ConfigProvider;

#[derive(Default)]
pub struct CompositeConfigProvider {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider (first added = highest priority)
    pub fn add_provider(&mut self, provider: Box<dyn ConfigProvider>) {
        self.providers.push(provider);
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

#[async_trait::async_trait]
impl ConfigProvider for CompositeConfigProvider {
    fn name(&self) -> &str {
        "composite"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        for provider in &self.providers {
            if let Some(value) = provider.get_raw(key).await? {
                tracing::trace!(key, provider = provider.name(), "Config value resolved");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>> {
        let mut keys = Vec::new();
        for provider in &self.providers {
            keys.extend(provider.list_keys(prefix).await?);
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigProvider;

    #[tokio::test]
    async fn test_first_provider_wins() {
        let composite = CompositeConfigProvider::new()
            .provider(Box::new(
                MemoryConfigProvider::new().value("server.app_sub_url", "/high"),
            ))
            .provider(Box::new(
                MemoryConfigProvider::new()
                    .value("server.app_sub_url", "/low")
                    .value("plugins.dirs", "/p"),
            ));

        assert_eq!(
            composite.get_raw("server.app_sub_url").await.unwrap(),
            Some("/high".to_string())
        );
        assert_eq!(
            composite.get_raw("plugins.dirs").await.unwrap(),
            Some("/p".to_string())
        );
        assert_eq!(composite.get_raw("absent").await.unwrap(), None);
        assert_eq!(composite.provider_names(), vec!["memory", "memory"]);
    }

    #[tokio::test]
    async fn test_list_keys_dedup() {
        let composite = CompositeConfigProvider::new()
            .provider(Box::new(MemoryConfigProvider::new().value("a.x", "1")))
            .provider(Box::new(
                MemoryConfigProvider::new()
                    .value("a.x", "2")
                    .value("a.y", "3"),
            ));

        assert_eq!(composite.list_keys("a.").await.unwrap(), vec!["a.x", "a.y"]);
    }
}
