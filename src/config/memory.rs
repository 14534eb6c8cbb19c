//! In-Memory Configuration Provider
//!
//! Code-defined configuration, mostly for tests.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::ConfigResult;
use super::provider::ConfigProvider;

#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: HashMap<String, String>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Builder-style insert for use before the provider is shared.
    pub fn value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.get_mut().insert(key.into(), value.into());
        self
    }

    pub async fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data.write().await.insert(key.into(), value.into());
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ConfigProvider for MemoryConfigProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>> {
        let data = self.data.read().await;
        let mut keys: Vec<String> = data
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}
