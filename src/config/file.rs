//! File-based Configuration Provider
//!
//! Reads a JSON object once, lazily. Dotted keys walk nested objects, so
//! `server.app_sub_url` resolves `{"server": {"app_sub_url": "..."}}`.

use std::path::PathBuf;

use serde_json::Value;
use tokio::sync::OnceCell;

use super::ConfigResult;
use super::provider::ConfigProvider;

pub struct FileConfigProvider {
    path: PathBuf,
    data: OnceCell<Value>,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: OnceCell::new(),
        }
    }

    /// A missing file behaves as an empty configuration.
    async fn load(&self) -> ConfigResult<Value> {
        if !tokio::fs::try_exists(&self.path).await? {
            tracing::debug!(path = %self.path.display(), "Config file not found, using defaults");
            return Ok(Value::Object(Default::default()));
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn data(&self) -> ConfigResult<&Value> {
        self.data.get_or_try_init(|| self.load()).await
    }

    fn lookup<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
        if let Some(value) = data.get(key) {
            return Some(value);
        }
        key.split('.').try_fold(data, |node, part| node.get(part))
    }

    fn collect_keys(node: &Value, path: String, out: &mut Vec<String>) {
        match node {
            Value::Object(map) => {
                for (k, v) in map {
                    let child = if path.is_empty() {
                        k.clone()
                    } else {
                        format!("{}.{}", path, k)
                    };
                    Self::collect_keys(v, child, out);
                }
            }
            _ => out.push(path),
        }
    }
}

#[async_trait::async_trait]
impl ConfigProvider for FileConfigProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        let data = self.data().await?;
        Ok(Self::lookup(data, key).and_then(|value| match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }))
    }

    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>> {
        let data = self.data().await?;
        let mut keys = Vec::new();
        Self::collect_keys(data, String::new(), &mut keys);
        keys.retain(|k| !k.is_empty() && k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}
