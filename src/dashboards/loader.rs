use std::sync::Arc;

use serde_json::Value;

use super::DashboardError;
use super::document::DashboardDocument;
use super::source::{DashboardSource, LocalDashboardSource};
use crate::plugins::PluginRegistry;

/// Loads dashboard definitions bundled with plugins.
pub struct DashboardLoader {
    plugins: Arc<dyn PluginRegistry>,
    source: Arc<dyn DashboardSource>,
}

impl DashboardLoader {
    pub fn new(plugins: Arc<dyn PluginRegistry>) -> Self {
        Self {
            plugins,
            source: Arc::new(LocalDashboardSource),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn DashboardSource>) -> Self {
        self.source = source;
        self
    }

    /// Reads and parses `path` relative to the plugin's directory.
    ///
    /// The file is always closed before returning. A failure to close is
    /// logged and does not affect the result.
    pub fn load(&self, plugin_id: &str, path: &str) -> Result<DashboardDocument, DashboardError> {
        let plugin = self
            .plugins
            .plugin(plugin_id)
            .ok_or_else(|| DashboardError::plugin_not_found(plugin_id))?;

        // The plugin directory and the include path both come from the
        // installed plugin, not from request input.
        let file_path = plugin.resolve(path);
        let mut reader = self
            .source
            .open(&file_path)
            .map_err(|source| DashboardError::Read {
                path: file_path.clone(),
                source,
            })?;

        let parsed = serde_json::from_reader::<_, Value>(&mut reader);

        if let Err(e) = reader.close() {
            tracing::warn!(path = %file_path.display(), error = %e, "Failed to close dashboard file");
        }

        let data = parsed.map_err(|e| DashboardError::from_json(file_path, e))?;
        Ok(DashboardDocument::from_json(data))
    }
}
