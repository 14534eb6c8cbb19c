use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::PluginError;
use super::discovery::PluginDiscovery;
use super::manifest::PluginDescriptor;
use crate::query::QueryHandler;

/// Lookup contract for installed plugins.
///
/// Implementations must be safe for concurrent lookups.
pub trait PluginRegistry: Send + Sync {
    fn plugin(&self, id: &str) -> Option<Arc<PluginDescriptor>>;

    /// A query handler already running for `ds_type`, if the plugin subsystem
    /// provides one.
    fn live_handler(&self, ds_type: &str) -> Option<Arc<dyn QueryHandler>>;
}

/// In-memory [`PluginRegistry`] populated from plugin directories or by hand.
#[derive(Default)]
pub struct PluginManager {
    plugins: DashMap<String, Arc<PluginDescriptor>>,
    live_handlers: DashMap<String, Arc<dyn QueryHandler>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_dirs(dirs: &[PathBuf]) -> Result<Self, PluginError> {
        let manager = Self::new();
        for descriptor in PluginDiscovery::discover(dirs)? {
            manager.register_plugin(descriptor)?;
        }
        tracing::info!(count = manager.plugin_count(), "Loaded plugins");
        Ok(manager)
    }

    pub fn register_plugin(&self, descriptor: PluginDescriptor) -> Result<(), PluginError> {
        match self.plugins.entry(descriptor.id().to_string()) {
            Entry::Occupied(existing) => Err(PluginError::DuplicateId {
                id: descriptor.id().to_string(),
                first: existing.get().root_dir().to_path_buf(),
                second: descriptor.root_dir().to_path_buf(),
            }),
            Entry::Vacant(slot) => {
                tracing::debug!(plugin_id = %descriptor.id(), "Registered plugin");
                slot.insert(Arc::new(descriptor));
                Ok(())
            }
        }
    }

    /// Installs a running handler for a data-source type, replacing any
    /// previous one.
    pub fn register_live_handler(
        &self,
        ds_type: impl Into<String>,
        handler: Arc<dyn QueryHandler>,
    ) {
        self.live_handlers.insert(ds_type.into(), handler);
    }

    pub fn remove_live_handler(&self, ds_type: &str) -> Option<Arc<dyn QueryHandler>> {
        self.live_handlers.remove(ds_type).map(|(_, h)| h)
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub fn has_plugin(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }

    pub fn plugin_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.plugins.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }
}

impl PluginRegistry for PluginManager {
    fn plugin(&self, id: &str) -> Option<Arc<PluginDescriptor>> {
        self.plugins.get(id).map(|p| Arc::clone(p.value()))
    }

    fn live_handler(&self, ds_type: &str) -> Option<Arc<dyn QueryHandler>> {
        self.live_handlers.get(ds_type).map(|h| Arc::clone(h.value()))
    }
}
