//! Data-source type to handler factory mapping.

use std::sync::Arc;

use dashmap::DashMap;

use super::error::BoxError;
use super::handler::{HandlerFactory, QueryHandler};
use super::types::DataSource;

/// Factories keyed by data-source type. Registration overwrites; there is no
/// removal.
#[derive(Default)]
pub struct HandlerRegistry {
    factories: DashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, ds_type: impl Into<String>, factory: F)
    where
        F: Fn(&DataSource) -> Result<Arc<dyn QueryHandler>, BoxError> + Send + Sync + 'static,
    {
        self.register_factory(ds_type, Arc::new(factory));
    }

    pub fn register_factory(&self, ds_type: impl Into<String>, factory: HandlerFactory) {
        let ds_type = ds_type.into();
        if self.factories.insert(ds_type.clone(), factory).is_some() {
            tracing::debug!(ds_type = %ds_type, "Replaced query handler factory");
        }
    }

    /// Builder-style registration for startup wiring.
    pub fn with<F>(self, ds_type: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&DataSource) -> Result<Arc<dyn QueryHandler>, BoxError> + Send + Sync + 'static,
    {
        self.register(ds_type, factory);
        self
    }

    pub fn lookup(&self, ds_type: &str) -> Option<HandlerFactory> {
        self.factories.get(ds_type).map(|f| Arc::clone(f.value()))
    }

    pub fn contains(&self, ds_type: &str) -> bool {
        self.factories.contains_key(ds_type)
    }

    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
