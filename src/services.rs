//! Wiring for the dashboard and data services.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::dashboards::{DashboardService, DashboardSource, DashboardStore, PluginDashboardInfo};
use crate::observability::{MetricsSummary, ServiceMetrics};
use crate::plugins::{PluginManager, PluginRegistry};
use crate::query::{
    BoxError, DataQuery, DataResponse, DataService, DataSource, HandlerRegistry, QueryContext,
    QueryHandler,
};
use crate::{Error, Result};

/// Both services built over one plugin registry, sharing one set of metrics.
pub struct PluginServices {
    dashboards: DashboardService,
    data: DataService,
    metrics: Arc<ServiceMetrics>,
}

impl PluginServices {
    pub fn builder() -> PluginServicesBuilder {
        PluginServicesBuilder::default()
    }

    pub fn dashboards(&self) -> &DashboardService {
        &self.dashboards
    }

    pub fn data(&self) -> &DataService {
        &self.data
    }

    pub fn metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    pub async fn plugin_dashboards(
        &self,
        org_id: i64,
        plugin_id: &str,
    ) -> Result<Vec<PluginDashboardInfo>> {
        Ok(self.dashboards.plugin_dashboards(org_id, plugin_id).await?)
    }

    pub async fn handle_request(
        &self,
        ctx: &QueryContext,
        ds: &DataSource,
        query: &DataQuery,
    ) -> Result<DataResponse> {
        Ok(self.data.handle_request(ctx, ds, query).await?)
    }

    pub fn register_query_handler<F>(&self, ds_type: impl Into<String>, factory: F)
    where
        F: Fn(&DataSource) -> std::result::Result<Arc<dyn QueryHandler>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.data.register_query_handler(ds_type, factory);
    }
}

#[derive(Default)]
pub struct PluginServicesBuilder {
    plugins: Option<Arc<dyn PluginRegistry>>,
    store: Option<Arc<dyn DashboardStore>>,
    source: Option<Arc<dyn DashboardSource>>,
    handlers: Option<Arc<HandlerRegistry>>,
    metrics: Option<Arc<ServiceMetrics>>,
    config: ServiceConfig,
}

impl PluginServicesBuilder {
    /// Plugin registry. Without one, plugins are discovered from
    /// `config.plugin_dirs` at build time.
    pub fn plugins(mut self, plugins: Arc<dyn PluginRegistry>) -> Self {
        self.plugins = Some(plugins);
        self
    }

    pub fn store(mut self, store: Arc<dyn DashboardStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn source(mut self, source: Arc<dyn DashboardSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn handlers(mut self, handlers: Arc<HandlerRegistry>) -> Self {
        self.handlers = Some(handlers);
        self
    }

    pub fn metrics(mut self, metrics: Arc<ServiceMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<PluginServices> {
        let store = self
            .store
            .ok_or_else(|| Error::Setup("a dashboard store is required".into()))?;

        let plugins: Arc<dyn PluginRegistry> = match self.plugins {
            Some(plugins) => plugins,
            None => Arc::new(PluginManager::load_from_dirs(&self.config.plugin_dirs)?),
        };
        let handlers = self.handlers.unwrap_or_default();
        let metrics = self.metrics.unwrap_or_default();

        let mut dashboards = DashboardService::new(Arc::clone(&plugins), store)
            .with_app_sub_url(self.config.app_sub_url.as_str())
            .with_metrics(Arc::clone(&metrics));
        if let Some(source) = self.source {
            dashboards = dashboards.with_source(source);
        }

        let data = DataService::new(plugins, handlers).with_metrics(Arc::clone(&metrics));

        tracing::debug!(
            app_sub_url = %self.config.app_sub_url,
            handler_types = data.handlers().len(),
            "Plugin services ready"
        );

        Ok(PluginServices {
            dashboards,
            data,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::MemoryDashboardStore;

    #[test]
    fn test_build_requires_store() {
        let err = PluginServices::builder()
            .plugins(Arc::new(PluginManager::new()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, Error::Setup(_)));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_build_discovers_from_config_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let services = PluginServices::builder()
            .store(Arc::new(MemoryDashboardStore::new()))
            .config(ServiceConfig {
                plugin_dirs: vec![dir.path().to_path_buf()],
                app_sub_url: String::new(),
            })
            .build()
            .unwrap();
        assert_eq!(services.metrics(), MetricsSummary::default());
    }

    #[tokio::test]
    async fn test_errors_convert_to_crate_error() {
        let services = PluginServices::builder()
            .plugins(Arc::new(PluginManager::new()))
            .store(Arc::new(MemoryDashboardStore::new()))
            .build()
            .unwrap();

        let err = services.plugin_dashboards(1, "missing").await.unwrap_err();
        assert!(matches!(err, Error::PluginNotFound { .. }));

        let ds = DataSource::new("x", "nope");
        let err = services
            .handle_request(&QueryContext::new(), &ds, &DataQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownDataSourceType { ref ds_type } if ds_type == "nope"));

        let summary = services.metrics();
        assert_eq!(summary.reconciliation_failures, 1);
        assert_eq!(summary.unknown_types, 1);
    }
}
