//! Routes queries to live plugin handlers or factory-built handlers.

use std::sync::Arc;

use tracing::Instrument;

use super::error::{BoxError, QueryError};
use super::handler::{QueryContext, QueryHandler};
use super::registry::HandlerRegistry;
use super::types::{DataQuery, DataResponse, DataSource};
use crate::observability::{DispatchRoute, DispatchSpan, ServiceMetrics};
use crate::plugins::PluginRegistry;

/// Handles data requests to data sources.
pub struct DataService {
    plugins: Arc<dyn PluginRegistry>,
    handlers: Arc<HandlerRegistry>,
    metrics: Arc<ServiceMetrics>,
}

impl DataService {
    pub fn new(plugins: Arc<dyn PluginRegistry>, handlers: Arc<HandlerRegistry>) -> Self {
        Self {
            plugins,
            handlers,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<ServiceMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Registers (or replaces) the factory for a data-source type.
    pub fn register_query_handler<F>(&self, ds_type: impl Into<String>, factory: F)
    where
        F: Fn(&DataSource) -> Result<Arc<dyn QueryHandler>, BoxError> + Send + Sync + 'static,
    {
        self.handlers.register(ds_type, factory);
    }

    /// Forwards `query` to the handler for `data_source.ds_type`.
    ///
    /// A live plugin handler takes precedence; otherwise a handler is built
    /// from the registered factory for this call only. Handler results and
    /// errors are returned as-is.
    pub async fn handle_request(
        &self,
        ctx: &QueryContext,
        data_source: &DataSource,
        query: &DataQuery,
    ) -> Result<DataResponse, QueryError> {
        let span = DispatchSpan::new(&data_source.ds_type, &data_source.name);

        let result = async {
            let (handler, route) = self.resolve(data_source)?;
            span.record_route(route);
            self.metrics.record_route(route);
            handler.data_query(ctx, data_source, query).await
        }
        .instrument(span.span().clone())
        .await;

        let elapsed_ms = span.finish(result.is_err());
        self.metrics.record_dispatch_end(result.is_ok(), elapsed_ms);
        result
    }

    fn resolve(
        &self,
        data_source: &DataSource,
    ) -> Result<(Arc<dyn QueryHandler>, DispatchRoute), QueryError> {
        let ds_type = data_source.ds_type.as_str();

        if let Some(handler) = self.plugins.live_handler(ds_type) {
            tracing::debug!(ds_type, "Using live plugin handler");
            return Ok((handler, DispatchRoute::Live));
        }

        let Some(factory) = self.handlers.lookup(ds_type) else {
            self.metrics.dispatch_unknown_type.inc();
            tracing::warn!(ds_type, "No handler registered for data source type");
            return Err(QueryError::unknown_type(ds_type));
        };

        match factory(data_source) {
            Ok(handler) => {
                tracing::debug!(ds_type, "Instantiated query handler from factory");
                Ok((handler, DispatchRoute::Factory))
            }
            Err(source) => {
                self.metrics.dispatch_instantiation_failures.inc();
                tracing::warn!(ds_type, error = %source, "Failed to instantiate query handler");
                Err(QueryError::HandlerInstantiation {
                    ds_type: ds_type.to_string(),
                    source,
                })
            }
        }
    }
}
