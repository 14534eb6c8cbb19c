//! # plugin-services
//!
//! Data-source query dispatch and plugin dashboard reconciliation.
//!
//! - [`query::DataService`] routes a query to the handler for its data-source
//!   type: a live plugin handler when one is running, otherwise a handler
//!   built on demand from a registered factory.
//! - [`dashboards::DashboardService`] compares the dashboards a plugin bundles
//!   with those already imported for an organization.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use plugin_services::PluginServices;
//! use plugin_services::dashboards::MemoryDashboardStore;
//! use plugin_services::plugins::PluginManager;
//!
//! # async fn example() -> plugin_services::Result<()> {
//! let plugins = PluginManager::load_from_dirs(&["/var/lib/plugins".into()])?;
//! let services = PluginServices::builder()
//!     .plugins(Arc::new(plugins))
//!     .store(Arc::new(MemoryDashboardStore::new()))
//!     .build()?;
//!
//! for row in services.plugin_dashboards(1, "acme-app").await? {
//!     println!("{} imported={} removed={}", row.title, row.imported, row.removed);
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod dashboards;
pub mod observability;
pub mod plugins;
pub mod prelude;
pub mod query;
mod services;

pub use config::{ConfigBuilder, ConfigError, ServiceConfig};
pub use dashboards::{
    DashboardDocument, DashboardError, DashboardService, DashboardStore, MemoryDashboardStore,
    PluginDashboardInfo, StoreError, StoredDashboard,
};
pub use observability::{MetricsSummary, ServiceMetrics};
pub use plugins::{PluginDescriptor, PluginError, PluginInclude, PluginManager, PluginRegistry};
pub use query::{
    BoxError, DataQuery, DataResponse, DataService, DataSource, HandlerRegistry, QueryContext,
    QueryError, QueryHandler,
};
pub use services::{PluginServices, PluginServicesBuilder};

use std::path::PathBuf;

/// Error type for plugin-services operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The plugin id is not installed.
    #[error("Plugin not found: {plugin_id}")]
    PluginNotFound { plugin_id: String },

    /// A bundled dashboard file is missing or unreadable.
    #[error("Failed to read dashboard {path}: {source}")]
    DashboardRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A bundled dashboard file is not valid JSON.
    #[error("Failed to parse dashboard {path}: {source}")]
    DashboardParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The dashboard store reported a failure.
    #[error(transparent)]
    Store(StoreError),

    /// No live handler and no factory for the data-source type.
    #[error("could not find plugin corresponding to data source type: {ds_type:?}")]
    UnknownDataSourceType { ds_type: String },

    /// The factory for the data-source type failed.
    #[error("could not instantiate endpoint for data plugin {ds_type:?}: {source}")]
    HandlerInstantiation {
        ds_type: String,
        #[source]
        source: BoxError,
    },

    /// Error returned by the query handler itself.
    #[error(transparent)]
    Handler(QueryError),

    /// Plugin manifest or discovery failure.
    #[error(transparent)]
    Plugin(PluginError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid service setup: {0}")]
    Setup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Requested plugin does not exist
    NotFound,
    /// Misconfiguration: unknown types, failing factories, bad settings
    Configuration,
    /// Broken plugin contents (manifests, bundled dashboards)
    Integrity,
    /// Failures reported by collaborators (store, query handlers)
    Upstream,
    /// IO and other unexpected states
    Internal,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::PluginNotFound { .. } => ErrorCategory::NotFound,

            Error::UnknownDataSourceType { .. }
            | Error::HandlerInstantiation { .. }
            | Error::Config(_)
            | Error::Setup(_) => ErrorCategory::Configuration,

            Error::DashboardRead { .. } | Error::DashboardParse { .. } | Error::Plugin(_) => {
                ErrorCategory::Integrity
            }

            Error::Store(_) | Error::Handler(_) => ErrorCategory::Upstream,

            Error::Io(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// Only transient store failures are worth retrying; this crate never
    /// retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_transient())
    }
}

impl From<DashboardError> for Error {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::PluginNotFound { plugin_id } => Error::PluginNotFound { plugin_id },
            DashboardError::Read { path, source } => Error::DashboardRead { path, source },
            DashboardError::Parse { path, source } => Error::DashboardParse { path, source },
            DashboardError::Store(e) => Error::Store(e),
        }
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::UnknownDataSourceType { ds_type } => {
                Error::UnknownDataSourceType { ds_type }
            }
            QueryError::HandlerInstantiation { ds_type, source } => {
                Error::HandlerInstantiation { ds_type, source }
            }
            other => Error::Handler(other),
        }
    }
}

impl From<PluginError> for Error {
    fn from(err: PluginError) -> Self {
        match err {
            PluginError::NotFound { id } => Error::PluginNotFound { plugin_id: id },
            PluginError::Io(e) => Error::Io(e),
            other => Error::Plugin(other),
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_error_conversion() {
        let err: Error = DashboardError::plugin_not_found("acme").into();
        assert!(matches!(err, Error::PluginNotFound { ref plugin_id } if plugin_id == "acme"));
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = DashboardError::Parse {
            path: PathBuf::from("d.json"),
            source: json_err,
        }
        .into();
        assert!(matches!(err, Error::DashboardParse { .. }));
        assert_eq!(err.category(), ErrorCategory::Integrity);
    }

    #[test]
    fn test_query_error_conversion() {
        let err: Error = QueryError::unknown_type("graphite").into();
        assert!(matches!(err, Error::UnknownDataSourceType { .. }));
        assert!(err.is_configuration_error());
        assert!(!err.is_retryable());

        let err: Error = QueryError::handler("timeout talking to upstream").into();
        assert_eq!(err.to_string(), "timeout talking to upstream");
        assert_eq!(err.category(), ErrorCategory::Upstream);
    }

    #[test]
    fn test_store_error_retryable() {
        let err: Error = DashboardError::Store(StoreError::unavailable("locked")).into();
        assert!(err.is_retryable());

        let err: Error = StoreError::backend("constraint").into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_plugin_error_conversion() {
        let err: Error = PluginError::not_found("x").into();
        assert!(matches!(err, Error::PluginNotFound { .. }));

        let err: Error = PluginError::DuplicateId {
            id: "x".into(),
            first: PathBuf::from("/a"),
            second: PathBuf::from("/b"),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Integrity);
    }
}
