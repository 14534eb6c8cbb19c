//! Prelude module for convenient imports.
//!
//! ```rust
//! use plugin_services::prelude::*;
//! ```

pub use crate::Error;
pub use crate::Result;
pub use crate::{PluginServices, PluginServicesBuilder};

// Plugins
pub use crate::plugins::{PluginDescriptor, PluginManager, PluginRegistry};

// Dashboards
pub use crate::dashboards::{
    DashboardService, DashboardStore, MemoryDashboardStore, PluginDashboardInfo, StoredDashboard,
};

// Queries
pub use crate::query::{
    BoxError, DataQuery, DataResponse, DataService, DataSource, HandlerRegistry, QueryContext,
    QueryError, QueryHandler, QueryResult,
};

// Config
pub use crate::config::{ConfigBuilder, ServiceConfig};
