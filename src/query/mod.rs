//! Data-source query dispatch.
//!
//! [`DataService`] resolves a data source's type to a [`QueryHandler`] in two
//! tiers: a live handler provided by the plugin subsystem, then a factory from
//! the [`HandlerRegistry`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use plugin_services::plugins::PluginManager;
//! use plugin_services::query::{DataQuery, DataService, DataSource, HandlerRegistry, QueryContext};
//!
//! # async fn example() -> Result<(), plugin_services::query::QueryError> {
//! let service = DataService::new(
//!     Arc::new(PluginManager::new()),
//!     Arc::new(HandlerRegistry::new()),
//! );
//! let ds = DataSource::new("Prod", "prometheus");
//! let response = service
//!     .handle_request(&QueryContext::new(), &ds, &DataQuery::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod dispatcher;
mod error;
mod handler;
mod registry;
mod types;

pub use dispatcher::DataService;
pub use error::{BoxError, QueryError};
pub use handler::{HandlerFactory, QueryContext, QueryHandler};
pub use registry::HandlerRegistry;
pub use types::{DataQuery, DataResponse, DataSource, DataSubQuery, QueryResult, TimeRange};
