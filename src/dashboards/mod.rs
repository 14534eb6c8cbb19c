//! Plugin dashboard loading and reconciliation.
//!
//! Plugins bundle dashboard JSON files through `dashboard` includes. The
//! [`DashboardService`] compares those with what the [`DashboardStore`] holds
//! for an organization and reports each dashboard as not yet imported,
//! imported (with both revisions), or removed from the plugin.
//!
//! Dashboards are matched by slug.

mod document;
mod error;
mod loader;
mod reconcile;
mod source;
mod store;

pub use document::{DEFAULT_REVISION, DashboardDocument, slugify};
pub use error::DashboardError;
pub use loader::DashboardLoader;
pub use reconcile::{DashboardService, PluginDashboardInfo};
pub use source::{DashboardReader, DashboardSource, LocalDashboardSource};
pub use store::{DashboardStore, MemoryDashboardStore, StoreError, StoredDashboard};
