//! Installed plugins and the lookup contract the services consume.
//!
//! A plugin is a directory with a `plugin.json` manifest declaring its id,
//! type and bundled assets ("includes"):
//!
//! ```text
//! plugins/
//! └── acme-app/
//!     ├── plugin.json
//!     └── dashboards/
//!         └── overview.json
//! ```
//!
//! ```json
//! {
//!   "id": "acme-app",
//!   "type": "app",
//!   "includes": [{ "type": "dashboard", "path": "dashboards/overview.json" }]
//! }
//! ```

mod discovery;
mod error;
mod manager;
mod manifest;

pub use discovery::PluginDiscovery;
pub use error::PluginError;
pub use manager::{PluginManager, PluginRegistry};
pub use manifest::{IncludeKind, PluginDescriptor, PluginInclude, PluginManifest};
