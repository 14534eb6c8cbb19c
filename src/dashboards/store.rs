//! Persisted dashboards and the store contract used for reconciliation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::document::DEFAULT_REVISION;
use crate::query::BoxError;

fn default_revision() -> i64 {
    DEFAULT_REVISION
}

/// A dashboard already imported for an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDashboard {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub org_id: i64,
    #[serde(default)]
    pub plugin_id: String,
    #[serde(default)]
    pub folder_id: i64,
    #[serde(default = "default_revision")]
    pub revision: i64,
}

impl StoredDashboard {
    pub fn new(id: i64, slug: impl Into<String>) -> Self {
        Self {
            id,
            uid: None,
            slug: slug.into(),
            title: String::new(),
            org_id: 0,
            plugin_id: String::new(),
            folder_id: 0,
            revision: DEFAULT_REVISION,
        }
    }

    pub fn for_plugin(mut self, org_id: i64, plugin_id: impl Into<String>) -> Self {
        self.org_id = org_id;
        self.plugin_id = plugin_id.into();
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_revision(mut self, revision: i64) -> Self {
        self.revision = revision;
        self
    }

    /// Canonical path of the dashboard, without any app sub-URL.
    pub fn url(&self) -> String {
        match self.uid.as_deref() {
            Some(uid) if !uid.is_empty() => format!("/d/{}/{}", uid, self.slug),
            _ => format!("/dashboard/db/{}", self.slug),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Dashboard store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Dashboard store error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Dashboards imported by `plugin_id` into `org_id`, in store order.
    async fn dashboards_by_plugin(
        &self,
        org_id: i64,
        plugin_id: &str,
    ) -> Result<Vec<StoredDashboard>, StoreError>;
}

/// In-memory store (for testing and single-instance deployments).
#[derive(Debug, Default)]
pub struct MemoryDashboardStore {
    dashboards: Arc<RwLock<Vec<StoredDashboard>>>,
}

impl MemoryDashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dashboards(dashboards: Vec<StoredDashboard>) -> Self {
        Self {
            dashboards: Arc::new(RwLock::new(dashboards)),
        }
    }

    /// Inserts or replaces (by id) a dashboard.
    pub async fn save(&self, dashboard: StoredDashboard) {
        let mut dashboards = self.dashboards.write().await;
        match dashboards.iter_mut().find(|d| d.id == dashboard.id) {
            Some(existing) => *existing = dashboard,
            None => dashboards.push(dashboard),
        }
    }

    pub async fn delete(&self, id: i64) -> bool {
        let mut dashboards = self.dashboards.write().await;
        let before = dashboards.len();
        dashboards.retain(|d| d.id != id);
        dashboards.len() != before
    }

    pub async fn count(&self) -> usize {
        self.dashboards.read().await.len()
    }
}

#[async_trait]
impl DashboardStore for MemoryDashboardStore {
    async fn dashboards_by_plugin(
        &self,
        org_id: i64,
        plugin_id: &str,
    ) -> Result<Vec<StoredDashboard>, StoreError> {
        let dashboards = self.dashboards.read().await;
        Ok(dashboards
            .iter()
            .filter(|d| d.org_id == org_id && d.plugin_id == plugin_id)
            .cloned()
            .collect())
    }
}
