//! Compares the dashboards a plugin bundles with those already imported.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use super::DashboardError;
use super::loader::DashboardLoader;
use super::source::DashboardSource;
use super::store::DashboardStore;
use crate::observability::{ServiceMetrics, reconcile_span};
use crate::plugins::PluginRegistry;

/// One row of the reconciliation result.
///
/// Rows for bundled dashboards carry plugin, title, path and revision data.
/// Rows for imported dashboards the plugin no longer bundles carry only
/// `slug`, `dashboard_id` and `removed = true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDashboardInfo {
    pub plugin_id: String,
    pub title: String,
    pub imported: bool,
    pub imported_uri: String,
    pub imported_url: String,
    pub slug: String,
    pub dashboard_id: i64,
    pub folder_id: i64,
    pub imported_revision: i64,
    pub revision: i64,
    pub description: String,
    pub path: String,
    pub removed: bool,
}

impl PluginDashboardInfo {
    /// Bundled dashboard with a newer revision than the imported copy.
    pub fn has_update(&self) -> bool {
        self.imported && self.revision > self.imported_revision
    }
}

pub struct DashboardService {
    plugins: Arc<dyn PluginRegistry>,
    store: Arc<dyn DashboardStore>,
    loader: DashboardLoader,
    app_sub_url: String,
    metrics: Arc<ServiceMetrics>,
}

impl DashboardService {
    pub fn new(plugins: Arc<dyn PluginRegistry>, store: Arc<dyn DashboardStore>) -> Self {
        Self {
            loader: DashboardLoader::new(Arc::clone(&plugins)),
            plugins,
            store,
            app_sub_url: String::new(),
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn DashboardSource>) -> Self {
        self.loader = self.loader.with_source(source);
        self
    }

    /// Prefix for imported dashboard URLs when served under a sub-path.
    pub fn with_app_sub_url(mut self, app_sub_url: impl Into<String>) -> Self {
        self.app_sub_url = app_sub_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<ServiceMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn loader(&self) -> &DashboardLoader {
        &self.loader
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Lists the plugin's bundled dashboards followed by imported dashboards
    /// it no longer bundles.
    ///
    /// Fails as a whole if the plugin is unknown, the store query fails, or
    /// any bundled dashboard cannot be read or parsed.
    pub async fn plugin_dashboards(
        &self,
        org_id: i64,
        plugin_id: &str,
    ) -> Result<Vec<PluginDashboardInfo>, DashboardError> {
        let span = reconcile_span(org_id, plugin_id);
        let result = self
            .reconcile(org_id, plugin_id)
            .instrument(span.clone())
            .await;

        match &result {
            Ok(rows) => {
                span.record("rows", rows.len() as u64);
                let removed = rows.iter().filter(|r| r.removed).count();
                self.metrics.record_reconciliation(Ok(removed));
            }
            Err(e) => {
                tracing::warn!(parent: &span, error = %e, "Dashboard reconciliation failed");
                self.metrics.record_reconciliation(Err(()));
            }
        }
        result
    }

    async fn reconcile(
        &self,
        org_id: i64,
        plugin_id: &str,
    ) -> Result<Vec<PluginDashboardInfo>, DashboardError> {
        let plugin = self
            .plugins
            .plugin(plugin_id)
            .ok_or_else(|| DashboardError::plugin_not_found(plugin_id))?;

        let existing = self.store.dashboards_by_plugin(org_id, plugin_id).await?;

        let mut result = Vec::new();
        let mut matched: HashSet<i64> = HashSet::new();

        for include in plugin.dashboard_includes() {
            let dashboard = self.loader.load(plugin.id(), &include.path)?;

            let mut row = PluginDashboardInfo {
                plugin_id: plugin.id().to_string(),
                title: dashboard.title.clone(),
                path: include.path.clone(),
                revision: dashboard.revision,
                description: dashboard.description().unwrap_or_default().to_string(),
                ..Default::default()
            };

            let matches = existing
                .iter()
                .filter(|d| !dashboard.slug.is_empty() && d.slug == dashboard.slug);
            for stored in matches {
                row.dashboard_id = stored.id;
                row.imported = true;
                row.imported_uri = format!("db/{}", stored.slug);
                row.imported_url = format!("{}{}", self.app_sub_url, stored.url());
                row.imported_revision = stored.revision;
                matched.insert(stored.id);
            }

            tracing::debug!(
                path = %include.path,
                slug = %dashboard.slug,
                imported = row.imported,
                "Reconciled bundled dashboard"
            );
            result.push(row);
        }

        for stored in existing.iter().filter(|d| !matched.contains(&d.id)) {
            result.push(PluginDashboardInfo {
                slug: stored.slug.clone(),
                dashboard_id: stored.id,
                removed: true,
                ..Default::default()
            });
        }

        Ok(result)
    }
}
