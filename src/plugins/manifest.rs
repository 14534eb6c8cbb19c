use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::PluginError;

pub(super) const PLUGIN_MANIFEST_FILE: &str = "plugin.json";

/// Kind of asset a plugin bundles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeKind {
    Dashboard,
    Page,
    Panel,
    Datasource,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInclude {
    #[serde(rename = "type")]
    pub kind: IncludeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub path: String,
}

impl PluginInclude {
    pub fn dashboard(path: impl Into<String>) -> Self {
        Self {
            kind: IncludeKind::Dashboard,
            name: None,
            path: path.into(),
        }
    }

    pub fn is_dashboard(&self) -> bool {
        self.kind == IncludeKind::Dashboard
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    pub id: String,
    #[serde(rename = "type")]
    pub plugin_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<PluginInclude>,
}

impl PluginManifest {
    pub fn new(id: impl Into<String>, plugin_type: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            plugin_type: plugin_type.into(),
            includes: Vec::new(),
        }
    }

    pub fn with_include(mut self, include: PluginInclude) -> Self {
        self.includes.push(include);
        self
    }

    pub fn load(root_dir: &Path) -> Result<Self, PluginError> {
        let manifest_path = root_dir.join(PLUGIN_MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(PluginError::ManifestNotFound {
                path: manifest_path,
            });
        }
        let content = std::fs::read_to_string(&manifest_path)?;
        serde_json::from_str(&content).map_err(|e| PluginError::InvalidManifest {
            path: manifest_path,
            reason: e.to_string(),
        })
    }
}

/// A loaded plugin: its manifest plus the directory it was loaded from.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    pub(crate) manifest: PluginManifest,
    pub(crate) root_dir: PathBuf,
}

impl PluginDescriptor {
    pub fn new(manifest: PluginManifest, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            root_dir: root_dir.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn plugin_type(&self) -> &str {
        &self.manifest.plugin_type
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn includes(&self) -> &[PluginInclude] {
        &self.manifest.includes
    }

    /// Dashboard includes in declaration order.
    pub fn dashboard_includes(&self) -> impl Iterator<Item = &PluginInclude> {
        self.manifest.includes.iter().filter(|i| i.is_dashboard())
    }

    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root_dir.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_manifest_load() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(PLUGIN_MANIFEST_FILE),
            r#"{
                "id": "acme-app",
                "type": "app",
                "name": "Acme",
                "includes": [
                    {"type": "dashboard", "name": "Overview", "path": "dashboards/overview.json"},
                    {"type": "page", "name": "Config"},
                    {"type": "widget", "path": "widgets/w.json"}
                ]
            }"#,
        )
        .unwrap();

        let manifest = PluginManifest::load(dir.path()).unwrap();
        assert_eq!(manifest.id, "acme-app");
        assert_eq!(manifest.plugin_type, "app");
        assert_eq!(manifest.includes.len(), 3);
        assert_eq!(manifest.includes[0].kind, IncludeKind::Dashboard);
        assert_eq!(manifest.includes[0].path, "dashboards/overview.json");
        assert_eq!(manifest.includes[1].kind, IncludeKind::Page);
        assert!(manifest.includes[1].path.is_empty());
        assert_eq!(
            manifest.includes[2].kind,
            IncludeKind::Other("widget".into())
        );
    }

    #[test]
    fn test_manifest_not_found() {
        let dir = tempdir().unwrap();
        let err = PluginManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, PluginError::ManifestNotFound { .. }));
    }

    #[test]
    fn test_manifest_invalid_json() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PLUGIN_MANIFEST_FILE), "{not json").unwrap();
        let err = PluginManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, PluginError::InvalidManifest { .. }));
    }

    #[test]
    fn test_manifest_missing_id() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PLUGIN_MANIFEST_FILE), r#"{"type":"app"}"#).unwrap();
        let err = PluginManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, PluginError::InvalidManifest { .. }));
    }

    #[test]
    fn test_dashboard_includes_keep_order() {
        let manifest = PluginManifest::new("acme", "datasource")
            .with_include(PluginInclude::dashboard("b.json"))
            .with_include(PluginInclude {
                kind: IncludeKind::Page,
                name: Some("Setup".into()),
                path: String::new(),
            })
            .with_include(PluginInclude::dashboard("a.json"));
        let descriptor = PluginDescriptor::new(manifest, "/plugins/acme");

        let paths: Vec<&str> = descriptor
            .dashboard_includes()
            .map(|i| i.path.as_str())
            .collect();
        assert_eq!(paths, vec!["b.json", "a.json"]);
        assert_eq!(
            descriptor.resolve("b.json"),
            PathBuf::from("/plugins/acme/b.json")
        );
        assert_eq!(descriptor.name(), "acme");
    }
}
