use std::path::PathBuf;

use super::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Plugin not found: {plugin_id}")]
    PluginNotFound { plugin_id: String },

    #[error("Failed to read dashboard {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dashboard {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DashboardError {
    pub fn plugin_not_found(plugin_id: impl Into<String>) -> Self {
        Self::PluginNotFound {
            plugin_id: plugin_id.into(),
        }
    }

    pub(crate) fn from_json(path: PathBuf, source: serde_json::Error) -> Self {
        if source.is_io() {
            Self::Read {
                path,
                source: source.into(),
            }
        } else {
            Self::Parse { path, source }
        }
    }

    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::plugin_not_found("acme");
        assert_eq!(err.to_string(), "Plugin not found: acme");
        assert!(err.path().is_none());

        let err = DashboardError::Read {
            path: PathBuf::from("/plugins/acme/dash.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("/plugins/acme/dash.json"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_from_json_syntax_is_parse() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DashboardError::from_json(PathBuf::from("d.json"), json_err);
        assert!(matches!(err, DashboardError::Parse { .. }));
        assert_eq!(err.path(), Some(std::path::Path::new("d.json")));
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err: DashboardError = StoreError::unavailable("connection refused").into();
        assert_eq!(
            err.to_string(),
            StoreError::unavailable("connection refused").to_string()
        );
    }
}
