use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin not found: {id}")]
    NotFound { id: String },

    #[error("Plugin manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Invalid plugin manifest at {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Duplicate plugin id '{id}': first at {first}, second at {second}")]
    DuplicateId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PluginError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}
