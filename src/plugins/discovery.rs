use std::path::{Path, PathBuf};

use super::PluginError;
use super::manifest::{PLUGIN_MANIFEST_FILE, PluginDescriptor, PluginManifest};

pub struct PluginDiscovery;

impl PluginDiscovery {
    /// Finds plugins in `dirs`. Each entry may be a plugin root itself or a
    /// directory whose immediate children are plugin roots.
    pub fn discover(dirs: &[PathBuf]) -> Result<Vec<PluginDescriptor>, PluginError> {
        let mut descriptors = Vec::new();

        for dir in dirs {
            if !dir.exists() {
                tracing::debug!(dir = %dir.display(), "Plugin directory does not exist, skipping");
                continue;
            }

            if Self::is_plugin_root(dir) {
                let manifest = PluginManifest::load(dir)?;
                descriptors.push(PluginDescriptor::new(manifest, dir.clone()));
            } else {
                Self::scan_children(dir, &mut descriptors)?;
            }
        }

        Ok(descriptors)
    }

    fn is_plugin_root(dir: &Path) -> bool {
        dir.join(PLUGIN_MANIFEST_FILE).is_file()
    }

    fn scan_children(
        parent: &Path,
        descriptors: &mut Vec<PluginDescriptor>,
    ) -> Result<(), PluginError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(parent)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        // read_dir order is platform dependent
        paths.sort();

        for path in paths {
            if path.is_dir() && Self::is_plugin_root(&path) {
                let manifest = PluginManifest::load(&path)?;
                descriptors.push(PluginDescriptor::new(manifest, path));
            }
        }

        Ok(())
    }
}
