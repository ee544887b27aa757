//! File discovery for finding images in a single directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::DatasetConfig;
use crate::error::{PipelineError, PipelineResult};

/// Lists image files directly inside a directory (no recursion).
pub struct ImageDiscovery {
    extensions: Vec<String>,
}

impl ImageDiscovery {
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &DatasetConfig) -> Self {
        Self::new(&config.extensions)
    }

    /// Discover all supported image files in `dir`.
    ///
    /// Results are sorted by path so repeated runs see the same order.
    pub fn discover(&self, dir: &Path) -> PipelineResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(PipelineError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| self.is_supported(p))
            .collect();

        files.sort();
        tracing::debug!("Discovered {} images in {:?}", files.len(), dir);
        Ok(files)
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for ImageDiscovery {
    fn default() -> Self {
        Self::from_config(&DatasetConfig::default())
    }
}
