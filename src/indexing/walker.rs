//! File discovery for the watched directory.
//!
//! Only regular files directly inside the root are eligible:
//! - extension in the configured list (case-insensitive)
//! - not hidden (no leading `.`)
//! - file name not matching an ignore pattern
//!
//! Sub-directories are never descended into.

use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;

use crate::config::{IndexingConfig, WatchConfig};

/// Lists and filters entry files of one directory.
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
    extensions: Vec<String>,
    ignore_patterns: Vec<Pattern>,
}

impl FileWalker {
    /// Create a walker for `root` with the given settings.
    pub fn new(root: PathBuf, watch: &WatchConfig, indexing: &IndexingConfig) -> Self {
        let extensions = watch
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();

        let ignore_patterns = indexing
            .ignore_patterns
            .iter()
            .filter_map(|pattern| match Pattern::new(pattern) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("[walker] invalid ignore pattern '{pattern}': {e}");
                    None
                }
            })
            .collect();

        Self {
            root,
            extensions,
            ignore_patterns,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name-based eligibility; does not touch the file system so it also
    /// works for paths that were just deleted.
    pub fn is_eligible(&self, path: &Path) -> bool {
        if path.parent() != Some(self.root.as_path()) {
            return false;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.starts_with('.') {
            return false;
        }
        if self.ignore_patterns.iter().any(|p| p.matches(name)) {
            return false;
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    /// Eligible files under the root, sorted by file name.
    pub fn walk(&self) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(true)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b));

        builder
            .build()
            .filter_map(Result::ok) // Skip files we can't access
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| self.is_eligible(path))
            .collect()
    }
}
