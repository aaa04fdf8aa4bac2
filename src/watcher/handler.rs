//! Handler trait and the actions a handler asks the watcher to run.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::WatchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    /// Reparse the file and swap its entries.
    Reindex { path: PathBuf },

    /// Drop the file's entries.
    Remove { path: PathBuf },
}

/// Decides what a file event means for the index.
///
/// Modifications reach the handler after debouncing, deletions right away.
#[async_trait]
pub trait WatchHandler: Send + Sync {
    /// Name used as the log component.
    fn name(&self) -> &str;

    /// Whether events for `path` concern this handler.
    fn matches(&self, path: &Path) -> bool;

    async fn on_modify(&self, path: &Path) -> Result<WatchAction, WatchError>;

    async fn on_delete(&self, path: &Path) -> Result<WatchAction, WatchError>;
}
