//! Handler for entry files in the watched directory.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::indexing::DirectoryIndexer;
use crate::watcher::{WatchAction, WatchError, WatchHandler};

/// Routes changes of eligible files to reindex/remove actions.
pub struct EntryFileHandler {
    indexer: Arc<DirectoryIndexer>,
}

impl EntryFileHandler {
    pub fn new(indexer: Arc<DirectoryIndexer>) -> Self {
        Self { indexer }
    }
}

#[async_trait]
impl WatchHandler for EntryFileHandler {
    fn name(&self) -> &str {
        "entries"
    }

    fn matches(&self, path: &Path) -> bool {
        self.indexer.is_eligible(path)
    }

    async fn on_modify(&self, path: &Path) -> Result<WatchAction, WatchError> {
        // A rename away from the folder arrives as a modify of a missing path
        if path.is_file() {
            Ok(WatchAction::Reindex {
                path: path.to_path_buf(),
            })
        } else {
            Ok(WatchAction::Remove {
                path: path.to_path_buf(),
            })
        }
    }

    async fn on_delete(&self, path: &Path) -> Result<WatchAction, WatchError> {
        Ok(WatchAction::Remove {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::fs;
    use tempfile::TempDir;

    fn handler(root: &Path) -> EntryFileHandler {
        let mut settings = Settings::default();
        settings.watch.root = root.to_path_buf();
        EntryFileHandler::new(Arc::new(DirectoryIndexer::new(&settings).unwrap()))
    }

    #[tokio::test]
    async fn test_actions() {
        let temp_dir = TempDir::new().unwrap();
        let handler = handler(temp_dir.path());
        let root = temp_dir.path().canonicalize().unwrap();
        let present = root.join("a.txt");
        let missing = root.join("b.txt");
        fs::write(&present, "A|1").unwrap();

        assert!(handler.matches(&present));
        assert!(!handler.matches(&root.join("notes.md")));
        assert_eq!(
            handler.on_modify(&present).await.unwrap(),
            WatchAction::Reindex {
                path: present.clone()
            }
        );
        assert_eq!(
            handler.on_modify(&missing).await.unwrap(),
            WatchAction::Remove {
                path: missing.clone()
            }
        );
        assert_eq!(
            handler.on_delete(&present).await.unwrap(),
            WatchAction::Remove { path: present }
        );
    }
}
