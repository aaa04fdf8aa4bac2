//! Directory indexer: keeps the entry store in sync with the watched folder.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;

use crate::classify::Classifier;
use crate::config::Settings;
use crate::parsing::{ParseError, ParserFactory, read_file};
use crate::storage::{EntryStore, ReplaceStats, StoreReader};
use crate::types::{Entry, EntryId};

use super::error::{IndexError, IndexResult};
use super::notifications::{IndexEvent, NotificationBroadcaster};
use super::walker::FileWalker;

/// Statistics for a full scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files_indexed: usize,
    pub files_failed: usize,
    pub entries: usize,
}

/// Owner and only writer of the entry store.
pub struct DirectoryIndexer {
    store: Arc<RwLock<EntryStore>>,
    walker: FileWalker,
    parsers: ParserFactory,
    classifier: Classifier,
    broadcaster: NotificationBroadcaster,
}

impl DirectoryIndexer {
    /// Create an indexer for `settings.watch.root`.
    ///
    /// The root must exist; it is canonicalized so paths reported by the
    /// file watcher compare equal to the ones produced by scanning.
    pub fn new(settings: &Settings) -> IndexResult<Self> {
        let root = resolve_root(&settings.watch.root)?;

        Ok(Self {
            store: Arc::new(RwLock::new(EntryStore::new())),
            walker: FileWalker::new(root, &settings.watch, &settings.indexing),
            parsers: ParserFactory::new(&settings.parsing),
            classifier: Classifier::new(&settings.classify),
            broadcaster: NotificationBroadcaster::default(),
        })
    }

    pub fn root(&self) -> &Path {
        self.walker.root()
    }

    /// Whether a path belongs to the indexed set.
    pub fn is_eligible(&self, path: &Path) -> bool {
        self.walker.is_eligible(path)
    }

    /// Read-only handle for query components.
    pub fn reader(&self) -> StoreReader {
        StoreReader::new(Arc::clone(&self.store))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IndexEvent> {
        self.broadcaster.subscribe()
    }

    /// Build classified entries for one file's text.
    pub fn parse_entries(&self, path: &Path, text: &str) -> Vec<Entry> {
        self.parsers
            .records(path, text)
            .enumerate()
            .map(|(ordinal, record)| Entry {
                id: EntryId::new(path, ordinal),
                content_type: self.classifier.classify_record(&record),
                display_text: record.display_text,
                payload: record.payload,
                source_file: path.to_path_buf(),
                icon_hint: record.icon_hint,
            })
            .collect()
    }

    /// Index every eligible file in the root.
    ///
    /// Files that fail to parse are counted and skipped. Cancelling stops
    /// before the next file; entries already swapped in stay.
    pub async fn scan(&self, cancel: &CancellationToken) -> IndexResult<ScanStats> {
        let walker = self.walker.clone();
        let files = tokio::task::spawn_blocking(move || walker.walk())
            .await
            .map_err(|e| IndexError::ListingFailed(e.to_string()))?;

        crate::log_event!("indexer", "scanning", "{} files in {}", files.len(), self.root().display());

        let mut stats = ScanStats::default();
        for path in files {
            if cancel.is_cancelled() {
                crate::debug_event!("indexer", "scan cancelled");
                break;
            }
            match self.index_file(&path).await {
                Ok(replaced) => {
                    stats.files_indexed += 1;
                    stats.entries += replaced.added;
                }
                Err(e) => {
                    tracing::warn!("[indexer] skipped {}: {e}", path.display());
                    stats.files_failed += 1;
                }
            }
        }

        self.broadcaster.send(IndexEvent::ScanCompleted {
            files: stats.files_indexed,
            entries: stats.entries,
        });
        Ok(stats)
    }

    /// Reparse one file and swap its entries in a single write.
    ///
    /// A read or decode failure leaves the file's previous entries in place,
    /// except when the file no longer exists, which removes them.
    pub async fn index_file(&self, path: &Path) -> Result<ReplaceStats, ParseError> {
        let text = match read_file(path).await {
            Ok(text) => text,
            Err(ParseError::Unreadable { source, .. }) if source.kind() == ErrorKind::NotFound => {
                self.remove_file(path).await;
                return Err(ParseError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
            Err(e) => return Err(e),
        };

        let entries = self.parse_entries(path, &text);
        let stats = {
            let mut store = self.store.write().await;
            store.replace_file(path, entries)
        };

        crate::log_event!(
            "indexer",
            "reindexed",
            "{} ({} entries, {} replaced)",
            path.display(),
            stats.added,
            stats.removed
        );
        self.broadcaster.send(IndexEvent::FileReindexed {
            path: path.to_path_buf(),
            entries: stats.added,
        });
        Ok(stats)
    }

    /// Drop every entry of `path`.
    pub async fn remove_file(&self, path: &Path) -> usize {
        let removed = {
            let mut store = self.store.write().await;
            store.remove_file(path)
        };

        if removed > 0 {
            crate::log_event!("indexer", "removed", "{} ({removed} entries)", path.display());
            self.broadcaster.send(IndexEvent::FileRemoved {
                path: path.to_path_buf(),
                entries: removed,
            });
        }
        removed
    }

    /// Empty the store, e.g. on shutdown.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }
}

fn resolve_root(root: &Path) -> IndexResult<PathBuf> {
    if !root.exists() {
        return Err(IndexError::RootMissing {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(IndexError::RootNotDirectory {
            path: root.to_path_buf(),
        });
    }
    root.canonicalize()
        .map_err(|source| IndexError::RootUnresolvable {
            path: root.to_path_buf(),
            source,
        })
}
