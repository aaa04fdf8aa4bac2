//! In-memory entry store partitioned by source file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::types::{Entry, EntryId};

/// Counts from replacing one file's entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceStats {
    pub removed: usize,
    pub added: usize,
}

/// Current set of entries.
///
/// Files keep their first-seen position, so iteration order is stable:
/// file insertion order, then record order within the file.
#[derive(Debug, Default)]
pub struct EntryStore {
    files: IndexMap<PathBuf, Vec<Entry>>,
    /// id -> owning file
    ids: HashMap<EntryId, PathBuf>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in the complete entry list of `path`.
    ///
    /// Entries are expected to come from one parse of `path`. An entry whose
    /// id is already owned by another file is dropped.
    pub fn replace_file(&mut self, path: &Path, entries: Vec<Entry>) -> ReplaceStats {
        let removed = self.drop_ids(path);

        let mut kept = Vec::with_capacity(entries.len());
        for entry in entries {
            if self.ids.contains_key(&entry.id) {
                tracing::warn!("[store] duplicate id {} from {}", entry.id, path.display());
                continue;
            }
            self.ids.insert(entry.id.clone(), path.to_path_buf());
            kept.push(entry);
        }
        let added = kept.len();

        if kept.is_empty() {
            self.files.shift_remove(path);
        } else if let Some(slot) = self.files.get_mut(path) {
            *slot = kept;
        } else {
            self.files.insert(path.to_path_buf(), kept);
        }

        ReplaceStats { removed, added }
    }

    /// Remove all entries of `path`, returning how many were removed.
    pub fn remove_file(&mut self, path: &Path) -> usize {
        let removed = self.drop_ids(path);
        self.files.shift_remove(path);
        removed
    }

    fn drop_ids(&mut self, path: &Path) -> usize {
        match self.files.get(path) {
            Some(old) => {
                for entry in old {
                    self.ids.remove(&entry.id);
                }
                old.len()
            }
            None => 0,
        }
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        let path = self.ids.get(id)?;
        self.files.get(path)?.iter().find(|e| &e.id == id)
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.ids.contains_key(id)
    }

    /// All entries in store order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.files.values().flatten()
    }

    /// Entries of one file.
    pub fn entries_for(&self, path: &Path) -> &[Entry] {
        self.files.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    /// Files with at least one entry.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.ids.clear();
    }
}
