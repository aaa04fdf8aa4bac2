//! Entry storage and the read-only handle given to query components.

pub mod memory;

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};

pub use memory::{EntryStore, ReplaceStats};

/// Read-only view of the store owned by the indexer.
///
/// Matcher, provider and dispatcher only ever hold this handle, so the
/// indexer stays the single writer.
#[derive(Debug, Clone)]
pub struct StoreReader {
    inner: Arc<RwLock<EntryStore>>,
}

impl StoreReader {
    pub(crate) fn new(inner: Arc<RwLock<EntryStore>>) -> Self {
        Self { inner }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, EntryStore> {
        self.inner.read().await
    }
}
