//! Command implementations for the CLI.
//!
//! Each command lives in its own module; shared start-up lives here.

pub mod activate;
pub mod index;
pub mod init;
pub mod serve;
pub mod watch;

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::dispatch::{Dispatcher, SystemSinks};
use crate::indexing::DirectoryIndexer;
use crate::provider::SearchProvider;

/// Build the indexer for the configured root without scanning it.
pub fn open_indexer(settings: &Settings) -> anyhow::Result<Arc<DirectoryIndexer>> {
    let indexer = DirectoryIndexer::new(settings).with_context(|| {
        format!(
            "cannot index {} (run `linedex init` to create it)",
            settings.watch.root.display()
        )
    })?;
    Ok(Arc::new(indexer))
}

/// Run the initial scan and log its totals.
pub async fn initial_scan(indexer: &DirectoryIndexer) -> anyhow::Result<()> {
    let stats = indexer.scan(&CancellationToken::new()).await?;
    crate::log_event!(
        "indexer",
        "scan complete",
        "{} files, {} entries, {} failed",
        stats.files_indexed,
        stats.entries,
        stats.files_failed
    );
    Ok(())
}

/// Build the indexer for the configured root and run the initial scan.
pub async fn scanned_indexer(settings: &Settings) -> anyhow::Result<Arc<DirectoryIndexer>> {
    let indexer = open_indexer(settings)?;
    initial_scan(&indexer).await?;
    Ok(indexer)
}

/// Search provider over `indexer` using the system sinks.
pub fn provider_for(indexer: &DirectoryIndexer, settings: &Settings) -> SearchProvider {
    let dispatcher = Dispatcher::new(Arc::new(SystemSinks::new()), settings.dispatch.clone());
    SearchProvider::new(indexer.reader(), dispatcher)
}
