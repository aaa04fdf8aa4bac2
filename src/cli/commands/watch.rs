//! Watch command - keep the index in sync and report changes.

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::indexing::IndexEvent;
use crate::watcher::DirectoryWatcher;

use super::{initial_scan, open_indexer};

pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let indexer = open_indexer(settings)?;

    // Registered before the scan so nothing written meanwhile is missed
    let watcher = DirectoryWatcher::builder()
        .indexer(indexer.clone())
        .debounce_ms(settings.watch.debounce_ms)
        .build()?;
    initial_scan(&indexer).await?;
    let mut events = indexer.subscribe();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(watcher.watch(cancel.clone()));

    {
        let reader = indexer.reader();
        let entries = reader.read().await.len();
        eprintln!(
            "Watching {} ({entries} entries). Press Ctrl+C to stop.",
            indexer.root().display()
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(IndexEvent::FileReindexed { path, entries }) => {
                    println!("reindexed {} ({entries} entries)", path.display());
                }
                Ok(IndexEvent::FileRemoved { path, entries }) => {
                    println!("removed {} ({entries} entries)", path.display());
                }
                Ok(IndexEvent::ScanCompleted { .. }) => {}
                Err(e) => tracing::warn!("[watch] event stream: {e}"),
            },
        }
    }

    cancel.cancel();
    handle.await??;
    Ok(())
}
