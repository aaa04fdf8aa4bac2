//! Serve command - JSON-lines search provider on stdio.

use tokio::io::{BufReader, stdin, stdout};
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::protocol::serve_lines;
use crate::watcher::DirectoryWatcher;

use super::{initial_scan, open_indexer, provider_for};

pub async fn run(settings: &Settings, watch: bool) -> anyhow::Result<()> {
    let indexer = open_indexer(settings)?;
    let provider = provider_for(&indexer, settings);
    let cancel = CancellationToken::new();

    // Register the root before scanning so edits made during the scan
    // are queued for the watcher
    let watcher = if watch {
        let watcher = DirectoryWatcher::builder()
            .indexer(indexer.clone())
            .debounce_ms(settings.watch.debounce_ms)
            .build()?;
        Some(watcher)
    } else {
        None
    };
    initial_scan(&indexer).await?;
    let watcher = watcher.map(|watcher| tokio::spawn(watcher.watch(cancel.clone())));

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    crate::log_event!("serve", "ready", "{}", indexer.root().display());
    let answered = serve_lines(&provider, BufReader::new(stdin()), stdout(), &cancel).await?;
    crate::log_event!("serve", "stopped", "{answered} replies");

    cancel.cancel();
    if let Some(handle) = watcher {
        handle.await??;
    }
    indexer.clear().await;
    Ok(())
}
