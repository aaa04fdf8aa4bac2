//! Watcher for the entry directory.

use std::path::Path;
use std::sync::Arc;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::indexing::DirectoryIndexer;

use super::debouncer::Debouncer;
use super::error::WatchError;
use super::handler::{WatchAction, WatchHandler};
use super::handlers::EntryFileHandler;

/// How often pending changes are checked against their deadline.
const TICK: Duration = Duration::from_millis(100);

/// Keeps the indexer in sync with the watched directory.
///
/// The root is registered with `notify` when the watcher is built, so
/// changes made between `build()` and `watch()` are not lost.
pub struct DirectoryWatcher {
    handlers: Vec<Box<dyn WatchHandler>>,
    debouncer: Debouncer,
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    _watcher: notify::RecommendedWatcher,
    indexer: Arc<DirectoryIndexer>,
}

impl DirectoryWatcher {
    pub fn builder() -> DirectoryWatcherBuilder {
        DirectoryWatcherBuilder::new()
    }

    /// Run the event loop until `cancel` fires.
    ///
    /// Pending debounced changes are dropped on cancellation; the next scan
    /// picks them up.
    pub async fn watch(mut self, cancel: CancellationToken) -> Result<(), WatchError> {
        crate::log_event!("watcher", "started", "{}", self.indexer.root().display());

        let mut tick = interval(TICK);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    let dropped = self.debouncer.drain();
                    crate::log_event!("watcher", "stopped", "{} pending changes dropped", dropped.len());
                    return Ok(());
                }

                received = self.event_rx.recv() => {
                    match received {
                        Some(Ok(event)) => self.handle_event(event).await,
                        Some(Err(e)) => tracing::error!("[watcher] file watch error: {e}"),
                        None => return Err(WatchError::ChannelClosed),
                    }
                }

                _ = tick.tick() => {
                    for path in self.debouncer.take_ready() {
                        self.process_modification(&path).await;
                    }
                }
            }
        }
    }

    async fn handle_event(&mut self, event: Event) {
        for path in event.paths {
            if !self.handlers.iter().any(|h| h.matches(&path)) {
                crate::debug_event!("watcher", "unmatched", "{:?} {}", event.kind, path.display());
                continue;
            }

            match event.kind {
                EventKind::Create(_) | EventKind::Modify(_) => {
                    self.debouncer.record(path);
                }
                EventKind::Remove(_) => {
                    self.debouncer.remove(&path);
                    self.process_deletion(&path).await;
                }
                _ => {}
            }
        }
    }

    async fn process_modification(&self, path: &Path) {
        for handler in self.handlers.iter().filter(|h| h.matches(path)) {
            crate::debug_event!(handler.name(), "modified", "{}", path.display());
            match handler.on_modify(path).await {
                Ok(action) => self.execute_action(action, handler.name()).await,
                Err(e) => tracing::error!("[{}] handler error: {e}", handler.name()),
            }
        }
    }

    async fn process_deletion(&self, path: &Path) {
        for handler in self.handlers.iter().filter(|h| h.matches(path)) {
            crate::debug_event!(handler.name(), "deleted", "{}", path.display());
            match handler.on_delete(path).await {
                Ok(action) => self.execute_action(action, handler.name()).await,
                Err(e) => tracing::error!("[{}] handler error: {e}", handler.name()),
            }
        }
    }

    async fn execute_action(&self, action: WatchAction, handler_name: &str) {
        match action {
            WatchAction::Reindex { path } => {
                if let Err(e) = self.indexer.index_file(&path).await {
                    tracing::warn!("[{handler_name}] reindex failed: {e}");
                }
            }
            WatchAction::Remove { path } => {
                let removed = self.indexer.remove_file(&path).await;
                if removed == 0 {
                    crate::debug_event!(handler_name, "was not in index", "{}", path.display());
                }
            }
        }
    }
}

/// Builder for [`DirectoryWatcher`].
pub struct DirectoryWatcherBuilder {
    handlers: Vec<Box<dyn WatchHandler>>,
    indexer: Option<Arc<DirectoryIndexer>>,
    debounce_ms: u64,
}

impl DirectoryWatcherBuilder {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            indexer: None,
            debounce_ms: 300,
        }
    }

    /// Add a handler. Without any, an [`EntryFileHandler`] is installed.
    pub fn handler(mut self, handler: impl WatchHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn indexer(mut self, indexer: Arc<DirectoryIndexer>) -> Self {
        self.indexer = Some(indexer);
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Create the notify watcher and register the indexer's root.
    pub fn build(self) -> Result<DirectoryWatcher, WatchError> {
        let indexer = self.indexer.ok_or_else(|| WatchError::InitFailed {
            reason: "Indexer is required".to_string(),
        })?;

        let mut handlers = self.handlers;
        if handlers.is_empty() {
            handlers.push(Box::new(EntryFileHandler::new(Arc::clone(&indexer))));
        }

        let (tx, rx) = mpsc::channel(256);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        let root = indexer.root().to_path_buf();
        watcher
            .watch(&root, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: root.clone(),
                reason: e.to_string(),
            })?;
        crate::debug_event!("watcher", "watching", "{}", root.display());

        Ok(DirectoryWatcher {
            handlers,
            debouncer: Debouncer::new(self.debounce_ms),
            event_rx: rx,
            _watcher: watcher,
            indexer,
        })
    }
}

impl Default for DirectoryWatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
