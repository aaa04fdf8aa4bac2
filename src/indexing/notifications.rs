//! Notification broadcasting for store changes.
//!
//! The indexer publishes one event per mutation so hosts (and tests) can
//! react to reindexing without polling the store.

use std::path::PathBuf;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEvent {
    FileReindexed { path: PathBuf, entries: usize },
    FileRemoved { path: PathBuf, entries: usize },
    ScanCompleted { files: usize, entries: usize },
}

/// Fan-out of index events to any number of subscribers.
#[derive(Debug, Clone)]
pub struct NotificationBroadcaster {
    sender: broadcast::Sender<IndexEvent>,
}

impl NotificationBroadcaster {
    /// Create a new broadcaster with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn send(&self, event: IndexEvent) {
        match self.sender.send(event.clone()) {
            Ok(count) => {
                crate::debug_event!("broadcast", "sent", "{event:?} to {count} subscribers");
            }
            Err(_) => {
                // No receivers, this is fine
                crate::debug_event!("broadcast", "dropped", "no subscribers for {event:?}");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IndexEvent> {
        self.sender.subscribe()
    }
}

impl Default for NotificationBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}
