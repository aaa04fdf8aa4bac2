//! Per-file debouncing of change events.
//!
//! Editors often write a file several times per save (temp file, rename,
//! metadata touch). Each event pushes the file's deadline back; the file is
//! reparsed once it has been quiet for the whole window.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer {
    /// Path -> instant at which it becomes ready.
    deadlines: HashMap<PathBuf, Instant>,
    window: Duration,
}

impl Debouncer {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            deadlines: HashMap::new(),
            window: Duration::from_millis(debounce_ms),
        }
    }

    /// Record a change, restarting the window for `path`.
    pub fn record(&mut self, path: PathBuf) {
        self.record_at(path, Instant::now());
    }

    fn record_at(&mut self, path: PathBuf, now: Instant) {
        self.deadlines.insert(path, now + self.window);
    }

    /// Forget a pending change, e.g. because the file was deleted.
    pub fn remove(&mut self, path: &Path) -> bool {
        self.deadlines.remove(path).is_some()
    }

    /// Paths whose window has elapsed, in path order.
    pub fn take_ready(&mut self) -> Vec<PathBuf> {
        self.take_ready_at(Instant::now())
    }

    fn take_ready_at(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut ready = Vec::new();
        self.deadlines.retain(|path, deadline| {
            if *deadline <= now {
                ready.push(path.clone());
                false
            } else {
                true
            }
        });
        ready.sort();
        ready
    }

    pub fn has_pending(&self) -> bool {
        !self.deadlines.is_empty()
    }

    /// Everything still pending, regardless of deadline. Used on shutdown.
    pub fn drain(&mut self) -> Vec<PathBuf> {
        let mut all: Vec<PathBuf> = self.deadlines.drain().map(|(path, _)| path).collect();
        all.sort();
        all
    }
}
