//! Handler implementations for the directory watcher.

mod entry;

pub use entry::EntryFileHandler;
