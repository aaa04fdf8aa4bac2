//! Directory watcher for automatic re-indexing.
//!
//! # Architecture
//!
//! ```text
//! notify::RecommendedWatcher (non-recursive, on the root)
//!         |  blocking_send
//!         v
//!   mpsc channel --> DirectoryWatcher loop (select!)
//!                       - Debouncer for create/modify
//!                       - deletions immediately
//!                       - handlers decide the action
//!                         |
//!                  DirectoryIndexer
//! ```

mod debouncer;
mod error;
mod handler;
pub mod handlers;
mod directory;

pub use debouncer::Debouncer;
pub use directory::{DirectoryWatcher, DirectoryWatcherBuilder};
pub use error::WatchError;
pub use handler::{WatchAction, WatchHandler};
