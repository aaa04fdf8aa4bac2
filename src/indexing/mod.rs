//! Directory indexing: discovery, parsing and store updates.

pub mod directory;
pub mod error;
pub mod notifications;
pub mod walker;

pub use directory::{DirectoryIndexer, ScanStats};
pub use error::{IndexError, IndexResult};
pub use notifications::{IndexEvent, NotificationBroadcaster};
pub use walker::FileWalker;
