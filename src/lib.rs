//! Index a folder of line-oriented entry files, classify each entry's payload
//! and run a type-specific action when an entry is activated.

pub mod classify;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod indexing;
pub mod logging;
pub mod parsing;
pub mod protocol;
pub mod provider;
pub mod search;
pub mod storage;
pub mod types;
pub mod watcher;

pub use classify::Classifier;
pub use config::Settings;
pub use dispatch::{Activation, Dispatcher, Sinks, SystemSinks};
pub use indexing::{DirectoryIndexer, IndexEvent, ScanStats};
pub use parsing::{ParserFactory, RawRecord};
pub use provider::SearchProvider;
pub use storage::{EntryStore, StoreReader};
pub use types::{ContentType, Entry, EntryId, ResultMeta, UrlKind};
pub use watcher::DirectoryWatcher;
