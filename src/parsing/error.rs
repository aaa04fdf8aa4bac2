//! Error types for reading entry files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a file for parsing.
///
/// The indexer absorbs these: the file is skipped and the store keeps
/// whatever it held for that file before.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },
}

pub type ParseResult<T> = Result<T, ParseError>;
