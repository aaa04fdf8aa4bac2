//! File parsing: turns the text of one entry file into records.
//!
//! Two layouts are supported, selected per file by [`ParserFactory`]:
//! - multi-line `label|payload` records where lines without the delimiter
//!   continue the open payload
//! - tabular `label|payload|category|icon` rows with no continuation

pub mod error;
pub mod factory;
pub mod multiline;
pub mod tabular;

use std::path::Path;

pub use error::{ParseError, ParseResult};
pub use factory::ParserFactory;
pub use multiline::{MultilineParser, MultilineRecords};
pub use tabular::{TabularParser, TabularRecords};

/// One parsed record before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub display_text: String,
    pub payload: String,
    /// Category column of a tabular row.
    pub category: Option<String>,
    /// Icon column of a tabular row.
    pub icon_hint: Option<String>,
}

/// Lazy record sequence of either layout.
#[derive(Debug)]
pub enum Records<'a> {
    Multiline(MultilineRecords<'a>),
    Tabular(TabularRecords<'a>),
}

impl Iterator for Records<'_> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        match self {
            Records::Multiline(records) => records.next(),
            Records::Tabular(records) => records.next(),
        }
    }
}

/// Read a file as UTF-8 text without blocking the runtime.
pub async fn read_file(path: &Path) -> ParseResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ParseError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    String::from_utf8(bytes).map_err(|_| ParseError::NotUtf8 {
        path: path.to_path_buf(),
    })
}
