//! Two-field records with multi-line continuation.
//!
//! ```text
//! # comment
//! GitHub token|ghp_xxx
//! Server notes|first line
//! second line
//! ```

use std::str::Lines;

use super::RawRecord;

/// Parser for `label<delimiter>payload` records.
///
/// Holds only a borrowed view of the text, so iterating twice yields the
/// same records.
#[derive(Debug, Clone, Copy)]
pub struct MultilineParser<'a> {
    text: &'a str,
    delimiter: char,
}

impl<'a> MultilineParser<'a> {
    pub fn new(text: &'a str, delimiter: char) -> Self {
        Self { text, delimiter }
    }

    pub fn records(&self) -> MultilineRecords<'a> {
        MultilineRecords {
            lines: self.text.lines(),
            delimiter: self.delimiter,
            open: None,
        }
    }
}

/// Record being accumulated.
#[derive(Debug)]
struct OpenRecord {
    display_text: String,
    payload: String,
}

impl OpenRecord {
    /// Trim the record boundaries and drop records with an empty field.
    fn finish(self) -> Option<RawRecord> {
        let payload = self.payload.trim();
        if self.display_text.is_empty() || payload.is_empty() {
            return None;
        }
        Some(RawRecord {
            display_text: self.display_text,
            payload: payload.to_string(),
            category: None,
            icon_hint: None,
        })
    }
}

/// Lazy iterator over multi-line records.
#[derive(Debug)]
pub struct MultilineRecords<'a> {
    lines: Lines<'a>,
    delimiter: char,
    open: Option<OpenRecord>,
}

impl Iterator for MultilineRecords<'_> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        loop {
            let Some(line) = self.lines.next() else {
                return self.open.take().and_then(OpenRecord::finish);
            };

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some((label, rest)) = line.split_once(self.delimiter) {
                let started = OpenRecord {
                    display_text: label.trim().to_string(),
                    payload: rest.trim().to_string(),
                };
                if let Some(record) = self.open.replace(started).and_then(OpenRecord::finish) {
                    return Some(record);
                }
            } else if let Some(open) = self.open.as_mut() {
                open.payload.push('\n');
                open.payload.push_str(line);
            }
            // Stray text before the first record is dropped
        }
    }
}
