//! Fixed 3-4 field records without continuation.
//!
//! ```text
//! Jump host|ssh admin@10.0.0.1|SSH
//! "Team standup";https://meet.example.com/abc;meeting;camera
//! ```

use std::str::Lines;

use crate::types::ContentType;

use super::RawRecord;

/// Split a line on any of `separators`.
///
/// A field that opens with a double quote runs to the closing quote, so
/// separators inside it do not split. Fields are trimmed.
pub fn split_fields(line: &str, separators: &[char]) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        if in_quotes {
            if c == '"' {
                in_quotes = false;
            } else {
                current.push(c);
            }
            continue;
        }

        if c == '"' && current.trim().is_empty() {
            current.clear();
            in_quotes = true;
        } else if separators.contains(&c) {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Whether a split line has the shape of a tabular record.
pub fn is_tabular_shape(field_count: usize) -> bool {
    (3..=4).contains(&field_count)
}

/// Parser for tabular records.
#[derive(Debug, Clone, Copy)]
pub struct TabularParser<'a> {
    text: &'a str,
    separators: &'a [char],
}

impl<'a> TabularParser<'a> {
    pub fn new(text: &'a str, separators: &'a [char]) -> Self {
        Self { text, separators }
    }

    pub fn records(&self) -> TabularRecords<'a> {
        TabularRecords {
            lines: self.text.lines(),
            separators: self.separators,
        }
    }
}

/// Lazy iterator over tabular records.
#[derive(Debug)]
pub struct TabularRecords<'a> {
    lines: Lines<'a>,
    separators: &'a [char],
}

impl TabularRecords<'_> {
    fn record_from_line(&self, line: &str) -> Option<RawRecord> {
        let mut fields = split_fields(line, self.separators);
        if !is_tabular_shape(fields.len()) {
            crate::debug_event!("parser", "skipped line", "{} fields", fields.len());
            return None;
        }

        let fourth = if fields.len() == 4 { fields.pop() } else { None };
        let third = fields.pop().unwrap_or_default();
        let payload = fields.pop().unwrap_or_default();
        let display_text = fields.pop().unwrap_or_default();

        if display_text.is_empty() || payload.is_empty() {
            return None;
        }

        let (category, icon_hint) = match fourth {
            Some(icon) => (non_empty(third), non_empty(icon)),
            // A lone third column is a category only when it names one
            None if ContentType::from_category(&third).is_some() => (Some(third), None),
            None => (None, non_empty(third)),
        };

        Some(RawRecord {
            display_text,
            payload,
            category,
            icon_hint,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

impl Iterator for TabularRecords<'_> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        loop {
            let line = self.lines.next()?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(record) = self.record_from_line(line) {
                return Some(record);
            }
        }
    }
}
