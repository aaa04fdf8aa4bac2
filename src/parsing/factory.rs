//! Parser factory for choosing a record format per file.
//!
//! The format is configuration, not a hard-coded rule: file-name glob rules
//! are checked first, then the configured default. `auto` inspects the first
//! record line of the text.

use std::path::Path;

use glob::Pattern;

use crate::config::{ParsingConfig, RecordFormat};

use super::multiline::MultilineParser;
use super::tabular::{TabularParser, is_tabular_shape, split_fields};
use super::{RawRecord, Records};

/// Creates record parsers based on file name and content.
#[derive(Debug, Clone)]
pub struct ParserFactory {
    delimiter: char,
    separators: Vec<char>,
    default_format: RecordFormat,
    rules: Vec<(Pattern, RecordFormat)>,
}

impl ParserFactory {
    /// Create a factory from parsing settings.
    ///
    /// Invalid glob patterns are logged and ignored.
    pub fn new(config: &ParsingConfig) -> Self {
        let rules = config
            .rules
            .iter()
            .filter_map(|rule| match Pattern::new(&rule.pattern) {
                Ok(pattern) => Some((pattern, rule.format)),
                Err(e) => {
                    tracing::warn!("[parser] invalid format rule '{}': {e}", rule.pattern);
                    None
                }
            })
            .collect();

        Self {
            delimiter: config.delimiter,
            separators: config.tabular_separators.clone(),
            default_format: config.format,
            rules,
        }
    }

    /// Configured format for a file, before probing.
    pub fn configured_format(&self, path: &Path) -> RecordFormat {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return self.default_format;
        };

        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(name))
            .map(|(_, format)| *format)
            .unwrap_or(self.default_format)
    }

    /// Detect the format from the first record line: 3-4 tabular fields means tabular.
    pub fn detect(&self, text: &str) -> RecordFormat {
        let first = text.lines().map(str::trim).find(|line| {
            !line.is_empty() && !line.starts_with('#')
        });

        match first {
            Some(line) if is_tabular_shape(split_fields(line, &self.separators).len()) => {
                RecordFormat::Tabular
            }
            _ => RecordFormat::Multiline,
        }
    }

    /// Resolve the concrete format for a file's text.
    pub fn resolve(&self, path: &Path, text: &str) -> RecordFormat {
        match self.configured_format(path) {
            RecordFormat::Auto => self.detect(text),
            format => format,
        }
    }

    /// Lazily parse `text` as the records of `path`.
    pub fn records<'a>(&'a self, path: &Path, text: &'a str) -> Records<'a> {
        match self.resolve(path, text) {
            RecordFormat::Tabular => {
                Records::Tabular(TabularParser::new(text, &self.separators).records())
            }
            _ => Records::Multiline(MultilineParser::new(text, self.delimiter).records()),
        }
    }

    /// Parse eagerly.
    pub fn parse(&self, path: &Path, text: &str) -> Vec<RawRecord> {
        self.records(path, text).collect()
    }
}
