//! Configuration module for linedex.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `LINEDEX_` and use double
//! underscores to separate nested levels:
//! - `LINEDEX_WATCH__ROOT=/srv/links` sets `watch.root`
//! - `LINEDEX_WATCH__DEBOUNCE_MS=100` sets `watch.debounce_ms`
//! - `LINEDEX_CLASSIFY__HONOR_CATEGORY=false` sets `classify.honor_category`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Watched directory settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// File discovery settings
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Record format settings
    #[serde(default)]
    pub parsing: ParsingConfig,

    /// Classification settings
    #[serde(default)]
    pub classify: ClassifyConfig,

    /// External actions run on activation
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Log levels
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchConfig {
    /// Directory holding the entry files
    #[serde(default = "default_watch_root")]
    pub root: PathBuf,

    /// File extensions (without dot) that are indexed
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// How long a file must be quiet before it is reparsed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// Glob patterns of file names to skip
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

/// On-disk record layout.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// Decide from the first record line.
    Auto,
    /// `label|payload` with continuation lines.
    Multiline,
    /// `label|payload|category|icon` with 3 or 4 fields.
    Tabular,
}

/// Per-file format override, matched against the file name.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FormatRule {
    pub pattern: String,
    pub format: RecordFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ParsingConfig {
    /// Separator between label and payload in the multi-line format
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Field separators of the tabular format
    #[serde(default = "default_tabular_separators")]
    pub tabular_separators: Vec<char>,

    /// Format used when no rule matches
    #[serde(default = "default_format")]
    pub format: RecordFormat,

    /// Ordered file-name rules; first match wins
    #[serde(default)]
    pub rules: Vec<FormatRule>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClassifyConfig {
    /// Use the category column of tabular records instead of heuristics
    #[serde(default = "default_true")]
    pub honor_category: bool,
}

/// External command template.
///
/// Arguments may contain `{target}`, `{name}` or `{script}` placeholders.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Arguments with `{placeholder}` replaced by `value`.
    pub fn render_args(&self, placeholder: &str, value: &str) -> Vec<String> {
        let token = format!("{{{placeholder}}}");
        self.args.iter().map(|a| a.replace(&token, value)).collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DispatchConfig {
    /// Generic opener used when the URI handler fails
    #[serde(default = "default_opener")]
    pub opener: CommandSpec,

    /// Terminal used for scripts when installed
    #[serde(default = "default_preferred_terminal")]
    pub preferred_terminal: CommandSpec,

    /// Terminal launcher used otherwise
    #[serde(default = "default_fallback_terminal")]
    pub fallback_terminal: CommandSpec,

    /// Secret-store lookup, first output line is copied
    #[serde(default = "default_secret_command")]
    pub secret_command: CommandSpec,

    /// One-time-code lookup, first output line is copied
    #[serde(default = "default_otp_command")]
    pub otp_command: CommandSpec,

    /// Preview length in notifications
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Send desktop notifications
    #[serde(default = "default_true")]
    pub notify: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all modules
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `linedex::watcher = "debug"`
    #[serde(default)]
    pub modules: IndexMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_watch_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".csv-search-provider")
}
fn default_extensions() -> Vec<String> {
    vec!["csv".to_string(), "txt".to_string()]
}
fn default_debounce_ms() -> u64 {
    300
}
fn default_ignore_patterns() -> Vec<String> {
    vec!["*~".to_string(), "*.swp".to_string(), "*.bak".to_string()]
}
fn default_delimiter() -> char {
    '|'
}
fn default_tabular_separators() -> Vec<char> {
    vec!['|', ';']
}
fn default_format() -> RecordFormat {
    RecordFormat::Auto
}
fn default_true() -> bool {
    true
}
fn default_opener() -> CommandSpec {
    CommandSpec::new("xdg-open", &["{target}"])
}
fn default_preferred_terminal() -> CommandSpec {
    CommandSpec::new(
        "gnome-terminal",
        &["--", "bash", "-c", "{script}; read -rp 'Press Enter to close...'"],
    )
}
fn default_fallback_terminal() -> CommandSpec {
    CommandSpec::new(
        "x-terminal-emulator",
        &["-e", "bash", "-c", "{script}; read -rp 'Press Enter to close...'"],
    )
}
fn default_secret_command() -> CommandSpec {
    CommandSpec::new("pass", &["show", "{name}"])
}
fn default_otp_command() -> CommandSpec {
    CommandSpec::new("pass", &["otp", "{name}"])
}
fn default_preview_chars() -> usize {
    40
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            watch: WatchConfig::default(),
            indexing: IndexingConfig::default(),
            parsing: ParsingConfig::default(),
            classify: ClassifyConfig::default(),
            dispatch: DispatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: default_watch_root(),
            extensions: default_extensions(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            tabular_separators: default_tabular_separators(),
            format: default_format(),
            rules: Vec::new(),
        }
    }
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            honor_category: true,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            opener: default_opener(),
            preferred_terminal: default_preferred_terminal(),
            fallback_terminal: default_fallback_terminal(),
            secret_command: default_secret_command(),
            otp_command: default_otp_command(),
            preview_chars: default_preview_chars(),
            notify: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: IndexMap::new(),
        }
    }
}

impl Settings {
    /// Default location of the settings file.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linedex")
            .join("settings.toml")
    }

    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from(Self::default_config_path())
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nested levels
            .merge(Env::prefixed("LINEDEX_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file
    pub fn init_config_file(path: &Path, force: bool) -> anyhow::Result<()> {
        if !force && path.exists() {
            anyhow::bail!(
                "Configuration file {} already exists. Use --force to overwrite",
                path.display()
            );
        }

        Settings::default().save(path)
    }
}
