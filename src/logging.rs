//! Diagnostics for linedex, written to stderr.
//!
//! Every line is prefixed with a wall-clock time and the emitting component,
//! e.g. `12:04:31.518  INFO linedex::cli::commands::serve: [serve] ready: /home/me/entries`.
//! stdout is never touched, since `linedex serve` speaks its protocol there.
//!
//! Levels come from the `[logging]` table of `settings.toml`; a set `RUST_LOG`
//! replaces that table entirely.
//!
//! ```toml
//! [logging]
//! default = "warn"
//! modules = { "linedex::dispatch" = "debug" }
//! ```
//!
//! ```bash
//! RUST_LOG=linedex::watcher=debug linedex watch
//! ```

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// `EnvFilter` directives for `config`: the default level, then one
/// `target=level` pair per module override.
fn filter_directives(config: &LoggingConfig) -> String {
    config
        .modules
        .iter()
        .fold(config.default.clone(), |mut directives, (module, level)| {
            directives.push(',');
            directives.push_str(module);
            directives.push('=');
            directives.push_str(level);
            directives
        })
}

/// Install the stderr subscriber. Later calls are ignored, so tests and the
/// CLI can both call it.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

/// Install the subscriber at the default `warn` level.
pub fn init() {
    init_with_config(&LoggingConfig::default());
}

/// Info line tagged with a component, e.g. `[serve] ready: /home/me/entries`.
///
/// ```ignore
/// log_event!("serve", "ready", "{}", root.display());
/// log_event!("indexer", "scan complete", "{} files", stats.files_indexed);
/// ```
#[macro_export]
macro_rules! log_event {
    ($component:expr, $event:expr) => {
        tracing::info!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

/// Same shape as [`log_event!`] at debug level.
///
/// ```ignore
/// debug_event!("sink", "clipboard tool failed", "{e}");
/// ```
#[macro_export]
macro_rules! debug_event {
    ($component:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}
