//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

const AFTER_HELP: &str = "\
Quick Start:
  $ linedex init                      # Write settings and create the watched folder
  $ linedex search git hub            # Entries whose label contains both terms
  $ linedex activate '<id>'           # Run the entry's action
  $ linedex serve                     # JSON-lines search provider on stdio";

/// Line-oriented entry indexer and launcher
#[derive(Parser, Debug)]
#[command(
    name = "linedex",
    version = env!("CARGO_PKG_VERSION"),
    about = "Index a folder of line-oriented entry files and act on them",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true, env = "LINEDEX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default settings file and create the watched folder
    Init {
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },

    /// Display the effective settings
    Config,

    /// Scan the watched folder once and report what was found
    Index {
        /// List every entry with its content type
        #[arg(short, long)]
        verbose: bool,
    },

    /// List entries whose label contains every term
    Search {
        /// Search terms (AND, case-insensitive)
        #[arg(required = true)]
        terms: Vec<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the action of one entry
    Activate {
        /// Entry id as printed by `search`
        id: String,
    },

    /// Keep the index in sync with the folder and log changes
    Watch,

    /// Answer search-provider requests as JSON lines on stdin/stdout
    Serve {
        /// Do not watch the folder for changes
        #[arg(long)]
        no_watch: bool,
    },
}
