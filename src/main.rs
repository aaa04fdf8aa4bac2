use clap::Parser;

use linedex::cli::commands;
use linedex::cli::{Cli, Commands};
use linedex::{Settings, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.unwrap_or_else(Settings::default_config_path);

    if let Commands::Init { force } = cli.command {
        logging::init();
        return commands::init::run_init(&config_path, force);
    }

    let settings = Settings::load_from(&config_path).unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        Settings::default()
    });
    logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Config => commands::init::run_config(&settings),
        Commands::Index { verbose } => commands::index::run_index(&settings, verbose).await,
        Commands::Search { terms, limit, json } => {
            commands::index::run_search(&settings, &terms, limit, json).await
        }
        Commands::Activate { id } => commands::activate::run(&settings, &id).await,
        Commands::Watch => commands::watch::run(&settings).await,
        Commands::Serve { no_watch } => commands::serve::run(&settings, !no_watch).await,
    }
}
