//! Activate command - run one entry's action.

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::dispatch::Activation;
use crate::types::EntryId;

use super::{provider_for, scanned_indexer};

pub async fn run(settings: &Settings, id: &str) -> anyhow::Result<()> {
    let indexer = scanned_indexer(settings).await?;
    let provider = provider_for(&indexer, settings);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    match provider.activate(&EntryId::from(id), &cancel).await {
        Activation::Opened { uri, via_fallback } => {
            let via = if via_fallback { " (via opener)" } else { "" };
            println!("Opened {uri}{via}");
        }
        Activation::Copied { preview } => println!("Copied: {preview}"),
        Activation::Spawned { program } => println!("Started {program}"),
        Activation::Cancelled => println!("Cancelled"),
        Activation::Failed { reason } => anyhow::bail!(reason),
    }
    Ok(())
}
