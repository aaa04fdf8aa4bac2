//! Index and Search commands.

use crate::config::Settings;

use super::{provider_for, scanned_indexer};

/// Scan once and print per-file counts.
pub async fn run_index(settings: &Settings, verbose: bool) -> anyhow::Result<()> {
    let indexer = scanned_indexer(settings).await?;
    let reader = indexer.reader();
    let store = reader.read().await;

    for path in store.files() {
        let entries = store.entries_for(path);
        println!("{:>5}  {}", entries.len(), path.display());
        if verbose {
            for entry in entries {
                println!("       {:<18} {}", entry.content_type.tag(), entry.display_text);
            }
        }
    }
    println!(
        "Indexed {} entries from {} files in {}",
        store.len(),
        store.file_count(),
        indexer.root().display()
    );
    Ok(())
}

/// Print matching entries, one per line.
pub async fn run_search(
    settings: &Settings,
    terms: &[String],
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let indexer = scanned_indexer(settings).await?;
    let provider = provider_for(&indexer, settings);

    let mut ids = provider.list_matches(terms).await;
    if let Some(max) = limit {
        ids = provider.filter_results(ids, max);
    }
    let results = provider.describe(&ids).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        eprintln!("No entries match {terms:?}");
    }
    for meta in results {
        println!("{}\t{}\t{}", meta.id, meta.title, meta.subtitle);
    }
    Ok(())
}
