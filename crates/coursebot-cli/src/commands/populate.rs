//! Populate command

use crate::app::{OutputFormat, PopulateArgs};
use anyhow::Result;
use coursebot_core::session::{open_database, open_store};
use coursebot_core::{populate, Config, PopulateOutcome};

pub async fn run(args: PopulateArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let db = open_database(config)?;
    let collection = &config.corpus.collection;

    if args.force {
        let removed = db.delete_collection(collection)?;
        tracing::info!("Removed {} stored courses from '{}'", removed, collection);
    }

    let store = open_store(config, db)?;
    let dataset = args
        .dataset
        .unwrap_or_else(|| config.corpus.dataset_path.clone());
    let outcome = populate(store.as_ref(), &dataset).await?;

    match format {
        OutputFormat::Json => {
            let value = match &outcome {
                PopulateOutcome::Skipped { existing } => serde_json::json!({
                    "status": "skipped",
                    "collection": collection,
                    "existing": existing,
                }),
                PopulateOutcome::Inserted { count, elapsed } => serde_json::json!({
                    "status": "inserted",
                    "collection": collection,
                    "count": count,
                    "elapsed_secs": elapsed.as_secs_f64(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Cli => match outcome {
            PopulateOutcome::Skipped { existing } => {
                println!(
                    "Collection '{}' already holds {} courses; nothing to load",
                    collection, existing
                );
            }
            PopulateOutcome::Inserted { count, elapsed } => {
                println!(
                    "Loaded {} courses into '{}' in {:.2}s",
                    count,
                    collection,
                    elapsed.as_secs_f64()
                );
            }
        },
    }
    Ok(())
}
