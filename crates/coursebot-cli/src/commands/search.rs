//! Search command: raw retrieval with distances

use super::joined;
use crate::app::{OutputFormat, SearchArgs};
use anyhow::Result;
use coursebot_core::rag::is_relevant;
use coursebot_core::session::{open_database, open_store};
use coursebot_core::{Config, VectorStore};

pub async fn run(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = joined(&args.query, "search query")?;
    let limit = args.limit.unwrap_or(config.retrieval.n_results);
    let threshold = config.retrieval.relevance_threshold;

    let store = open_store(config, open_database(config)?)?;
    let matches = store.query(&query, limit).await?;

    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = matches
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "id": m.id,
                        "distance": m.distance,
                        "relevant": is_relevant(m.distance, threshold),
                        "metadata": m.metadata,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Cli => {
            if matches.is_empty() {
                println!("No results found");
                return Ok(());
            }
            for (rank, m) in matches.iter().enumerate() {
                let field = |key: &str| m.metadata.get(key).map(String::as_str).unwrap_or("-");
                let flag = if is_relevant(m.distance, threshold) {
                    "relevant"
                } else {
                    "below threshold"
                };
                println!(
                    "{:>2}. {} ({}) [{:.4}, {}]",
                    rank + 1,
                    field("name"),
                    field("rmit_code"),
                    m.distance,
                    flag
                );
                println!("    Campus: {}  ATAR: {}", field("campus"), field("ATAR"));
            }
        }
    }
    Ok(())
}
