//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use coursebot_core::session::open_database;
use coursebot_core::Config;

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let db = open_database(config)?;
    let stats = db.get_stats()?;
    let path = config.store_path();

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "store_path": path,
                "schema_version": db.schema_version()?,
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Cli => {
            println!("Store:           {}", path.display());
            println!("Collections:     {}", stats.collection_count);
            println!("Documents:       {}", stats.document_count);
            for collection in &stats.collections {
                println!();
                println!("{}:", collection.name);
                println!("  Documents:     {}", collection.document_count);
                println!(
                    "  Model:         {}",
                    collection.embedding_model.as_deref().unwrap_or("-")
                );
                if let Some(dimensions) = collection.dimensions {
                    println!("  Dimensions:    {}", dimensions);
                }
            }
        }
    }
    Ok(())
}
