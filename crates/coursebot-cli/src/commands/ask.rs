//! Ask command: one full advisor turn

use super::joined;
use crate::app::{AskArgs, OutputFormat};
use anyhow::Result;
use coursebot_core::{Config, PopulateOutcome, SessionContext};

pub async fn run(args: AskArgs, config: Config, format: OutputFormat) -> Result<()> {
    let question = joined(&args.question, "question")?;
    let context = SessionContext::initialize(config).await?;
    if let Some(expires) = context.credentials_expire() {
        tracing::debug!("Temporary credentials expire at {}", expires);
    }

    if let Some(PopulateOutcome::Inserted { count, .. }) = context.populated() {
        eprintln!("Loaded {} courses into the vector store", count);
    }

    let mut chat = context.chat();
    chat.submit(&question)?;
    let reply = chat.respond().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reply)?),
        OutputFormat::Cli => println!("{}", reply.text.trim()),
    }

    context.shutdown();
    Ok(())
}
