//! Coursebot CLI
//!
//! Ask questions about courses from the terminal.

use anyhow::Result;
use clap::Parser;
use coursebot_core::error::exit_codes;
use coursebot_core::{Config, CourseBotError};

mod app;
mod commands;

use app::{Cli, Commands};

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CourseBotError>())
        .map(CourseBotError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Config(args) = &cli.command {
        if args.init {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            return commands::config::init(&path);
        }
    }

    let config = match &cli.config {
        Some(path) => Config::load_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Populate(args) => commands::populate::run(args, &config, cli.format).await,
        Commands::Status => commands::status::run(&config, cli.format).await,
        Commands::Search(args) => commands::search::run(args, &config, cli.format).await,
        Commands::Ask(args) => commands::ask::run(args, config, cli.format).await,
        Commands::Config(_) => commands::config::run(&config, cli.format),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}
