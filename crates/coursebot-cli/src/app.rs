//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coursebot")]
#[command(
    author,
    version,
    about = "Course advisor answering from a local index of course records"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "COURSEBOT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the course dataset into the vector store
    Populate(PopulateArgs),

    /// Show vector store status
    Status,

    /// Similarity search over the course index
    Search(SearchArgs),

    /// Ask the advisor a single question
    Ask(AskArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct PopulateArgs {
    /// Course dataset (JSON array)
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Drop stored courses before loading
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search query
    pub query: Vec<String>,

    /// Number of results
    #[arg(short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct AskArgs {
    /// Question for the advisor
    pub question: Vec<String>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write a default config file if none exists
    #[arg(long)]
    pub init: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
