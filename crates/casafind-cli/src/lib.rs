//! Casafind command-line interface.
//!
//! Stands in for the admin HTTP surface of the CMS: re-indexing content into
//! the embedding store and querying it the way the chat widget does.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Casafind - real-estate retrieval store
#[derive(Parser)]
#[command(name = "casafind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to the embedding store snapshot
    #[arg(
        short,
        long,
        env = "CASAFIND_STORE",
        default_value = "casafind-store.json"
    )]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the embedding store from a content export
    Reindex(commands::reindex::ReindexArgs),

    /// Search the store for content similar to a query
    Search(commands::search::SearchArgs),

    /// Remove every record from the store
    Clear,

    /// Show how many records the store holds
    Count,

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Reindex(args) => commands::reindex::run(&cli.store, args).await,
        Commands::Search(args) => commands::search::run(&cli.store, args).await,
        Commands::Clear => commands::store::clear(&cli.store).await,
        Commands::Count => commands::store::count(&cli.store).await,
        Commands::Version => {
            println!("casafind {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
