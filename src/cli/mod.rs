//! Command-line interface.

mod harvest;
mod import;
mod ledger;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pinharvest::config::{CatalogArgs, LedgerArgs, PacingArgs, SiteArgs};

#[derive(Parser)]
#[command(name = "pinharvest")]
#[command(about = "Harvest Pinterest search results into an Eagle library")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Search each keyword, import new pins into Eagle and record them
    Harvest {
        #[command(flatten)]
        site: SiteArgs,
        #[command(flatten)]
        pacing: PacingArgs,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        ledger: LedgerArgs,
    },

    /// Import a list of pin page or image URLs into Eagle
    ImportUrls {
        /// URLs to import
        urls: Vec<String>,
        /// Read additional URLs from a file, one per line
        #[arg(long, short)]
        file: Option<PathBuf>,
        #[command(flatten)]
        pacing: PacingArgs,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        ledger: LedgerArgs,
    },

    /// Show what the ledger has recorded
    Ledger {
        /// Number of most recent records to list
        #[arg(long, default_value = "10")]
        recent: usize,
        #[command(flatten)]
        ledger: LedgerArgs,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest {
            site,
            pacing,
            catalog,
            ledger,
        } => harvest::cmd_harvest(&site, &pacing, &catalog, &ledger).await,
        Commands::ImportUrls {
            urls,
            file,
            pacing,
            catalog,
            ledger,
        } => import::cmd_import_urls(urls, file.as_deref(), &pacing, &catalog, &ledger).await,
        Commands::Ledger { recent, ledger } => ledger::cmd_ledger(&ledger, recent),
    }
}
