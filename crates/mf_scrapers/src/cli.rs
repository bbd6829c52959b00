use clap::{Args, Subcommand};
use mf_core::{ArticleRecord, Result};

use crate::manager::ScraperManager;

#[derive(Args, Debug, Clone)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScraperCommands {
    /// Scrape memos from a source (e.g. oaktree). If not specified, scrapes all sources.
    Source {
        source: Option<String>,
    },
    /// Run the extraction pipeline on a single memo URL
    Url {
        url: String,
    },
    /// List available scrapers and the memo links they currently see
    List,
}

/// Runs one command and returns the records it produced.
pub async fn handle_command(args: ScraperArgs, manager: &ScraperManager) -> Result<Vec<ArticleRecord>> {
    match args.command {
        ScraperCommands::Source { source } => manager.scrape_source(source.as_deref()).await,
        ScraperCommands::Url { url } => Ok(vec![manager.scrape_url(&url).await?]),
        ScraperCommands::List => {
            println!("Available scrapers:");
            for scraper in manager.scrapers() {
                println!("  {} ({})", scraper.source(), scraper.cli_names().join(", "));
                for url in manager.discover(scraper).await {
                    println!("    {}", url);
                }
            }
            Ok(Vec::new())
        }
    }
}
