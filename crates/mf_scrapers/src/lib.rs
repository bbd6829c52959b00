pub mod cli;
pub mod extract;
pub mod http;
pub mod logging;
pub mod manager;
pub mod scrapers;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use http::HttpFetcher;
pub use logging::init_logging;
pub use manager::{RunOptions, ScraperManager};
pub use scrapers::{OaktreeScraper, Scraper};

pub mod prelude {
    pub use super::scrapers::Scraper;
    pub use mf_core::{ArticleRecord, Error, Result};
}
