use async_trait::async_trait;
use mf_core::{ArticleRecord, Error, Result};
use url::Url;

pub mod oaktree;
pub use oaktree::OaktreeScraper;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns the name of the source site
    fn source(&self) -> &str;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool;

    /// Fetches one article page and runs the extraction pipeline on it
    async fn scrape_article(&self, url: &str) -> Result<ArticleRecord>;

    /// Returns the deduplicated list of article URLs from the listing page
    async fn get_article_urls(&self) -> Result<Vec<String>>;

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;
    use std::collections::HashSet;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    /// Removes duplicates while preserving first-seen order
    pub fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::utils;

    #[test]
    fn test_parse_url() {
        assert!(utils::parse_url("https://example.com").is_ok());
        assert!(utils::parse_url("invalid-url").is_err());
    }

    #[test]
    fn test_dedup_preserving_order() {
        let urls = vec!["b".to_string(), "a".to_string(), "b".to_string(), "c".to_string(), "a".to_string()];
        assert_eq!(utils::dedup_preserving_order(urls), vec!["b", "a", "c"]);
    }
}
