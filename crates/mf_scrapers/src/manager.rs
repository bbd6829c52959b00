use std::time::Duration;

use mf_core::{ArticleRecord, Error, ExtractionConfig, Result};
use tokio::time::sleep;
use tracing::{error, info};

use crate::logging::Logger;
use crate::scrapers::Scraper;

type BoxedScraper = Box<dyn Scraper>;

/// Limits applied to one scraping run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub max_articles: usize,
    /// Pause between two successive article fetches.
    pub politeness_delay: Duration,
}

impl From<&ExtractionConfig> for RunOptions {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            max_articles: config.max_articles,
            politeness_delay: config.politeness_delay(),
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

/// Drives scrapers one article at a time. A failing article is logged and
/// left out; nothing short of an unknown source aborts a run.
pub struct ScraperManager {
    scrapers: Vec<BoxedScraper>,
    options: RunOptions,
}

impl ScraperManager {
    pub fn new(options: RunOptions) -> Self {
        Self {
            scrapers: Vec::new(),
            options,
        }
    }

    pub fn add_scraper(&mut self, scraper: BoxedScraper) {
        self.scrapers.push(scraper);
    }

    pub fn scrapers(&self) -> impl Iterator<Item = &dyn Scraper> {
        self.scrapers.iter().map(|s| s.as_ref())
    }

    pub fn get_scraper_for_url(&self, url: &str) -> Result<&dyn Scraper> {
        self.scrapers()
            .find(|s| s.can_handle(url))
            .ok_or_else(|| Error::Scraping(format!("No scraper found for URL: {}", url)))
    }

    pub fn get_scraper(&self, name: &str) -> Result<&dyn Scraper> {
        let name = name.to_lowercase();
        self.scrapers()
            .find(|s| s.cli_names().contains(&name.as_str()))
            .ok_or_else(|| Error::Scraping(format!("No scraper found for {}", name)))
    }

    /// Runs the extraction pipeline for a single URL. Unlike a full run, errors are returned.
    pub async fn scrape_url(&self, url: &str) -> Result<ArticleRecord> {
        let scraper = self.get_scraper_for_url(url)?;
        let record = scraper.scrape_article(url).await?;
        if !record.is_admissible() {
            return Err(Error::Scraping(format!("No title found at {}", url)));
        }
        Ok(record)
    }

    /// Article links a scraper currently sees; a failed listing fetch yields none.
    pub async fn discover(&self, scraper: &dyn Scraper) -> Vec<String> {
        match scraper.get_article_urls().await {
            Ok(urls) => urls,
            Err(e) => {
                error!("Could not fetch the article list of {}: {}", scraper.source(), e);
                Vec::new()
            }
        }
    }

    /// Scrapes the named source, or every registered source when `source` is `None`.
    pub async fn scrape_source(&self, source: Option<&str>) -> Result<Vec<ArticleRecord>> {
        let mut records = match source {
            Some(name) => self.scrape_with(self.get_scraper(name)?).await,
            None => {
                let mut records = Vec::new();
                for scraper in self.scrapers() {
                    records.extend(self.scrape_with(scraper).await);
                }
                records
            }
        };
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn scrape_with(&self, scraper: &dyn Scraper) -> Vec<ArticleRecord> {
        let urls = self.discover(scraper).await;
        let total = urls.len().min(self.options.max_articles);
        info!("Found {} article links on {}, fetching {}", urls.len(), scraper.source(), total);

        let mut records = Vec::with_capacity(total);
        for (i, url) in urls.into_iter().take(total).enumerate() {
            if i > 0 && !self.options.politeness_delay.is_zero() {
                sleep(self.options.politeness_delay).await;
            }

            let logger = Logger::new().with_prefix(format!("[{}/{}]", i + 1, total));
            logger.info(&format!("Scraping {}", url));
            match scraper.scrape_article(&url).await {
                Ok(record) if record.is_admissible() => {
                    logger.debug(&format!("{} ({})", record.title, record.pub_date()));
                    records.push(record);
                }
                Ok(_) => logger.warn(&format!("Skipping {}: no title found", url)),
                Err(e) => logger.error(&format!("Failed on {}: {}", url, e)),
            }
        }

        info!("Extracted {} of {} articles from {}", records.len(), total, scraper.source());
        records
    }
}

/// Newest first; ties keep their discovery order.
pub fn sort_newest_first(records: &mut [ArticleRecord]) {
    records.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use mf_core::BodySource;

    /// Serves canned outcomes: "fail" URLs error, "untitled" URLs have no title.
    struct StubScraper {
        urls: Option<Vec<String>>,
    }

    impl StubScraper {
        fn new(urls: Option<&[&str]>) -> Self {
            Self {
                urls: urls.map(|u| u.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    fn record(url: &str, title: &str, day: u32) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            link: url.to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            short_description: String::new(),
            body_markup: String::new(),
            body_source: BodySource::OnPage,
            attachment_url: None,
            attachment_type: None,
        }
    }

    #[async_trait]
    impl Scraper for StubScraper {
        fn source(&self) -> &str {
            "Stub"
        }

        fn can_handle(&self, url: &str) -> bool {
            url.starts_with("https://stub/")
        }

        fn cli_names(&self) -> Vec<&str> {
            vec!["stub"]
        }

        async fn scrape_article(&self, url: &str) -> Result<ArticleRecord> {
            let day: u32 = url.rsplit('/').next().and_then(|d| d.parse().ok()).unwrap_or(1);
            if url.contains("fail") {
                Err(Error::Scraping("navigation timeout".to_string()))
            } else if url.contains("untitled") {
                Ok(record(url, "", day))
            } else {
                Ok(record(url, "Memo", day))
            }
        }

        async fn get_article_urls(&self) -> Result<Vec<String>> {
            self.urls
                .clone()
                .ok_or_else(|| Error::Scraping("listing unavailable".to_string()))
        }
    }

    fn manager(stub: StubScraper, max_articles: usize) -> ScraperManager {
        let mut manager = ScraperManager::new(RunOptions {
            max_articles,
            politeness_delay: Duration::ZERO,
        });
        manager.add_scraper(Box::new(stub));
        manager
    }

    #[tokio::test]
    async fn test_failures_are_omitted_and_run_continues() {
        let manager = manager(
            StubScraper::new(Some(&[
                "https://stub/a/3",
                "https://stub/fail/4",
                "https://stub/untitled/5",
                "https://stub/b/9",
            ])),
            40,
        );
        let records = manager.scrape_source(None).await.unwrap();
        let links: Vec<_> = records.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["https://stub/b/9", "https://stub/a/3"]);
    }

    #[tokio::test]
    async fn test_cap_limits_fetches() {
        let stub = StubScraper::new(Some(&["https://stub/a/1", "https://stub/b/2", "https://stub/c/3"]));
        let manager = manager(stub, 2);
        let records = manager.scrape_source(Some("stub")).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].link, "https://stub/b/2");
    }

    #[tokio::test]
    async fn test_listing_failure_yields_empty_run() {
        let manager = manager(StubScraper::new(None), 40);
        let records = manager.scrape_source(None).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_source_is_an_error() {
        let manager = manager(StubScraper::new(Some(&[])), 40);
        assert!(manager.scrape_source(Some("nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_scrape_url() {
        let manager = manager(StubScraper::new(Some(&[])), 40);
        assert_eq!(manager.scrape_url("https://stub/a/2").await.unwrap().title, "Memo");
        assert!(manager.scrape_url("https://stub/untitled/2").await.is_err());
        assert!(manager.scrape_url("https://other/a").await.is_err());
    }

    #[tokio::test]
    async fn test_politeness_delay_between_fetches() {
        let mut manager = ScraperManager::new(RunOptions {
            max_articles: 40,
            politeness_delay: Duration::from_millis(20),
        });
        manager.add_scraper(Box::new(StubScraper::new(Some(&["https://stub/a/1", "https://stub/b/2", "https://stub/c/3"]))));
        let started = std::time::Instant::now();
        let records = manager.scrape_source(None).await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records = vec![
            record("https://stub/a", "A", 2),
            record("https://stub/b", "B", 7),
            record("https://stub/c", "C", 2),
        ];
        sort_newest_first(&mut records);
        let links: Vec<_> = records.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["https://stub/b", "https://stub/a", "https://stub/c"]);
    }
}
