use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use scraper::{Html, Selector};

use mf_core::{ArticleRecord, Error, ExtractionConfig, PageFetcher, PdfTextSource, Result};

use crate::extract::{absolutize, ArticleAssembler};
use crate::scrapers::{utils, Scraper};

/// Scraper for the memo series published under `/insights/memo/`.
pub struct OaktreeScraper {
    assembler: ArticleAssembler,
    memo_path: Regex,
    fetcher: Arc<dyn PageFetcher>,
    pdf_source: Arc<dyn PdfTextSource>,
}

impl OaktreeScraper {
    pub fn new(
        config: ExtractionConfig,
        fetcher: Arc<dyn PageFetcher>,
        pdf_source: Arc<dyn PdfTextSource>,
    ) -> Result<Self> {
        Selector::parse(&config.memo_link_selector)
            .map_err(|e| Error::Config(format!("Invalid memo link selector: {}", e)))?;
        let memo_path = Regex::new(&config.memo_path_pattern)
            .map_err(|e| Error::Config(format!("Invalid memo path pattern: {}", e)))?;

        Ok(Self {
            assembler: ArticleAssembler::new(config)?,
            memo_path,
            fetcher,
            pdf_source,
        })
    }

    fn config(&self) -> &ExtractionConfig {
        self.assembler.config()
    }

    /// Collects memo links from the listing page markup: absolute, matching
    /// the memo path pattern, deduplicated in first-seen order.
    pub fn discover_memo_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse(&self.config().memo_link_selector) else {
            return Vec::new();
        };

        let urls = document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| absolutize(self.assembler.base(), href))
            .filter(|url| self.memo_path.is_match(url))
            .collect();

        utils::dedup_preserving_order(urls)
    }
}

#[async_trait]
impl Scraper for OaktreeScraper {
    fn source(&self) -> &str {
        "Oaktree Capital Memos"
    }

    fn can_handle(&self, url: &str) -> bool {
        match utils::parse_url(url) {
            Ok(parsed) => {
                parsed.host_str() == self.assembler.base().host_str() && self.memo_path.is_match(url)
            }
            Err(_) => false,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["oaktree", "memos"]
    }

    async fn scrape_article(&self, url: &str) -> Result<ArticleRecord> {
        let html = self.fetcher.fetch_page(url).await?;
        let record = self
            .assembler
            .assemble(url, &html, self.pdf_source.as_ref(), Utc::now())
            .await;
        Ok(record)
    }

    async fn get_article_urls(&self) -> Result<Vec<String>> {
        let html = self.fetcher.fetch_page(&self.config().list_url).await?;
        Ok(self.discover_memo_links(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::BodySource;
    use std::collections::HashMap;

    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| Error::Scraping(format!("404 for {}", url)))
        }
    }

    #[async_trait]
    impl PdfTextSource for StubFetcher {
        async fn pdf_text(&self, url: &str) -> Result<String> {
            self.fetch_page(url).await
        }
    }

    const LISTING: &str = r##"
        <a href="/insights/memo/sea-change">Sea Change</a>
        <a href="https://www.oaktreecapital.com/insights/memo/nobody-knows">Nobody Knows</a>
        <a href="/insights/memo/sea-change">Sea Change (again)</a>
        <a href="/insights/memo/">All memos</a>
        <a href="/insights/podcast/episode-1">Podcast</a>
        <a href="#">Top</a>
    "##;

    fn scraper(pages: &[(&str, &str)]) -> OaktreeScraper {
        let fetcher = Arc::new(StubFetcher {
            pages: pages.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        });
        OaktreeScraper::new(ExtractionConfig::default(), fetcher.clone(), fetcher).unwrap()
    }

    #[test]
    fn test_discover_memo_links() {
        let links = scraper(&[]).discover_memo_links(LISTING);
        assert_eq!(
            links,
            vec![
                "https://www.oaktreecapital.com/insights/memo/sea-change",
                "https://www.oaktreecapital.com/insights/memo/nobody-knows",
            ]
        );
    }

    #[test]
    fn test_can_handle() {
        let scraper = scraper(&[]);
        assert!(scraper.can_handle("https://www.oaktreecapital.com/insights/memo/sea-change"));
        assert!(!scraper.can_handle("https://www.oaktreecapital.com/insights"));
        assert!(!scraper.can_handle("https://example.com/insights/memo/sea-change"));
        assert!(!scraper.can_handle("not a url"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let fetcher = Arc::new(StubFetcher { pages: HashMap::new() });
        let config = ExtractionConfig {
            memo_path_pattern: "(".to_string(),
            ..ExtractionConfig::default()
        };
        assert!(matches!(
            OaktreeScraper::new(config, fetcher.clone(), fetcher),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_get_article_urls() {
        let scraper = scraper(&[("https://www.oaktreecapital.com/insights", LISTING)]);
        let urls = scraper.get_article_urls().await.unwrap();
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn test_get_article_urls_propagates_fetch_failure() {
        assert!(scraper(&[]).get_article_urls().await.is_err());
    }

    #[tokio::test]
    async fn test_scrape_article_with_pdf_fallback() {
        let url = "https://www.oaktreecapital.com/insights/memo/sea-change";
        let page = r#"<h1>Sea Change</h1><time datetime="2022-12-13">Dec 13</time>
            <p>Teaser only.</p><a href="/-/media/memos/sea-change.pdf">PDF</a>"#;
        let scraper = scraper(&[
            (url, page),
            (
                "https://www.oaktreecapital.com/-/media/memos/sea-change.pdf",
                "Paragraph one.\n\nParagraph two.",
            ),
        ]);

        let record = scraper.scrape_article(url).await.unwrap();
        assert_eq!(record.title, "Sea Change");
        assert_eq!(record.link, url);
        assert_eq!(record.body_source, BodySource::Pdf);
        assert!(record.body_markup.contains("<p>Paragraph two.</p>"));
        assert_eq!(record.pub_date(), "Tue, 13 Dec 2022 00:00:00 GMT");
    }
}
