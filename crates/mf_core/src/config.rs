use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.oaktreecapital.com";

/// Content selectors, most template-specific first.
pub const DEFAULT_CONTENT_SELECTORS: &[&str] = &[
    ".c-article__body",
    ".c-richtext",
    ".o-content",
    ".c-article",
    "article",
    ".content",
    "main",
];

/// Phrases marking non-editorial page sections. Matched case-insensitively.
pub const DEFAULT_BOILERPLATE_PHRASES: &[&str] = &[
    "related insights",
    "related memos",
    "related content",
    "you may also like",
    "share this memo",
    "share this page",
    "share on linkedin",
    "share on twitter",
    "share via email",
    "load more",
    "show more memos",
    "download translations",
    "read in other languages",
    "available in the following languages",
    "subscribe to receive",
    "subscribe to memos",
    "sign up to receive",
    "view all memos",
    "view the memo archive",
    "memo archive",
];

/// Run configuration. Every calibration constant of the extraction
/// pipeline lives here so it can be overridden from a JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub base_url: String,
    pub list_url: String,
    pub memo_link_selector: String,
    pub memo_path_pattern: String,
    pub content_selectors: Vec<String>,
    /// A template region qualifies only when its text is longer than this.
    pub min_root_chars: usize,
    /// Paragraphs gathered into the synthesized root when no template matches.
    pub fallback_paragraphs: usize,
    /// Sanitized bodies shorter than this fall back to the PDF text.
    pub min_body_chars: usize,
    pub description_max_chars: usize,
    pub boilerplate_phrases: Vec<String>,
    pub max_articles: usize,
    pub politeness_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            list_url: format!("{}/insights", DEFAULT_BASE_URL),
            memo_link_selector: r#"a[href*="/insights/memo/"]"#.to_string(),
            memo_path_pattern: "/insights/memo/.+".to_string(),
            content_selectors: DEFAULT_CONTENT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            min_root_chars: 400,
            fallback_paragraphs: 6,
            min_body_chars: 600,
            description_max_chars: 240,
            boilerplate_phrases: DEFAULT_BOILERPLATE_PHRASES.iter().map(|s| s.to_string()).collect(),
            max_articles: 40,
            politeness_delay_ms: 300,
            request_timeout_secs: 30,
            user_agent: format!("memofeed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ExtractionConfig {
    /// Loads a JSON configuration file; missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.base()?;
        Url::parse(&self.list_url)?;
        if self.content_selectors.is_empty() {
            return Err(Error::Config("content_selectors must not be empty".to_string()));
        }
        if self.description_max_chars == 0 {
            return Err(Error::Config("description_max_chars must be positive".to_string()));
        }
        Ok(())
    }

    /// The site origin every relative URL is resolved against.
    pub fn base(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!("Base URL must be http(s): {}", self.base_url)));
        }
        Ok(base)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExtractionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_root_chars, 400);
        assert_eq!(config.min_body_chars, 600);
        assert_eq!(config.description_max_chars, 240);
        assert_eq!(config.content_selectors.last().map(String::as_str), Some("main"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ExtractionConfig =
            serde_json::from_str(r#"{ "max_articles": 5, "politeness_delay_ms": 0 }"#).unwrap();
        assert_eq!(config.max_articles, 5);
        assert_eq!(config.politeness_delay(), Duration::ZERO);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.fallback_paragraphs, 6);
    }

    #[test]
    fn test_rejects_non_http_base() {
        let config = ExtractionConfig {
            base_url: "ftp://example.com".to_string(),
            ..ExtractionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_selector_table() {
        let config = ExtractionConfig {
            content_selectors: vec![],
            ..ExtractionConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
