use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use mf_core::{Error, ExtractionConfig, PageFetcher, PdfTextSource, Result};

/// Plain HTTP implementation of the page and PDF collaborators.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        Ok(self.get(url).await?.text().await?)
    }
}

#[async_trait]
impl PdfTextSource for HttpFetcher {
    async fn pdf_text(&self, url: &str) -> Result<String> {
        let bytes = self.get(url).await?.bytes().await?;
        debug!("Extracting text from {} ({} bytes)", url, bytes.len());

        // pdf-extract is CPU bound and may panic on malformed files.
        tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| Error::Pdf(format!("PDF parser aborted: {}", e)))?
        .map_err(Error::Pdf)
    }
}
