use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the rendered markup of the page at `url`
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

#[async_trait]
pub trait PdfTextSource: Send + Sync {
    /// Downloads the PDF at `url` and returns its extracted plain text
    async fn pdf_text(&self, url: &str) -> Result<String>;
}
