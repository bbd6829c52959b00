use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use mf_core::PdfTextSource;

lazy_static! {
    static ref BLANK_LINE: Regex = Regex::new(r"\n[ \t\u{a0}\u{c}]*\n").unwrap();
}

/// Class carried by the container of PDF-derived bodies.
pub const PDF_BODY_CLASS: &str = "pdf-text";

/// Rebuilds paragraph markup from extracted PDF text.
///
/// Paragraphs are separated by blank lines; single newlines inside a
/// paragraph become `<br>`. Returns `None` when no text survives.
pub fn text_to_paragraph_html(text: &str) -> Option<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let paragraphs: Vec<String> = BLANK_LINE
        .split(&normalized)
        .filter_map(|chunk| {
            let lines: Vec<String> = chunk
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(escape_html)
                .collect();
            (!lines.is_empty()).then(|| format!("<p>{}</p>", lines.join("<br>")))
        })
        .collect();

    if paragraphs.is_empty() {
        return None;
    }
    Some(format!(r#"<div class="{}">{}</div>"#, PDF_BODY_CLASS, paragraphs.concat()))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Fetches the PDF at `url` and converts its text to markup.
///
/// Any failure (network, status, parse, empty text) is logged and turned
/// into `None`; nothing propagates past this function.
pub async fn pdf_fallback(source: &dyn PdfTextSource, url: &str) -> Option<String> {
    match source.pdf_text(url).await {
        Ok(text) => {
            let html = text_to_paragraph_html(&text);
            if html.is_none() {
                warn!("PDF at {} contained no extractable text", url);
            } else {
                debug!("Rebuilt body from PDF text of {}", url);
            }
            html
        }
        Err(e) => {
            warn!("PDF fallback failed for {}: {}", url, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mf_core::{Error, Result};

    struct FixedText(&'static str);

    #[async_trait]
    impl PdfTextSource for FixedText {
        async fn pdf_text(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl PdfTextSource for Failing {
        async fn pdf_text(&self, url: &str) -> Result<String> {
            Err(Error::Pdf(format!("unreachable {}", url)))
        }
    }

    #[test]
    fn test_paragraph_splitting() {
        let html = text_to_paragraph_html("First line\nsecond line\n\n  \n\nNext & last\r\n\r\nEnd").unwrap();
        assert_eq!(
            html,
            r#"<div class="pdf-text"><p>First line<br>second line</p><p>Next &amp; last</p><p>End</p></div>"#
        );
    }

    #[test]
    fn test_blank_text_yields_none() {
        assert_eq!(text_to_paragraph_html(""), None);
        assert_eq!(text_to_paragraph_html("\n\n   \n\t\n"), None);
    }

    #[tokio::test]
    async fn test_fallback_success() {
        let html = pdf_fallback(&FixedText("One\n\nTwo"), "https://x/a.pdf").await;
        assert_eq!(
            html.as_deref(),
            Some(r#"<div class="pdf-text"><p>One</p><p>Two</p></div>"#)
        );
    }

    #[tokio::test]
    async fn test_fallback_swallows_errors() {
        assert_eq!(pdf_fallback(&Failing, "https://x/a.pdf").await, None);
        assert_eq!(pdf_fallback(&FixedText("   "), "https://x/a.pdf").await, None);
    }
}
