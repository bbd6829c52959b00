use chrono::{DateTime, Utc};
use dom_query::Document;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use mf_core::{ArticleRecord, BodySource, ExtractionConfig, PdfTextSource, Result};

use super::boilerplate::{
    normalize_anchors, normalize_image_sources, strip_boilerplate, SAFE_LINK_REL, SAFE_LINK_TARGET,
};
use super::content::{select_content_root, RootOrigin};
use super::date::resolve_published_at;
use super::dom::{body, body_html, collapse_whitespace, parse_body, visible_text_len};
use super::pdf_link::resolve_pdf_url;
use super::pdf_text::pdf_fallback;
use super::sanitize::sanitize_html;

pub const ATTACHMENT_LINK_TEXT: &str = "Download PDF";

/// Everything that can be learned from the page itself, before any PDF is fetched.
#[derive(Debug, Clone)]
pub struct PageExtraction {
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub pdf_url: Option<String>,
    pub root_origin: RootOrigin,
    /// Cleaned and sanitized on-page body.
    pub body_markup: String,
    pub body_text_len: usize,
    pub short_description: String,
}

/// Turns memo pages into [`ArticleRecord`]s.
#[derive(Debug, Clone)]
pub struct ArticleAssembler {
    config: ExtractionConfig,
    base: Url,
}

impl ArticleAssembler {
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let base = config.base()?;
        Ok(Self { config, base })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Runs every page-local stage. The parsed document does not outlive this call.
    pub fn extract_page(&self, raw_html: &str, now: DateTime<Utc>) -> PageExtraction {
        let document = Html::parse_document(raw_html);

        let title = resolve_title(&document);
        let published_at = resolve_published_at(&document, Some(raw_html), now);
        let pdf_url = resolve_pdf_url(&document, &self.base);

        let root = select_content_root(&Document::from(raw_html), &self.config);
        let fragment = parse_body(&root.markup);
        let root_element = body(&fragment).children();
        let removed = strip_boilerplate(&root_element, &self.config.boilerplate_phrases);
        let linked = normalize_anchors(&root_element, &self.base);
        let images = normalize_image_sources(&root_element, &self.base);
        debug!(
            "Removed {} boilerplate elements, kept {} links and {} images",
            removed, linked, images
        );

        let body_markup = sanitize_html(&body_html(&fragment));
        let body_text_len = visible_text_len(&body_markup);
        let short_description = first_paragraph_excerpt(&body_markup, self.config.description_max_chars);

        PageExtraction {
            title,
            published_at,
            pdf_url,
            root_origin: root.origin,
            body_markup,
            body_text_len,
            short_description,
        }
    }

    /// The PDF is only consulted when the page body is too thin and a PDF exists.
    pub fn needs_pdf_fallback(&self, page: &PageExtraction) -> bool {
        page.pdf_url.is_some() && page.body_text_len < self.config.min_body_chars
    }

    /// Builds the final record. `pdf_body`, when present, replaces the on-page body entirely.
    pub fn build_record(&self, link: &str, page: PageExtraction, pdf_body: Option<String>) -> ArticleRecord {
        let (mut body_markup, body_source) = match pdf_body {
            Some(html) => (html, BodySource::Pdf),
            None => (page.body_markup, BodySource::OnPage),
        };

        let short_description = if page.short_description.is_empty() {
            first_paragraph_excerpt(&body_markup, self.config.description_max_chars)
        } else {
            page.short_description
        };

        if let Some(url) = &page.pdf_url {
            body_markup.push_str(&attachment_link(url));
        }

        ArticleRecord {
            title: page.title,
            link: link.to_string(),
            published_at: page.published_at,
            short_description,
            body_markup,
            body_source,
            attachment_url: None,
            attachment_type: None,
        }
        .with_attachment(page.pdf_url)
    }

    /// Full per-article pipeline: page stages, optional PDF fallback, record.
    pub async fn assemble(
        &self,
        link: &str,
        raw_html: &str,
        pdf_source: &dyn PdfTextSource,
        now: DateTime<Utc>,
    ) -> ArticleRecord {
        let page = self.extract_page(raw_html, now);

        let pdf_body = match (&page.pdf_url, self.needs_pdf_fallback(&page)) {
            (Some(url), true) => {
                debug!(
                    "Body of {} has {} visible chars (< {}), trying PDF text",
                    link, page.body_text_len, self.config.min_body_chars
                );
                pdf_fallback(pdf_source, url).await
            }
            _ => None,
        };

        self.build_record(link, page, pdf_body)
    }
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(collapse_whitespace)
        .find(|text| !text.is_empty())
}

/// Page heading first, then the social preview title. Empty when neither exists.
pub fn resolve_title(document: &Html) -> String {
    first_text(document, "h1")
        .or_else(|| first_attr(document, "meta[property='og:title']", "content"))
        .unwrap_or_default()
}

/// Text of the first non-empty paragraph, capped at `max_chars` plus an ellipsis.
pub fn first_paragraph_excerpt(markup: &str, max_chars: usize) -> String {
    let fragment = Html::parse_fragment(markup);
    first_text(&fragment, "p")
        .map(|text| truncate_with_ellipsis(&text, max_chars))
        .unwrap_or_default()
}

pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

fn attachment_link(url: &str) -> String {
    format!(
        r#"<p><a href="{}" target="{}" rel="{}">{}</a></p>"#,
        url.replace('&', "&amp;").replace('"', "&quot;"),
        SAFE_LINK_TARGET,
        SAFE_LINK_REL,
        ATTACHMENT_LINK_TEXT
    )
}
