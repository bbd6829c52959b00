use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which path produced an article's body markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySource {
    /// Cleaned and sanitized content taken from the page itself.
    OnPage,
    /// Paragraphs rebuilt from the text of the linked PDF.
    Pdf,
}

/// One normalized memo, ready to become a syndication entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    /// Canonical article URL; doubles as the entry identity.
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub short_description: String,
    pub body_markup: String,
    pub body_source: BodySource,
    pub attachment_url: Option<String>,
    /// Media type of the attachment, present exactly when `attachment_url` is.
    pub attachment_type: Option<String>,
}

impl ArticleRecord {
    /// Media type announced for the attachment enclosure.
    pub const ENCLOSURE_TYPE: &'static str = "application/pdf";

    /// Attaches the memo's PDF, recording its media type alongside.
    pub fn with_attachment(mut self, url: Option<String>) -> Self {
        self.attachment_type = url.as_ref().map(|_| Self::ENCLOSURE_TYPE.to_string());
        self.attachment_url = url;
        self
    }

    /// RFC 2822 rendering in GMT, as used by feed `pubDate` fields.
    pub fn pub_date(&self) -> String {
        format_pub_date(&self.published_at)
    }

    /// Records without a title are never emitted.
    pub fn is_admissible(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

pub fn format_pub_date(at: &DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
