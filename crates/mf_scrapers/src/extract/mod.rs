//! Content extraction pipeline for memo pages.
//!
//! Page markup flows through content root selection, boilerplate removal,
//! anchor normalization and sanitization; the date and PDF link are
//! resolved from the full page alongside. [`assemble::ArticleAssembler`]
//! ties the stages together and decides on the PDF text fallback.

pub mod assemble;
pub mod boilerplate;
pub mod content;
pub mod date;
pub mod dom;
pub mod pdf_link;
pub mod pdf_text;
pub mod sanitize;
pub mod urls;

pub use assemble::{ArticleAssembler, PageExtraction};
pub use content::{ContentRoot, RootOrigin};
pub use date::resolve_published_at;
pub use pdf_link::{extract_open_pdf_url, resolve_pdf_url};
pub use sanitize::sanitize_html;
pub use urls::absolutize;
