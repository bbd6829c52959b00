use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::urls::absolutize;

lazy_static! {
    /// `openPDF('<title>', '<url>')`; the title may contain escaped quotes.
    static ref OPEN_PDF: Regex = Regex::new(
        r#"openPDF\s*\(\s*(?:'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*")\s*,\s*(?:'([^']*)'|"([^"]*)")\s*\)"#
    )
    .unwrap();
}

/// Attributes some templates use instead of `href` to carry the file URL.
pub const PDF_DATA_ATTRIBUTES: &[&str] = &["data-href", "data-url", "data-file", "data-pdf", "data-download"];

/// Extracts the URL argument from an obfuscated `openPDF('title','url')` call.
pub fn extract_open_pdf_url(value: &str) -> Option<String> {
    let caps = OPEN_PDF.captures(value)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}

fn is_direct_pdf_reference(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.ends_with(".pdf") || lower.contains(".pdf?")
}

/// Turns a raw attribute value into a usable PDF URL, unwrapping `openPDF` calls.
fn resolve_value(base: &Url, value: &str) -> Option<String> {
    match extract_open_pdf_url(value) {
        Some(url) => absolutize(base, &url),
        None => absolutize(base, value),
    }
}

fn select_all<'a>(document: &'a Html, selector: &str) -> Vec<scraper::ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(sel) => document.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

fn direct_reference(document: &Html, base: &Url) -> Option<String> {
    std::iter::once("href")
        .chain(PDF_DATA_ATTRIBUTES.iter().copied())
        .find_map(|attr| {
            select_all(document, &format!("[{}]", attr))
                .into_iter()
                .filter_map(|el| el.value().attr(attr))
                .filter(|value| is_direct_pdf_reference(value))
                .find_map(|value| resolve_value(base, value))
        })
}

fn script_reference(document: &Html, base: &Url) -> Option<String> {
    select_all(document, "[href*='openPDF'], [onclick*='openPDF']")
        .into_iter()
        .flat_map(|el| [el.value().attr("href"), el.value().attr("onclick")])
        .flatten()
        .filter_map(extract_open_pdf_url)
        .find_map(|url| absolutize(base, &url))
}

fn declared_link(document: &Html, base: &Url) -> Option<String> {
    select_all(document, "link[type='application/pdf'][href]")
        .into_iter()
        .filter_map(|el| el.value().attr("href"))
        .find_map(|href| absolutize(base, href))
}

/// Finds the memo's PDF attachment, if it has one.
///
/// Direct `.pdf` references win over script-wrapped ones, which win over a
/// `<link type="application/pdf">` declaration.
pub fn resolve_pdf_url(document: &Html, base: &Url) -> Option<String> {
    direct_reference(document, base)
        .or_else(|| script_reference(document, base))
        .or_else(|| declared_link(document, base))
}
