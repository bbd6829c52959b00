//! Small helpers over `dom_query` for the stages that edit markup in place.
//!
//! Read-only lookups (date, PDF link, title) stay on `scraper`; everything
//! that removes, unwraps or rewrites nodes goes through a `dom_query`
//! document built from the fragment being cleaned.

use dom_query::{Document, NodeRef, Selection};

/// Parses `markup` as the body of an otherwise empty document.
pub fn parse_body(markup: &str) -> Document {
    Document::from(format!("<html><head></head><body>{markup}</body></html>"))
}

#[inline]
pub fn body(doc: &Document) -> Selection<'_> {
    doc.select("body")
}

/// Serialized children of `<body>`.
pub fn body_html(doc: &Document) -> String {
    body(doc).inner_html().to_string()
}

/// Lowercase tag name, `None` for text and other non-element nodes.
pub fn tag_name(node: &NodeRef) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// Text held directly by `node`, excluding descendants.
pub fn own_text(node: &NodeRef) -> String {
    node.children()
        .into_iter()
        .filter(|child| child.is_text())
        .map(|child| child.text().to_string())
        .collect()
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length in characters of the text a reader would see in `markup`.
pub fn visible_text_len(markup: &str) -> usize {
    let doc = parse_body(markup);
    doc.select("body script, body style, body noscript, body template").remove();
    collapse_whitespace(&body(&doc).text()).chars().count()
}
