//! Reduces arbitrary markup to the small tag and attribute set that is
//! safe to embed in a feed entry.

use std::collections::BTreeSet;

use dom_query::Selection;

use super::boilerplate::{SAFE_LINK_REL, SAFE_LINK_TARGET};
use super::dom::{body, body_html, parse_body, tag_name};

pub const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "b", "i", "em", "strong", "u", "sub", "sup", "ul", "ol", "li", "h2", "h3", "h4", "a",
    "img", "hr", "blockquote", "code", "pre",
];

/// Removed together with everything inside them.
pub const DROPPED_WITH_CONTENT: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "frame", "frameset", "object", "embed",
    "applet", "svg", "math", "canvas", "head", "title", "select", "textarea", "button", "input",
];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

fn allowed_attributes(tag: &str) -> &'static [&'static str] {
    match tag {
        "a" => &["href", "name"],
        "img" => &["src", "alt", "title", "width", "height"],
        _ => &[],
    }
}

fn is_url_attribute(attr: &str) -> bool {
    matches!(attr, "href" | "src")
}

/// Accepts relative URLs and http(s)/mailto; rejects every other scheme,
/// including ones hidden behind whitespace or control characters.
fn is_safe_url(value: &str) -> bool {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if cleaned.is_empty() {
        return false;
    }
    match cleaned.find(':') {
        Some(idx) if !cleaned[..idx].contains(['/', '?', '#']) => URL_SCHEMES.contains(&&cleaned[..idx]),
        _ => true,
    }
}

/// Upper bound on re-parse rounds; real input settles after the second.
const MAX_SETTLE_ROUNDS: usize = 4;

/// Sanitizes an HTML fragment. Disallowed tags are unwrapped (their text
/// survives), script-like tags vanish with their content, and every
/// anchor is forced to open in a new context without opener or referrer.
///
/// Unwrapping can leave nesting the HTML parser would restructure (a
/// heading inside a heading, say), so the pass is repeated on its own
/// output until it stops changing. That makes the function idempotent.
pub fn sanitize_html(markup: &str) -> String {
    let mut current = sanitize_pass(markup);
    for _ in 0..MAX_SETTLE_ROUNDS {
        let next = sanitize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn sanitize_pass(markup: &str) -> String {
    let doc = parse_body(markup);
    let root = body(&doc);

    root.select(&DROPPED_WITH_CONTENT.join(", ")).remove();

    let disallowed: BTreeSet<String> = root
        .select("*")
        .nodes()
        .iter()
        .filter_map(tag_name)
        .filter(|tag| !ALLOWED_TAGS.contains(&tag.as_str()))
        .collect();
    if !disallowed.is_empty() {
        let names: Vec<&str> = disallowed.iter().map(String::as_str).collect();
        root.strip_elements(&names);
    }

    for node in root.select("*").nodes() {
        let Some(tag) = tag_name(node) else {
            continue;
        };
        let element = Selection::from(*node);
        let allowed = allowed_attributes(&tag);
        for attr in node.attrs() {
            let name = attr.name.local.to_string();
            let keep = allowed.contains(&name.as_str()) && (!is_url_attribute(&name) || is_safe_url(&attr.value));
            if !keep {
                element.remove_attr(&name);
            }
        }
        if tag == "a" {
            element.set_attr("target", SAFE_LINK_TARGET);
            element.set_attr("rel", SAFE_LINK_REL);
        }
    }

    body_html(&doc)
}
