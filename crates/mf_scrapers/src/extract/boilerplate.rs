use dom_query::{NodeRef, Selection};
use url::Url;

use super::dom::{collapse_whitespace, own_text};
use super::pdf_link::{extract_open_pdf_url, PDF_DATA_ATTRIBUTES};
use super::urls::absolutize;

pub const SAFE_LINK_TARGET: &str = "_blank";
pub const SAFE_LINK_REL: &str = "noopener noreferrer";

/// Removes every descendant of `root` whose own text mentions one of
/// `phrases` (case-insensitive), together with its subtree. Returns how
/// many elements were removed. The nodes of `root` itself are never removed.
pub fn strip_boilerplate(root: &Selection, phrases: &[String]) -> usize {
    let phrases: Vec<String> = phrases
        .iter()
        .map(|p| collapse_whitespace(&p.to_lowercase()))
        .filter(|p| !p.is_empty())
        .collect();
    if phrases.is_empty() {
        return 0;
    }
    root.nodes().iter().map(|node| strip_children(node, &phrases)).sum()
}

fn strip_children(node: &NodeRef, phrases: &[String]) -> usize {
    let mut removed = 0;
    for child in node.children() {
        if !child.is_element() {
            continue;
        }
        if is_boilerplate(&child, phrases) {
            Selection::from(child).remove();
            removed += 1;
        } else {
            removed += strip_children(&child, phrases);
        }
    }
    removed
}

fn is_boilerplate(node: &NodeRef, phrases: &[String]) -> bool {
    let own = collapse_whitespace(&own_text(node).to_lowercase());
    !own.is_empty() && phrases.iter().any(|phrase| own.contains(phrase.as_str()))
}

/// Resolves the URL an anchor actually points at, looking past `href="#"`
/// placeholders into data attributes and `openPDF` handlers.
fn anchor_target(anchor: &Selection, base: &Url) -> Option<String> {
    let from_attributes = std::iter::once("href")
        .chain(PDF_DATA_ATTRIBUTES.iter().copied())
        .filter_map(|attr| anchor.attr(attr))
        .find_map(|value| match extract_open_pdf_url(&value) {
            Some(url) => absolutize(base, &url),
            None => absolutize(base, &value),
        });

    from_attributes.or_else(|| {
        anchor
            .attr("onclick")
            .and_then(|handler| extract_open_pdf_url(&handler))
            .and_then(|url| absolutize(base, &url))
    })
}

/// Rewrites every anchor under `root` to an absolute, new-tab, no-opener
/// link, or strips its `href` when no usable URL can be recovered.
/// Returns the number of anchors that kept a link.
pub fn normalize_anchors(root: &Selection, base: &Url) -> usize {
    let mut linked = 0;
    for node in root.select("a").nodes() {
        let anchor = Selection::from(*node);
        match anchor_target(&anchor, base) {
            Some(href) => {
                anchor.set_attr("href", &href);
                anchor.set_attr("target", SAFE_LINK_TARGET);
                anchor.set_attr("rel", SAFE_LINK_REL);
                linked += 1;
            }
            None => anchor.remove_attr("href"),
        }
    }
    linked
}

/// Makes every `<img src>` under `root` absolute; sources that cannot be
/// resolved are dropped. Returns the number of images that kept a source.
pub fn normalize_image_sources(root: &Selection, base: &Url) -> usize {
    let mut resolved = 0;
    for node in root.select("img").nodes() {
        let image = Selection::from(*node);
        match image.attr("src").and_then(|src| absolutize(base, &src)) {
            Some(src) => {
                image.set_attr("src", &src);
                resolved += 1;
            }
            None => image.remove_attr("src"),
        }
    }
    resolved
}
