use dom_query::{Document, Matcher, Selection};
use tracing::{debug, warn};

use mf_core::ExtractionConfig;

/// How the content root was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootOrigin {
    /// A template region matched by the given selector.
    Template(String),
    /// Built from the first paragraphs of the page.
    Synthesized { paragraphs: usize },
}

/// The subtree holding the article body, as standalone markup so later
/// stages can parse it into their own editable document.
#[derive(Debug, Clone)]
pub struct ContentRoot {
    pub origin: RootOrigin,
    pub markup: String,
}

impl ContentRoot {
    pub fn is_synthesized(&self) -> bool {
        matches!(self.origin, RootOrigin::Synthesized { .. })
    }
}

/// Picks the article body from a page.
///
/// Selectors are tried in order; the first match whose text is longer than
/// `min_root_chars` wins. When no template region qualifies, the first
/// `fallback_paragraphs` paragraphs of the page are wrapped in a `div`.
pub fn select_content_root(document: &Document, config: &ExtractionConfig) -> ContentRoot {
    for raw in &config.content_selectors {
        let Ok(matcher) = Matcher::new(raw) else {
            warn!("Skipping invalid content selector {:?}", raw);
            continue;
        };

        let qualifying = document
            .select_matcher(&matcher)
            .nodes()
            .iter()
            .map(|node| Selection::from(*node))
            .find(|sel| sel.text().trim().chars().count() > config.min_root_chars);

        if let Some(sel) = qualifying {
            debug!("Content root selected by {:?}", raw);
            return ContentRoot {
                origin: RootOrigin::Template(raw.clone()),
                markup: sel.html().to_string(),
            };
        }
    }

    synthesize_root(document, config.fallback_paragraphs)
}

fn synthesize_root(document: &Document, limit: usize) -> ContentRoot {
    let paragraphs: Vec<String> = document
        .select("p")
        .nodes()
        .iter()
        .take(limit)
        .map(|node| Selection::from(*node).html().to_string())
        .collect();
    debug!("No template region qualified, synthesized root from {} paragraphs", paragraphs.len());
    ContentRoot {
        origin: RootOrigin::Synthesized { paragraphs: paragraphs.len() },
        markup: format!("<div>{}</div>", paragraphs.concat()),
    }
}
