//! Text locator: find the text node that best matches a claim.
//!
//! Regions are searched in priority order. Within a region every strategy of
//! the cascade is tried in turn; the first strategy with any hit wins, and
//! within it the first node in document order.

use crate::config::MatchConfig;
use crate::matching::{MatchStrategy, NodeText, PhraseMatcher};
use crate::platform::{AnnotationDom, NodeKind};
use crate::walk::{DomWalker, FilterResult, eligible_text_nodes, is_off_limits};

/// Element ids and class tokens that mark a main content container.
pub const CONTENT_TOKENS: &[&str] = &[
    "content",
    "main-content",
    "post-content",
    "entry-content",
    "article-body",
];

const CONTENT_TAGS: &[&str] = &["article", "main"];
const CONTENT_ROLES: &[&str] = &["main", "article"];

/// A successful match.
#[derive(Clone, Debug, PartialEq)]
pub struct LocatedText<N> {
    pub node: N,
    pub strategy: MatchStrategy,
    /// Index into the region list that produced the match.
    pub region: usize,
}

fn is_content_container<D: AnnotationDom + ?Sized>(dom: &D, node: &D::Node) -> bool {
    if let Some(tag) = dom.tag_name(node) {
        if CONTENT_TAGS.contains(&tag.as_str()) {
            return true;
        }
    }
    if let Some(role) = dom.attribute(node, "role") {
        if CONTENT_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()) {
            return true;
        }
    }
    if let Some(id) = dom.attribute(node, "id") {
        if CONTENT_TOKENS.contains(&id.as_str()) {
            return true;
        }
    }
    CONTENT_TOKENS.iter().any(|token| dom.has_class(node, token))
}

/// Semantic content containers in document order, then the body.
///
/// Containers inside excluded chrome (nav, header, footer) are ignored.
/// Empty only when the document has no body.
pub fn collect_regions<D: AnnotationDom + ?Sized>(dom: &D) -> Vec<D::Node> {
    let Some(body) = dom.body() else {
        return Vec::new();
    };

    let containers = |dom: &D, node: &D::Node| match dom.kind(node) {
        NodeKind::Element if is_off_limits(dom, node) => FilterResult::Reject,
        NodeKind::Element if is_content_container(dom, node) => FilterResult::Accept,
        NodeKind::Element => FilterResult::Skip,
        _ => FilterResult::Reject,
    };

    let mut regions: Vec<D::Node> = DomWalker::new(dom, &body, containers).collect();
    regions.push(body);
    regions
}

/// Run the strategy cascade over one region's text nodes.
pub fn match_in_region<N: Clone>(
    matcher: &PhraseMatcher,
    candidates: &[(N, NodeText)],
) -> Option<(N, MatchStrategy)> {
    MatchStrategy::CASCADE.into_iter().find_map(|strategy| {
        candidates
            .iter()
            .find(|(_, text)| matcher.matches(strategy, text))
            .map(|(node, _)| (node.clone(), strategy))
    })
}

/// Locate the best text node for a phrase.
///
/// Returns `None` when no region and strategy combination succeeds,
/// including for empty phrases.
pub fn locate<D: AnnotationDom + ?Sized>(
    dom: &D,
    matcher: &PhraseMatcher,
    regions: &[D::Node],
    config: &MatchConfig,
) -> Option<LocatedText<D::Node>> {
    if matcher.is_empty() {
        return None;
    }

    for (index, region) in regions.iter().enumerate() {
        let candidates: Vec<(D::Node, NodeText)> = eligible_text_nodes(dom, region, config)
            .into_iter()
            .map(|node| {
                let text = NodeText::new(&dom.text_content(&node));
                (node, text)
            })
            .collect();

        if let Some((node, strategy)) = match_in_region(matcher, &candidates) {
            tracing::debug!(
                target: "factmark::locate",
                region = index,
                ?strategy,
                candidates = candidates.len(),
                "matched claim"
            );
            return Some(LocatedText {
                node,
                strategy,
                region: index,
            });
        }
    }

    tracing::debug!(
        target: "factmark::locate",
        regions = regions.len(),
        phrase = %matcher.normalized(),
        "no match in any region"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;

    fn config() -> MatchConfig {
        MatchConfig::default()
    }

    #[test]
    fn test_regions_in_priority_order() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let header = dom.element(&body, "header");
        dom.element(&header, "article");
        let main = dom.element(&body, "main");
        let article = dom.element(&main, "article");
        let content = dom.element_with(&body, "div", &[("class", "wrapper content")]);
        let role = dom.element_with(&body, "section", &[("role", "main")]);

        let regions = collect_regions(&dom);
        assert_eq!(regions, vec![main, article, content, role, body]);
    }

    #[test]
    fn test_body_is_always_a_region() {
        let dom = MemoryDom::new();
        assert_eq!(collect_regions(&dom), vec![dom.body_node()]);
    }

    #[test]
    fn test_exact_match_picks_first_in_document_order() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let p1 = dom.element(&body, "p");
        dom.text(&p1, "An unrelated opening paragraph of text.");
        let p2 = dom.element(&body, "p");
        let first = dom.text(&p2, "Some say coffee cures everything, really.");
        let p3 = dom.element(&body, "p");
        dom.text(&p3, "Again: coffee cures everything, they claim.");

        let m = PhraseMatcher::new("Coffee cures everything", &config());
        let regions = collect_regions(&dom);
        let found = locate(&dom, &m, &regions, &config()).unwrap();
        assert_eq!(found.node, first);
        assert_eq!(found.strategy, MatchStrategy::Exact);
    }

    #[test]
    fn test_content_region_wins_over_earlier_body_text() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let aside = dom.element(&body, "aside");
        dom.text(&aside, "Sidebar teaser: coffee cures everything!");
        let article = dom.element(&body, "article");
        let p = dom.element(&article, "p");
        let in_article = dom.text(&p, "The article says coffee cures everything.");

        let m = PhraseMatcher::new("coffee cures everything", &config());
        let found = locate(&dom, &m, &collect_regions(&dom), &config()).unwrap();
        assert_eq!(found.node, in_article);
        assert_eq!(found.region, 0);
    }

    #[test]
    fn test_stricter_strategy_wins_over_earlier_node() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let p1 = dom.element(&body, "p");
        // Word overlap only.
        dom.text(&p1, "Daily coffee habits may cure nothing at all.");
        let p2 = dom.element(&body, "p");
        let exact = dom.text(&p2, "Claim: daily coffee can cure cancer.");

        let m = PhraseMatcher::new("daily coffee can cure cancer", &config());
        let found = locate(&dom, &m, &collect_regions(&dom), &config()).unwrap();
        assert_eq!(found.node, exact);
        assert_eq!(found.strategy, MatchStrategy::Exact);
    }

    #[test]
    fn test_loose_match_in_earlier_region_beats_later_exact() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let teaser = dom.element(&body, "p");
        dom.text(&teaser, "Critics insist the moon landing was staged in a studio somewhere.");
        let article = dom.element(&body, "article");
        let p = dom.element(&article, "p");
        // Shares key words with the claim but not enough words for a majority.
        let in_article = dom.text(&p, "Archive footage of moonwalks recreated inside a studio backlot.");

        let m = PhraseMatcher::new("the moon landing was staged in a studio", &config());
        let found = locate(&dom, &m, &collect_regions(&dom), &config()).unwrap();
        assert_eq!(found.node, in_article);
        assert_eq!(found.region, 0);
        assert_eq!(found.strategy, MatchStrategy::KeyWords);
    }

    #[test]
    fn test_majority_words_match_in_body() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let p = dom.element(&body, "p");
        let node = dom.text(&p, "Daily coffee habits may cure nothing at all.");

        let m = PhraseMatcher::new("daily coffee can cure cancer", &config());
        let regions = collect_regions(&dom);
        assert_eq!(regions, vec![body]);
        let found = locate(&dom, &m, &regions, &config()).unwrap();
        assert_eq!(found.node, node);
        assert_eq!(found.region, 0);
        assert_eq!(found.strategy, MatchStrategy::MajorityWords);
    }

    #[test]
    fn test_no_overlap_returns_none() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let p = dom.element(&body, "p");
        dom.text(&p, "Gardening tips for the spring season ahead.");

        let m = PhraseMatcher::new("quantum entanglement teleports spaceships", &config());
        assert!(locate(&dom, &m, &collect_regions(&dom), &config()).is_none());
    }

    #[test]
    fn test_empty_phrase_returns_none() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let p = dom.element(&body, "p");
        dom.text(&p, "Any paragraph text that is long enough.");

        let m = PhraseMatcher::new("", &config());
        assert!(locate(&dom, &m, &collect_regions(&dom), &config()).is_none());
    }

    #[test]
    fn test_short_phrase_goes_through_cascade() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let p = dom.element(&body, "p");
        let node = dom.text(&p, "Officials said the bridge is safe to cross.");

        let m = PhraseMatcher::new("bridge", &config());
        let found = locate(&dom, &m, &collect_regions(&dom), &config()).unwrap();
        assert_eq!(found.node, node);
        assert_eq!(found.strategy, MatchStrategy::Exact);
    }
}
