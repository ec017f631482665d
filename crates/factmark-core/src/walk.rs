//! Depth-first DOM traversal with an injectable node filter.
//!
//! The walker mirrors `TreeWalker` semantics: `Accept` yields the node and
//! descends, `Skip` descends without yielding, `Reject` prunes the subtree.
//! Eligibility rules live in filters, not in the traversal.

use crate::config::MatchConfig;
use crate::highlight::HIGHLIGHT_CLASS;
use crate::platform::{AnnotationDom, NodeKind};
use crate::tooltip::TOOLTIP_CLASS;

/// Elements whose subtrees never contain matchable page content.
pub const EXCLUDED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterResult {
    Accept,
    Skip,
    Reject,
}

pub trait NodeFilter<D: AnnotationDom + ?Sized> {
    fn filter(&self, dom: &D, node: &D::Node) -> FilterResult;
}

impl<D, F> NodeFilter<D> for F
where
    D: AnnotationDom + ?Sized,
    F: Fn(&D, &D::Node) -> FilterResult,
{
    fn filter(&self, dom: &D, node: &D::Node) -> FilterResult {
        self(dom, node)
    }
}

/// Iterator over the descendants of a root, in document order.
///
/// The root itself is never yielded.
pub struct DomWalker<'a, D: AnnotationDom + ?Sized, F> {
    dom: &'a D,
    filter: F,
    stack: Vec<D::Node>,
}

impl<'a, D: AnnotationDom + ?Sized, F: NodeFilter<D>> DomWalker<'a, D, F> {
    pub fn new(dom: &'a D, root: &D::Node, filter: F) -> Self {
        let mut stack = dom.children(root);
        stack.reverse();
        Self { dom, filter, stack }
    }

    fn descend(&mut self, node: &D::Node) {
        let mut children = self.dom.children(node);
        children.reverse();
        self.stack.extend(children);
    }
}

impl<D: AnnotationDom + ?Sized, F: NodeFilter<D>> Iterator for DomWalker<'_, D, F> {
    type Item = D::Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match self.filter.filter(self.dom, &node) {
                FilterResult::Accept => {
                    self.descend(&node);
                    return Some(node);
                }
                FilterResult::Skip => self.descend(&node),
                FilterResult::Reject => {}
            }
        }
        None
    }
}

/// True for elements whose subtree the engine must never touch: excluded
/// page chrome and the engine's own highlights and tooltip.
pub fn is_off_limits<D: AnnotationDom + ?Sized>(dom: &D, node: &D::Node) -> bool {
    if let Some(tag) = dom.tag_name(node) {
        if EXCLUDED_TAGS.contains(&tag.as_str()) {
            return true;
        }
    }
    dom.has_class(node, HIGHLIGHT_CLASS) || dom.has_class(node, TOOLTIP_CLASS)
}

/// Accepts text nodes eligible for matching.
#[derive(Clone, Copy, Debug)]
pub struct EligibleText {
    pub min_len: usize,
}

impl EligibleText {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            min_len: config.min_node_text_len,
        }
    }
}

impl<D: AnnotationDom + ?Sized> NodeFilter<D> for EligibleText {
    fn filter(&self, dom: &D, node: &D::Node) -> FilterResult {
        match dom.kind(node) {
            NodeKind::Element if is_off_limits(dom, node) => FilterResult::Reject,
            NodeKind::Element => FilterResult::Skip,
            NodeKind::Text => {
                let text = dom.text_content(node);
                if text.trim().chars().count() > self.min_len {
                    FilterResult::Accept
                } else {
                    FilterResult::Reject
                }
            }
            NodeKind::Other => FilterResult::Reject,
        }
    }
}

/// Eligible text nodes under `root`, in document order.
pub fn eligible_text_nodes<D: AnnotationDom + ?Sized>(
    dom: &D,
    root: &D::Node,
    config: &MatchConfig,
) -> Vec<D::Node> {
    DomWalker::new(dom, root, EligibleText::new(config)).collect()
}
