//! Highlight mutator: wrap matched text nodes and undo the wrapping.
//!
//! Two mechanisms with different undo procedures:
//! - markers wrap a text node in a span and are undone by unwrapping, which
//!   puts the original text node object back in place;
//! - fallback highlights style an existing block element inline and are
//!   undone by restoring the saved inline values.

use crate::config::MatchConfig;
use crate::error::AnnotateError;
use crate::matching::PhraseMatcher;
use crate::platform::{AnnotationDom, ListenerTarget, NodeKind, UiEventKind};
use crate::types::{FallbackId, Issue, MarkerId, Severity};
use crate::walk::{DomWalker, FilterResult, is_off_limits};

pub const HIGHLIGHT_CLASS: &str = "factmark-highlight";
pub const MARKER_ID_ATTR: &str = "data-factmark-id";
pub const FALLBACK_ATTR: &str = "data-factmark-fallback";

const FALLBACK_TAGS: &[&str] = &["p", "div", "span"];

/// Inline properties touched by fallback highlights.
pub const FALLBACK_STYLE_PROPS: &[&str] = &["background-color", "border-bottom", "cursor"];

/// A wrapping highlight.
#[derive(Clone, Debug)]
pub struct Marker<N> {
    pub id: MarkerId,
    pub wrapper: N,
    /// The original text node, now the wrapper's only child.
    pub text: N,
    pub issue: Issue,
}

/// A paragraph-level highlight applied without a wrapper.
#[derive(Clone, Debug)]
pub struct FallbackMark<N> {
    pub id: FallbackId,
    pub element: N,
    pub issue: Issue,
    saved_styles: Vec<(&'static str, String)>,
}

/// Active highlights of one session.
#[derive(Debug)]
pub struct Highlights<N> {
    markers: Vec<Marker<N>>,
    fallbacks: Vec<FallbackMark<N>>,
    next_id: u32,
}

impl<N> Default for Highlights<N> {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
            fallbacks: Vec::new(),
            next_id: 0,
        }
    }
}

fn fallback_styles(severity: Severity) -> [(&'static str, String); 3] {
    [
        ("background-color", severity.tint_css()),
        ("border-bottom", format!("2px dashed {}", severity.accent_css())),
        ("cursor", "help".to_string()),
    ]
}

impl<N: Clone + PartialEq + std::fmt::Debug> Highlights<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Marker<N>] {
        &self.markers
    }

    pub fn fallbacks(&self) -> &[FallbackMark<N>] {
        &self.fallbacks
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker<N>> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn fallback(&self, id: FallbackId) -> Option<&FallbackMark<N>> {
        self.fallbacks.iter().find(|f| f.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.fallbacks.is_empty()
    }

    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Wrap `text` in a marker span carrying the issue's severity.
    ///
    /// Wrapping a node this session already wrapped returns the existing
    /// marker. On failure the DOM is left as it was.
    pub fn apply<D: AnnotationDom<Node = N> + ?Sized>(
        &mut self,
        dom: &D,
        text: &N,
        issue: &Issue,
    ) -> Result<MarkerId, AnnotateError> {
        let parent = dom.parent(text).ok_or(AnnotateError::Detached)?;
        if let Some(existing) = self.markers.iter().find(|m| m.wrapper == parent) {
            return Ok(existing.id);
        }

        let id = MarkerId(self.allocate());
        let wrapper = dom.create_element("span")?;
        dom.add_class(&wrapper, HIGHLIGHT_CLASS)?;
        dom.add_class(&wrapper, issue.severity.class_name())?;
        dom.set_attribute(&wrapper, MARKER_ID_ATTR, &id.to_string())?;

        dom.replace_child(&parent, &wrapper, text)?;
        if let Err(e) = dom.append_child(&wrapper, text) {
            // Put the text back rather than leave an empty wrapper behind.
            let _ = dom.replace_child(&parent, text, &wrapper);
            return Err(e.into());
        }

        if let Err(e) = dom.listen(
            &wrapper,
            ListenerTarget::Marker(id),
            &[UiEventKind::PointerEnter, UiEventKind::PointerLeave],
        ) {
            tracing::warn!(target: "factmark::highlight", marker = %id, error = %e, "highlight has no tooltip listeners");
        }

        tracing::debug!(target: "factmark::highlight", marker = %id, severity = %issue.severity, "wrapped text node");
        self.markers.push(Marker {
            id,
            wrapper,
            text: text.clone(),
            issue: issue.clone(),
        });
        Ok(id)
    }

    /// Coarse highlight of the first block element mentioning a key word.
    ///
    /// Returns `Ok(None)` when nothing qualifies.
    pub fn apply_fallback<D: AnnotationDom<Node = N> + ?Sized>(
        &mut self,
        dom: &D,
        matcher: &PhraseMatcher,
        issue: &Issue,
        config: &MatchConfig,
    ) -> Result<Option<FallbackId>, AnnotateError> {
        if matcher.key_words().is_empty() {
            return Ok(None);
        }
        let body = dom.body().ok_or(AnnotateError::NoBody)?;

        let blocks = |dom: &D, node: &N| {
            if dom.kind(node) != NodeKind::Element || is_off_limits(dom, node) {
                return FilterResult::Reject;
            }
            let is_block = dom
                .tag_name(node)
                .is_some_and(|tag| FALLBACK_TAGS.contains(&tag.as_str()));
            if is_block && dom.attribute(node, FALLBACK_ATTR).is_none() {
                FilterResult::Accept
            } else {
                FilterResult::Skip
            }
        };

        let target = DomWalker::new(dom, &body, blocks).find(|el| {
            let text = dom.text_content(el);
            text.trim().chars().count() > config.fallback_min_text_len
                && matcher.mentions_key_word(&text)
        });
        let Some(element) = target else {
            return Ok(None);
        };

        let id = FallbackId(self.allocate());
        let saved_styles = FALLBACK_STYLE_PROPS
            .iter()
            .map(|prop| (*prop, dom.style_property(&element, prop)))
            .collect();
        let mark = FallbackMark {
            id,
            element: element.clone(),
            issue: issue.clone(),
            saved_styles,
        };

        let applied = (|| {
            for (prop, value) in fallback_styles(issue.severity) {
                dom.set_style_property(&element, prop, &value)?;
            }
            dom.set_attribute(&element, FALLBACK_ATTR, &id.to_string())
        })();
        if let Err(e) = applied {
            restore_fallback(dom, &mark);
            return Err(e.into());
        }

        if let Err(e) = dom.listen(
            &element,
            ListenerTarget::Fallback(id),
            &[UiEventKind::Click, UiEventKind::PointerEnter, UiEventKind::PointerLeave],
        ) {
            tracing::warn!(target: "factmark::highlight", fallback = %id, error = %e, "fallback highlight has no listeners");
        }

        tracing::debug!(target: "factmark::highlight", fallback = %id, "applied paragraph fallback");
        self.fallbacks.push(mark);
        Ok(Some(id))
    }

    /// Undo every highlight, newest first, then forget them.
    pub fn clear<D: AnnotationDom<Node = N> + ?Sized>(&mut self, dom: &D) {
        while let Some(marker) = self.markers.pop() {
            if let Err(e) = unwrap_marker(dom, &marker) {
                tracing::warn!(target: "factmark::highlight", marker = %marker.id, error = %e, "failed to unwrap");
            }
        }
        while let Some(mark) = self.fallbacks.pop() {
            restore_fallback(dom, &mark);
        }
    }
}

fn unwrap_marker<D: AnnotationDom + ?Sized>(
    dom: &D,
    marker: &Marker<D::Node>,
) -> Result<(), AnnotateError> {
    dom.unlisten(&marker.wrapper);
    // A page script may have removed the wrapper already; nothing to restore.
    let Some(parent) = dom.parent(&marker.wrapper) else {
        return Ok(());
    };
    dom.replace_child(&parent, &marker.text, &marker.wrapper)?;
    Ok(())
}

fn restore_fallback<D: AnnotationDom + ?Sized>(dom: &D, mark: &FallbackMark<D::Node>) {
    dom.unlisten(&mark.element);
    for (prop, old) in &mark.saved_styles {
        let result = if old.is_empty() {
            dom.remove_style_property(&mark.element, prop)
        } else {
            dom.set_style_property(&mark.element, prop, old)
        };
        if let Err(e) = result {
            tracing::warn!(target: "factmark::highlight", fallback = %mark.id, error = %e, "failed to restore style");
        }
    }
    let _ = dom.remove_attribute(&mark.element, FALLBACK_ATTR);
}
