//! Platform abstraction traits for annotation.
//!
//! These traits define the interface between the engine and a concrete
//! document: the browser DOM via `web-sys`, or the in-memory tree used for
//! headless runs and tests. The engine never holds a platform borrow across
//! a callback; events and timers are delivered back through the session.

use serde::Serialize;
use smol_str::SmolStr;

use crate::error::DomError;
use crate::types::{FallbackId, Issue, MarkerId, Rect, Viewport};

/// Coarse node classification used by the walker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Other,
}

/// Which engine-owned element an event listener belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Marker(MarkerId),
    Fallback(FallbackId),
    Tooltip,
    ReportButton,
}

/// Pointer interactions the engine listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UiEventKind {
    PointerEnter,
    PointerLeave,
    Click,
}

impl UiEventKind {
    /// DOM event type name.
    pub fn dom_event_name(self) -> &'static str {
        match self {
            UiEventKind::PointerEnter => "mouseenter",
            UiEventKind::PointerLeave => "mouseleave",
            UiEventKind::Click => "click",
        }
    }
}

/// An interaction delivered from a platform listener to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiEvent {
    pub target: ListenerTarget,
    pub kind: UiEventKind,
}

impl UiEvent {
    pub fn new(target: ListenerTarget, kind: UiEventKind) -> Self {
        Self { target, kind }
    }
}

/// Timer slots. Each slot holds at most one pending timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// Delay before a scheduled batch runs.
    Settle,
    /// Fade-in before the tooltip becomes visible.
    Show,
    /// Grace period before the tooltip starts fading out.
    Hide,
    /// Fade-out before the tooltip is removed.
    Remove,
}

/// Handle for a scheduled callback. Sequence numbers are never reused
/// within a session, so a stale token can never match a live one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub slot: TimerSlot,
    pub seq: u64,
}

/// Page identity passed along with report requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
}

/// Hand-off to the host's report-submission flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    pub url: String,
    pub title: String,
    pub issue: Issue,
}

/// Document operations needed by the engine.
///
/// All methods take `&self`; implementations use interior mutability where
/// needed, as the browser DOM does. Mutating operations report failures
/// (detached nodes, hostile page scripts) as `DomError`.
pub trait AnnotationDom {
    type Node: Clone + PartialEq + std::fmt::Debug;

    fn body(&self) -> Option<Self::Node>;

    fn head(&self) -> Option<Self::Node>;

    fn kind(&self, node: &Self::Node) -> NodeKind;

    /// Lowercase tag name for elements, `None` otherwise.
    fn tag_name(&self, node: &Self::Node) -> Option<SmolStr>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;

    fn remove_attribute(&self, node: &Self::Node, name: &str) -> Result<(), DomError>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn add_class(&self, node: &Self::Node, class: &str) -> Result<(), DomError>;

    fn remove_class(&self, node: &Self::Node, class: &str) -> Result<(), DomError>;

    /// Child nodes in document order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Text data of a text node, or the concatenated descendant text of an element.
    fn text_content(&self, node: &Self::Node) -> String;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;

    fn create_text(&self, data: &str) -> Result<Self::Node, DomError>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

    /// Put `new_child` where `old_child` is, detaching `old_child`.
    fn replace_child(
        &self,
        parent: &Self::Node,
        new_child: &Self::Node,
        old_child: &Self::Node,
    ) -> Result<(), DomError>;

    /// Detach a node from its parent. Detached nodes are left alone.
    fn remove(&self, node: &Self::Node) -> Result<(), DomError>;

    /// Inline style value, empty when unset.
    fn style_property(&self, node: &Self::Node, property: &str) -> String;

    fn set_style_property(
        &self,
        node: &Self::Node,
        property: &str,
        value: &str,
    ) -> Result<(), DomError>;

    fn remove_style_property(&self, node: &Self::Node, property: &str) -> Result<(), DomError>;

    /// Viewport-relative bounding box.
    fn bounding_rect(&self, node: &Self::Node) -> Rect;

    fn viewport(&self) -> Viewport;

    /// Whether the node is still attached to the document.
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// Register listeners that deliver `UiEvent { target, kind }` to the session.
    fn listen(
        &self,
        node: &Self::Node,
        target: ListenerTarget,
        kinds: &[UiEventKind],
    ) -> Result<(), DomError>;

    /// Drop every listener registered on the node.
    fn unlisten(&self, node: &Self::Node);
}

/// Cancellable deferred callbacks.
///
/// When a timer elapses the platform calls `AnnotationSession::fire_timer`
/// with the same token.
pub trait TimerPlatform {
    fn set_timeout(&self, token: TimerToken, delay_ms: u32);

    fn clear_timeout(&self, token: TimerToken);
}

/// The surrounding extension UI.
pub trait HostBridge {
    fn page_info(&self) -> PageInfo;

    fn submit_report(&self, request: ReportRequest);

    /// Blocking disclosure, only used for fallback highlights in dialog mode.
    fn show_dialog(&self, message: &str);
}
