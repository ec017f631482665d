//! Tooltip controller: one shared floating tooltip per session.
//!
//! States cycle `Hidden → Showing → Visible → Hiding → Hidden`. The element
//! reference is the single source of truth for "a tooltip exists"; creating
//! a new tooltip always destroys the old one first. Timer callbacks that
//! arrive for a replaced or removed tooltip are no-ops.

use crate::config::{TimingConfig, TooltipLayout};
use crate::error::{AnnotateError, DomError};
use crate::platform::{
    AnnotationDom, ListenerTarget, TimerPlatform, TimerSlot, TimerToken, UiEventKind,
};
use crate::timers::TimerBook;
use crate::types::{Issue, Rect, Size, Viewport};

pub const TOOLTIP_CLASS: &str = "factmark-tooltip";
pub const TOOLTIP_VISIBLE_CLASS: &str = "factmark-visible";
pub const REPORT_BUTTON_CLASS: &str = "factmark-report";

/// Keeps the arrow off the rounded corners.
const ARROW_INSET: f64 = 12.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TooltipState {
    #[default]
    Hidden,
    /// Inserted and positioned, fade-in pending.
    Showing,
    Visible,
    /// Fading out, removal pending.
    Hiding,
}

/// Which side of the anchor the tooltip sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Below,
    Above,
}

impl Side {
    fn class_name(self) -> &'static str {
        match self {
            Side::Below => "factmark-below",
            Side::Above => "factmark-above",
        }
    }
}

/// Computed tooltip position, viewport-relative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub side: Side,
    /// Arrow offset from the tooltip's left edge.
    pub arrow_left: f64,
}

/// Center the tooltip under the anchor, clamped to the viewport margins,
/// flipping above the anchor when it would overflow the bottom.
///
/// Width is capped so the tooltip always fits between the margins.
pub fn compute_placement(
    anchor: Rect,
    tooltip: Size,
    viewport: Viewport,
    layout: &TooltipLayout,
) -> Placement {
    let available = (viewport.width - 2.0 * layout.margin).max(0.0);
    let width = tooltip.width.min(layout.max_width).min(available).max(0.0);

    let max_left = viewport.width - layout.margin - width;
    let left = (anchor.center_x() - width / 2.0)
        .min(max_left)
        .max(layout.margin);

    let below = anchor.bottom() + layout.gap;
    let (top, side) = if below + tooltip.height > viewport.height {
        (anchor.y - layout.gap - tooltip.height, Side::Above)
    } else {
        (below, Side::Below)
    };

    let arrow_left = (anchor.center_x() - left).clamp(ARROW_INSET, (width - ARROW_INSET).max(ARROW_INSET));

    Placement {
        left,
        top,
        width,
        side,
        arrow_left,
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Hover {
    anchor: bool,
    tooltip: bool,
}

/// The live tooltip instance.
#[derive(Clone, Debug)]
struct Instance<N> {
    element: N,
    button: N,
    anchor: N,
    owner: ListenerTarget,
    issue: Issue,
}

#[derive(Debug)]
pub struct TooltipController<N> {
    state: TooltipState,
    current: Option<Instance<N>>,
    hover: Hover,
    timers: TimerBook,
    timing: TimingConfig,
    layout: TooltipLayout,
}

impl<N: Clone + PartialEq + std::fmt::Debug> TooltipController<N> {
    pub fn new(timing: TimingConfig, layout: TooltipLayout) -> Self {
        Self {
            state: TooltipState::Hidden,
            current: None,
            hover: Hover::default(),
            timers: TimerBook::new(),
            timing,
            layout,
        }
    }

    pub fn state(&self) -> TooltipState {
        self.state
    }

    pub fn element(&self) -> Option<&N> {
        self.current.as_ref().map(|c| &c.element)
    }

    pub fn issue(&self) -> Option<&Issue> {
        self.current.as_ref().map(|c| &c.issue)
    }

    /// The highlight the tooltip is currently attached to.
    pub fn owner(&self) -> Option<ListenerTarget> {
        self.current.as_ref().map(|c| c.owner)
    }

    /// Build, insert and position a tooltip for `issue` next to `anchor`.
    ///
    /// Any existing tooltip is destroyed first.
    pub fn show<D, T>(
        &mut self,
        dom: &D,
        timers: &T,
        issue: &Issue,
        anchor: &N,
        owner: ListenerTarget,
    ) -> Result<(), AnnotateError>
    where
        D: AnnotationDom<Node = N> + ?Sized,
        T: TimerPlatform + ?Sized,
    {
        self.dismiss(dom, timers);

        let body = dom.body().ok_or(AnnotateError::NoBody)?;
        let (element, button) = build_tooltip(dom, issue)?;
        if let Err(e) = attach_tooltip(dom, &body, &element, &button) {
            dom.unlisten(&element);
            dom.unlisten(&button);
            let _ = dom.remove(&element);
            return Err(e.into());
        }

        self.current = Some(Instance {
            element: element.clone(),
            button,
            anchor: anchor.clone(),
            owner,
            issue: issue.clone(),
        });
        self.hover = Hover {
            anchor: true,
            tooltip: false,
        };
        self.state = TooltipState::Showing;

        if let Err(e) = self.position(dom, &element, anchor) {
            tracing::warn!(target: "factmark::tooltip", error = %e, "failed to position tooltip");
        }
        self.timers.arm(timers, TimerSlot::Show, self.timing.show_ms);
        tracing::debug!(target: "factmark::tooltip", ?owner, "showing tooltip");
        Ok(())
    }

    fn position<D: AnnotationDom<Node = N> + ?Sized>(
        &self,
        dom: &D,
        element: &N,
        anchor: &N,
    ) -> Result<(), DomError> {
        let viewport = dom.viewport();
        let placement = compute_placement(
            dom.bounding_rect(anchor),
            dom.bounding_rect(element).size(),
            viewport,
            &self.layout,
        );
        let px = |v: f64| format!("{}px", v.round());
        dom.set_style_property(element, "left", &px(placement.left + viewport.scroll_x))?;
        dom.set_style_property(element, "top", &px(placement.top + viewport.scroll_y))?;
        dom.set_style_property(element, "max-width", &px(placement.width))?;
        dom.set_style_property(element, "--factmark-arrow-left", &px(placement.arrow_left))?;
        dom.add_class(element, placement.side.class_name())
    }

    /// Pointer entered the anchor the tooltip belongs to.
    pub fn anchor_entered<D, T>(&mut self, dom: &D, timers: &T)
    where
        D: AnnotationDom<Node = N> + ?Sized,
        T: TimerPlatform + ?Sized,
    {
        self.hover.anchor = true;
        self.keep_open(dom, timers);
    }

    /// Pointer left the anchor (highlight or fallback element).
    pub fn anchor_left<T: TimerPlatform + ?Sized>(&mut self, timers: &T) {
        self.hover.anchor = false;
        self.schedule_hide(timers);
    }

    /// Pointer entered the tooltip: keep it open.
    pub fn tooltip_entered<D, T>(&mut self, dom: &D, timers: &T)
    where
        D: AnnotationDom<Node = N> + ?Sized,
        T: TimerPlatform + ?Sized,
    {
        self.hover.tooltip = true;
        self.keep_open(dom, timers);
    }

    pub fn tooltip_left<T: TimerPlatform + ?Sized>(&mut self, timers: &T) {
        self.hover.tooltip = false;
        self.schedule_hide(timers);
    }

    /// Start the grace period after which the tooltip fades out.
    pub fn schedule_hide<T: TimerPlatform + ?Sized>(&mut self, timers: &T) {
        if self.current.is_none() {
            return;
        }
        self.timers.arm(timers, TimerSlot::Hide, self.timing.hide_grace_ms);
    }

    /// Cancel any pending hide; a fading tooltip becomes visible again.
    fn keep_open<D, T>(&mut self, dom: &D, timers: &T)
    where
        D: AnnotationDom<Node = N> + ?Sized,
        T: TimerPlatform + ?Sized,
    {
        self.timers.cancel(timers, TimerSlot::Hide);
        self.timers.cancel(timers, TimerSlot::Remove);
        if self.state == TooltipState::Hiding {
            if let Some(current) = &self.current {
                let _ = dom.add_class(&current.element, TOOLTIP_VISIBLE_CLASS);
            }
            self.state = TooltipState::Visible;
        }
    }

    /// Handle an elapsed timer. Returns false if the token was not ours or stale.
    pub fn on_timer<D, T>(&mut self, dom: &D, timers: &T, token: TimerToken) -> bool
    where
        D: AnnotationDom<Node = N> + ?Sized,
        T: TimerPlatform + ?Sized,
    {
        if !self.timers.take(token) {
            return false;
        }
        let Some(element) = self.current.as_ref().map(|c| c.element.clone()) else {
            return true;
        };
        if !dom.is_connected(&element) {
            // Removed by the page; forget it.
            self.forget(timers);
            return true;
        }

        match token.slot {
            TimerSlot::Show if self.state == TooltipState::Showing => {
                let _ = dom.add_class(&element, TOOLTIP_VISIBLE_CLASS);
                self.state = TooltipState::Visible;
            }
            TimerSlot::Hide if !self.hover.anchor && !self.hover.tooltip => {
                let _ = dom.remove_class(&element, TOOLTIP_VISIBLE_CLASS);
                self.timers.cancel(timers, TimerSlot::Show);
                self.state = TooltipState::Hiding;
                self.timers.arm(timers, TimerSlot::Remove, self.timing.fade_out_ms);
            }
            TimerSlot::Remove if self.state == TooltipState::Hiding => {
                self.dismiss(dom, timers);
            }
            _ => {}
        }
        true
    }

    /// Remove the tooltip immediately, cancelling pending timers.
    pub fn dismiss<D, T>(&mut self, dom: &D, timers: &T)
    where
        D: AnnotationDom<Node = N> + ?Sized,
        T: TimerPlatform + ?Sized,
    {
        if let Some(current) = self.current.take() {
            dom.unlisten(&current.button);
            dom.unlisten(&current.element);
            if let Err(e) = dom.remove(&current.element) {
                tracing::warn!(target: "factmark::tooltip", error = %e, "failed to remove tooltip");
            }
            tracing::debug!(target: "factmark::tooltip", owner = ?current.owner, "tooltip removed");
        }
        self.forget(timers);
    }

    fn forget<T: TimerPlatform + ?Sized>(&mut self, timers: &T) {
        self.current = None;
        self.timers.cancel_all(timers);
        self.hover = Hover::default();
        self.state = TooltipState::Hidden;
    }

    /// Whether the anchor of the live tooltip is `node`.
    pub fn is_anchored_at(&self, node: &N) -> bool {
        self.current.as_ref().is_some_and(|c| &c.anchor == node)
    }
}

fn element_with<D: AnnotationDom + ?Sized>(
    dom: &D,
    tag: &str,
    classes: &[&str],
    text: Option<&str>,
) -> Result<D::Node, DomError> {
    let el = dom.create_element(tag)?;
    for class in classes {
        dom.add_class(&el, class)?;
    }
    if let Some(text) = text {
        let node = dom.create_text(text)?;
        dom.append_child(&el, &node)?;
    }
    Ok(el)
}

/// Build the detached tooltip subtree. Returns the root and the report button.
///
/// Text goes in as text nodes, so reason and correction need no escaping.
fn build_tooltip<D: AnnotationDom + ?Sized>(
    dom: &D,
    issue: &Issue,
) -> Result<(D::Node, D::Node), DomError> {
    let severity = issue.severity;
    let root = element_with(dom, "div", &[TOOLTIP_CLASS, severity.class_name()], None)?;
    dom.set_attribute(&root, "role", "tooltip")?;

    let arrow = element_with(dom, "div", &["factmark-arrow"], None)?;
    dom.append_child(&root, &arrow)?;

    let header = element_with(dom, "div", &["factmark-tooltip-header"], None)?;
    let badge = element_with(
        dom,
        "span",
        &["factmark-badge", severity.class_name()],
        Some(severity.label()),
    )?;
    dom.append_child(&header, &badge)?;
    dom.append_child(&root, &header)?;

    if !issue.reason.is_empty() {
        let section = element_with(dom, "div", &["factmark-section"], None)?;
        let label = element_with(dom, "strong", &[], Some("Why this was flagged"))?;
        let reason = element_with(dom, "p", &["factmark-reason"], Some(&issue.reason))?;
        dom.append_child(&section, &label)?;
        dom.append_child(&section, &reason)?;
        dom.append_child(&root, &section)?;
    }

    if !issue.correction.is_empty() {
        let section = element_with(dom, "div", &["factmark-section"], None)?;
        let label = element_with(dom, "strong", &[], Some("Correction"))?;
        let correction = element_with(dom, "p", &["factmark-correction"], Some(&issue.correction))?;
        dom.append_child(&section, &label)?;
        dom.append_child(&section, &correction)?;
        dom.append_child(&root, &section)?;
    }

    let button = element_with(dom, "button", &[REPORT_BUTTON_CLASS], Some("Report this page"))?;
    dom.set_attribute(&button, "type", "button")?;
    dom.append_child(&root, &button)?;
    Ok((root, button))
}

/// Insert the tooltip under `body` and start listening on it.
fn attach_tooltip<D: AnnotationDom + ?Sized>(
    dom: &D,
    body: &D::Node,
    root: &D::Node,
    button: &D::Node,
) -> Result<(), DomError> {
    dom.append_child(body, root)?;
    dom.listen(
        root,
        ListenerTarget::Tooltip,
        &[UiEventKind::PointerEnter, UiEventKind::PointerLeave],
    )?;
    dom.listen(button, ListenerTarget::ReportButton, &[UiEventKind::Click])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ManualTimers, MemoryDom, MemoryNode};
    use crate::types::{MarkerId, Severity};
    use proptest::prelude::*;

    fn layout() -> TooltipLayout {
        TooltipLayout::default()
    }

    fn setup() -> (MemoryDom, ManualTimers, TooltipController<MemoryNode>, MemoryNode) {
        let dom = MemoryDom::new();
        dom.set_class_size(TOOLTIP_CLASS, Size::new(300.0, 120.0));
        let body = dom.body_node();
        let p = dom.element(&body, "p");
        let anchor = dom.element(&p, "span");
        dom.set_rect(&anchor, Rect::new(100.0, 100.0, 200.0, 20.0));
        let controller = TooltipController::new(TimingConfig::default(), layout());
        (dom, ManualTimers::new(), controller, anchor)
    }

    fn issue() -> Issue {
        Issue::new("claim", Severity::High, "Not supported by evidence.", "No diet cures cancer.")
    }

    fn fire_due(dom: &MemoryDom, timers: &ManualTimers, tip: &mut TooltipController<MemoryNode>, ms: u32) {
        timers.run_for(ms, |token| {
            tip.on_timer(dom, timers, token);
        });
    }

    #[test]
    fn test_placement_centers_below_anchor() {
        let p = compute_placement(
            Rect::new(400.0, 100.0, 200.0, 20.0),
            Size::new(300.0, 100.0),
            Viewport::new(1280.0, 800.0),
            &layout(),
        );
        assert_eq!(p.left, 350.0);
        assert_eq!(p.top, 130.0);
        assert_eq!(p.side, Side::Below);
        assert_eq!(p.arrow_left, 150.0);
    }

    #[test]
    fn test_placement_clamps_to_margins() {
        let viewport = Viewport::new(800.0, 600.0);
        let left_edge = compute_placement(Rect::new(0.0, 50.0, 20.0, 20.0), Size::new(300.0, 100.0), viewport, &layout());
        assert_eq!(left_edge.left, 10.0);
        assert_eq!(left_edge.arrow_left, ARROW_INSET);

        let right_edge = compute_placement(Rect::new(790.0, 50.0, 10.0, 20.0), Size::new(300.0, 100.0), viewport, &layout());
        assert_eq!(right_edge.left, 490.0);
    }

    #[test]
    fn test_placement_flips_above_near_bottom() {
        let p = compute_placement(
            Rect::new(100.0, 550.0, 100.0, 20.0),
            Size::new(300.0, 100.0),
            Viewport::new(800.0, 600.0),
            &layout(),
        );
        assert_eq!(p.side, Side::Above);
        assert_eq!(p.top, 440.0);
    }

    #[test]
    fn test_placement_narrow_viewport_shrinks_width() {
        let p = compute_placement(
            Rect::new(10.0, 10.0, 50.0, 20.0),
            Size::new(320.0, 100.0),
            Viewport::new(200.0, 600.0),
            &layout(),
        );
        assert_eq!(p.width, 180.0);
        assert_eq!(p.left, 10.0);
    }

    proptest! {
        #[test]
        fn placement_stays_inside_horizontal_margins(
            anchor_x in -200.0f64..2200.0,
            anchor_w in 0.0f64..600.0,
            tip_w in 1.0f64..800.0,
            vw in 100.0f64..2000.0,
        ) {
            let p = compute_placement(
                Rect::new(anchor_x, 100.0, anchor_w, 20.0),
                Size::new(tip_w, 80.0),
                Viewport::new(vw, 900.0),
                &layout(),
            );
            prop_assert!(p.left >= 10.0);
            prop_assert!(p.left + p.width <= vw - 10.0 + 1e-9);
        }
    }

    #[test]
    fn test_show_builds_content() {
        let (dom, timers, mut tip, anchor) = setup();
        tip.show(&dom, &timers, &issue(), &anchor, ListenerTarget::Marker(MarkerId(1))).unwrap();

        let el = tip.element().cloned().unwrap();
        assert_eq!(tip.state(), TooltipState::Showing);
        assert!(dom.has_class(&el, "severity-high"));
        assert!(dom.text_content(&el).contains("Not supported by evidence."));
        assert!(dom.text_content(&el).contains("No diet cures cancer."));
        assert_eq!(dom.style_property(&el, "left"), "50px");
        assert_eq!(dom.style_property(&el, "top"), "130px");
        assert_eq!(dom.count_with_class(REPORT_BUTTON_CLASS), 1);

        fire_due(&dom, &timers, &mut tip, 100);
        assert_eq!(tip.state(), TooltipState::Visible);
        assert!(dom.has_class(&el, TOOLTIP_VISIBLE_CLASS));
    }

    #[test]
    fn test_hide_after_grace_and_fade() {
        let (dom, timers, mut tip, anchor) = setup();
        tip.show(&dom, &timers, &issue(), &anchor, ListenerTarget::Marker(MarkerId(1))).unwrap();
        fire_due(&dom, &timers, &mut tip, 100);

        tip.anchor_left(&timers);
        fire_due(&dom, &timers, &mut tip, 1999);
        assert_eq!(tip.state(), TooltipState::Visible);

        fire_due(&dom, &timers, &mut tip, 1);
        assert_eq!(tip.state(), TooltipState::Hiding);
        assert_eq!(dom.count_with_class(TOOLTIP_CLASS), 1);

        fire_due(&dom, &timers, &mut tip, 200);
        assert_eq!(tip.state(), TooltipState::Hidden);
        assert_eq!(dom.count_with_class(TOOLTIP_CLASS), 0);
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn test_entering_tooltip_cancels_hide() {
        let (dom, timers, mut tip, anchor) = setup();
        tip.show(&dom, &timers, &issue(), &anchor, ListenerTarget::Marker(MarkerId(1))).unwrap();
        fire_due(&dom, &timers, &mut tip, 100);

        tip.anchor_left(&timers);
        fire_due(&dom, &timers, &mut tip, 1500);
        tip.tooltip_entered(&dom, &timers);
        fire_due(&dom, &timers, &mut tip, 5000);
        assert_eq!(tip.state(), TooltipState::Visible);

        tip.tooltip_left(&timers);
        fire_due(&dom, &timers, &mut tip, 2200);
        assert_eq!(tip.state(), TooltipState::Hidden);
    }

    #[test]
    fn test_entering_tooltip_while_fading_restores_it() {
        let (dom, timers, mut tip, anchor) = setup();
        tip.show(&dom, &timers, &issue(), &anchor, ListenerTarget::Marker(MarkerId(1))).unwrap();
        fire_due(&dom, &timers, &mut tip, 100);
        tip.anchor_left(&timers);
        fire_due(&dom, &timers, &mut tip, 2100);
        assert_eq!(tip.state(), TooltipState::Hiding);

        tip.tooltip_entered(&dom, &timers);
        fire_due(&dom, &timers, &mut tip, 1000);
        let el = tip.element().cloned().unwrap();
        assert_eq!(tip.state(), TooltipState::Visible);
        assert!(dom.has_class(&el, TOOLTIP_VISIBLE_CLASS));
    }

    #[test]
    fn test_show_replaces_existing() {
        let (dom, timers, mut tip, anchor) = setup();
        let other = dom.element(&dom.body_node(), "span");
        tip.show(&dom, &timers, &issue(), &anchor, ListenerTarget::Marker(MarkerId(1))).unwrap();
        let first = tip.element().cloned().unwrap();
        tip.show(&dom, &timers, &issue(), &other, ListenerTarget::Marker(MarkerId(2))).unwrap();

        assert_eq!(dom.count_with_class(TOOLTIP_CLASS), 1);
        assert!(!dom.is_connected(&first));
        assert!(dom.listeners(&first).is_empty());
        assert_eq!(tip.owner(), Some(ListenerTarget::Marker(MarkerId(2))));
        assert!(tip.is_anchored_at(&other));
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let (dom, timers, mut tip, anchor) = setup();
        tip.show(&dom, &timers, &issue(), &anchor, ListenerTarget::Marker(MarkerId(1))).unwrap();
        tip.anchor_left(&timers);
        let stale = timers.pending_tokens().into_iter().find(|t| t.slot == TimerSlot::Hide).unwrap();
        tip.anchor_entered(&dom, &timers);

        assert!(!tip.on_timer(&dom, &timers, stale));
        assert_eq!(tip.state(), TooltipState::Showing);
    }

    #[test]
    fn test_failed_listen_leaves_nothing_behind() {
        let (dom, timers, mut tip, anchor) = setup();
        // The tooltip root listens, then the report button fails to.
        dom.fail_after("listen", 1);

        let result = tip.show(&dom, &timers, &issue(), &anchor, ListenerTarget::Marker(MarkerId(1)));
        assert!(result.is_err());
        assert_eq!(tip.state(), TooltipState::Hidden);
        assert!(tip.element().is_none());
        assert_eq!(dom.count_with_class(TOOLTIP_CLASS), 0);
        assert_eq!(dom.listener_count(), 0);
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn test_tooltip_removed_by_page_is_forgotten() {
        let (dom, timers, mut tip, anchor) = setup();
        tip.show(&dom, &timers, &issue(), &anchor, ListenerTarget::Marker(MarkerId(1))).unwrap();
        let el = tip.element().cloned().unwrap();
        dom.remove(&el).unwrap();

        fire_due(&dom, &timers, &mut tip, 100);
        assert_eq!(tip.state(), TooltipState::Hidden);
        assert!(tip.element().is_none());
    }
}
