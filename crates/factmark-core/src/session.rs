//! Annotation session: all engine state for one page load.
//!
//! The session owns the platform handles and is the only entry point the
//! platform layer talks to. Listener callbacks and timers deliver
//! [`UiEvent`]s and [`TimerToken`]s back here; nothing in the engine keeps a
//! callback of its own.

use serde::Serialize;

use crate::config::{AnnotatorConfig, FallbackDisclosure};
use crate::error::AnnotateError;
use crate::highlight::{FallbackMark, Highlights, Marker};
use crate::locate::{collect_regions, locate};
use crate::matching::{MatchStrategy, PhraseMatcher};
use crate::platform::{
    AnnotationDom, HostBridge, ListenerTarget, ReportRequest, TimerPlatform, TimerSlot,
    TimerToken, UiEvent, UiEventKind,
};
use crate::style::StyleInjector;
use crate::timers::TimerBook;
use crate::tooltip::{TooltipController, TooltipState};
use crate::types::{FallbackId, Issue, MarkerId};

/// What happened to one issue of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AnnotationOutcome {
    Highlighted {
        marker: MarkerId,
        strategy: MatchStrategy,
        region: usize,
    },
    Fallback {
        mark: FallbackId,
    },
    Skipped,
}

/// Per-issue outcomes, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationReport {
    pub outcomes: Vec<AnnotationOutcome>,
}

impl AnnotationReport {
    pub fn highlighted(&self) -> usize {
        self.count(|o| matches!(o, AnnotationOutcome::Highlighted { .. }))
    }

    pub fn fallbacks(&self) -> usize {
        self.count(|o| matches!(o, AnnotationOutcome::Fallback { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, AnnotationOutcome::Skipped))
    }

    fn count(&self, pred: impl Fn(&AnnotationOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Text for the blocking dialog used by [`FallbackDisclosure::Dialog`].
pub fn dialog_message(issue: &Issue) -> String {
    let mut message = format!("{}: \"{}\"", issue.severity.label(), issue.claim.trim());
    if !issue.reason.is_empty() {
        message.push_str("\n\nWhy this was flagged: ");
        message.push_str(&issue.reason);
    }
    if !issue.correction.is_empty() {
        message.push_str("\n\nCorrection: ");
        message.push_str(&issue.correction);
    }
    message
}

pub struct AnnotationSession<D: AnnotationDom, T, H> {
    dom: D,
    timers: T,
    host: H,
    config: AnnotatorConfig,
    styles: StyleInjector,
    highlights: Highlights<D::Node>,
    tooltip: TooltipController<D::Node>,
    /// Settle timer for scheduled batches.
    batch_timers: TimerBook,
    pending: Option<Vec<Issue>>,
    last_report: Option<AnnotationReport>,
}

impl<D, T, H> AnnotationSession<D, T, H>
where
    D: AnnotationDom,
    T: TimerPlatform,
    H: HostBridge,
{
    pub fn new(dom: D, timers: T, host: H, config: AnnotatorConfig) -> Self {
        let tooltip = TooltipController::new(config.timing.clone(), config.layout.clone());
        Self {
            dom,
            timers,
            host,
            config,
            styles: StyleInjector::new(),
            highlights: Highlights::new(),
            tooltip,
            batch_timers: TimerBook::new(),
            pending: None,
            last_report: None,
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Annotate a batch now, one issue after another.
    ///
    /// Failures are per issue: a failed issue is reported as skipped and the
    /// rest of the batch still runs.
    #[tracing::instrument(level = "debug", skip_all, fields(issues = issues.len()))]
    pub fn annotate(&mut self, issues: &[Issue]) -> AnnotationReport {
        self.styles.ensure(&self.dom);

        let regions = collect_regions(&self.dom);
        if regions.is_empty() {
            tracing::warn!(target: "factmark::session", "document has no body; nothing annotated");
        }

        let outcomes = issues
            .iter()
            .enumerate()
            .map(|(index, issue)| {
                self.annotate_one(issue, &regions).unwrap_or_else(|e| {
                    tracing::warn!(target: "factmark::session", index, error = %e, "issue skipped");
                    AnnotationOutcome::Skipped
                })
            })
            .collect();
        let report = AnnotationReport { outcomes };

        tracing::info!(
            target: "factmark::session",
            highlighted = report.highlighted(),
            fallback = report.fallbacks(),
            skipped = report.skipped(),
            "annotation pass complete"
        );
        self.last_report = Some(report.clone());
        report
    }

    fn annotate_one(
        &mut self,
        issue: &Issue,
        regions: &[D::Node],
    ) -> Result<AnnotationOutcome, AnnotateError> {
        if regions.is_empty() {
            return Ok(AnnotationOutcome::Skipped);
        }
        let matcher = PhraseMatcher::new(&issue.claim, &self.config.matching);
        if matcher.is_empty() {
            tracing::debug!(target: "factmark::session", "empty claim");
            return Ok(AnnotationOutcome::Skipped);
        }

        if let Some(found) = locate(&self.dom, &matcher, regions, &self.config.matching) {
            let marker = self.highlights.apply(&self.dom, &found.node, issue)?;
            return Ok(AnnotationOutcome::Highlighted {
                marker,
                strategy: found.strategy,
                region: found.region,
            });
        }

        match self
            .highlights
            .apply_fallback(&self.dom, &matcher, issue, &self.config.matching)?
        {
            Some(mark) => Ok(AnnotationOutcome::Fallback { mark }),
            None => {
                tracing::debug!(target: "factmark::session", claim = %issue.claim, "no match and no fallback");
                Ok(AnnotationOutcome::Skipped)
            }
        }
    }

    /// Run `issues` after the settle delay. A newer batch replaces a pending one.
    pub fn schedule_annotate(&mut self, issues: Vec<Issue>) {
        self.pending = Some(issues);
        self.batch_timers
            .arm(&self.timers, TimerSlot::Settle, self.config.timing.settle_ms);
    }

    /// Whether a scheduled batch is still waiting for its settle timer.
    pub fn has_pending_batch(&self) -> bool {
        self.pending.is_some()
    }

    /// The report of the most recent pass, scheduled or direct.
    pub fn last_report(&self) -> Option<&AnnotationReport> {
        self.last_report.as_ref()
    }

    /// Deliver an elapsed timer. Stale tokens are ignored.
    pub fn fire_timer(&mut self, token: TimerToken) {
        if token.slot == TimerSlot::Settle {
            if !self.batch_timers.take(token) {
                return;
            }
            if let Some(batch) = self.pending.take() {
                self.annotate(&batch);
            }
            return;
        }
        if !self.tooltip.on_timer(&self.dom, &self.timers, token) {
            tracing::trace!(target: "factmark::session", ?token, "stale timer");
        }
    }

    /// Deliver a pointer interaction from one of the engine's listeners.
    pub fn handle_event(&mut self, event: UiEvent) {
        tracing::trace!(target: "factmark::session", ?event, "ui event");
        let owns_tooltip = self.tooltip.owner() == Some(event.target);

        match (event.target, event.kind) {
            (ListenerTarget::Marker(_), UiEventKind::PointerEnter) if owns_tooltip => {
                self.tooltip.anchor_entered(&self.dom, &self.timers);
            }
            (ListenerTarget::Marker(id), UiEventKind::PointerEnter) => {
                if let Some(marker) = self.highlights.marker(id) {
                    let (issue, anchor) = (marker.issue.clone(), marker.wrapper.clone());
                    self.show_tooltip(&issue, &anchor, event.target);
                }
            }
            (ListenerTarget::Fallback(id), UiEventKind::Click) => {
                let Some(mark) = self.highlights.fallback(id) else {
                    return;
                };
                match self.config.fallback_disclosure {
                    FallbackDisclosure::Tooltip if owns_tooltip => {
                        self.tooltip.anchor_entered(&self.dom, &self.timers);
                    }
                    FallbackDisclosure::Tooltip => {
                        let (issue, anchor) = (mark.issue.clone(), mark.element.clone());
                        self.show_tooltip(&issue, &anchor, event.target);
                    }
                    FallbackDisclosure::Dialog => self.host.show_dialog(&dialog_message(&mark.issue)),
                }
            }
            (ListenerTarget::Fallback(_), UiEventKind::PointerEnter) if owns_tooltip => {
                self.tooltip.anchor_entered(&self.dom, &self.timers);
            }
            (ListenerTarget::Marker(_) | ListenerTarget::Fallback(_), UiEventKind::PointerLeave)
                if owns_tooltip =>
            {
                self.tooltip.anchor_left(&self.timers);
            }
            (ListenerTarget::Tooltip, UiEventKind::PointerEnter) => {
                self.tooltip.tooltip_entered(&self.dom, &self.timers);
            }
            (ListenerTarget::Tooltip, UiEventKind::PointerLeave) => {
                self.tooltip.tooltip_left(&self.timers);
            }
            (ListenerTarget::ReportButton, UiEventKind::Click) => self.report_current(),
            _ => {}
        }
    }

    fn show_tooltip(&mut self, issue: &Issue, anchor: &D::Node, owner: ListenerTarget) {
        if !self.dom.is_connected(anchor) {
            tracing::debug!(target: "factmark::session", ?owner, "anchor detached; no tooltip");
            return;
        }
        if let Err(e) = self.tooltip.show(&self.dom, &self.timers, issue, anchor, owner) {
            tracing::warn!(target: "factmark::session", ?owner, error = %e, "failed to show tooltip");
        }
    }

    /// Hand the tooltip's issue to the host's report flow and close the tooltip.
    fn report_current(&mut self) {
        let Some(issue) = self.tooltip.issue().cloned() else {
            return;
        };
        let page = self.host.page_info();
        tracing::info!(target: "factmark::session", url = %page.url, "report requested");
        self.host.submit_report(ReportRequest {
            url: page.url,
            title: page.title,
            issue,
        });
        self.tooltip.dismiss(&self.dom, &self.timers);
    }

    /// Reverse every mutation this session made and reset its state.
    ///
    /// Safe to call repeatedly; the session can annotate again afterwards.
    pub fn cleanup(&mut self) {
        self.tooltip.dismiss(&self.dom, &self.timers);
        self.batch_timers.cancel_all(&self.timers);
        self.pending = None;
        self.highlights.clear(&self.dom);
        self.styles.remove(&self.dom);
        self.last_report = None;
        tracing::info!(target: "factmark::session", "cleaned up");
    }

    pub fn issue_for_marker(&self, id: MarkerId) -> Option<&Issue> {
        self.highlights.marker(id).map(|m| &m.issue)
    }

    pub fn active_highlights(&self) -> &[Marker<D::Node>] {
        self.highlights.markers()
    }

    pub fn fallback_highlights(&self) -> &[FallbackMark<D::Node>] {
        self.highlights.fallbacks()
    }

    pub fn tooltip_state(&self) -> TooltipState {
        self.tooltip.state()
    }

    /// The live tooltip element, if any.
    pub fn tooltip_element(&self) -> Option<&D::Node> {
        self.tooltip.element()
    }
}
