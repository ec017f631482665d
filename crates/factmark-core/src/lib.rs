//! factmark-core: platform-agnostic claim annotation engine.
//!
//! This crate provides:
//! - `AnnotationDom`, `TimerPlatform`, `HostBridge` traits for the page, timers and extension host
//! - `DomWalker` - depth-first traversal with injectable node filters
//! - `PhraseMatcher` and `locate` - the exact / majority-word / key-word cascade
//! - `Highlights` - reversible marker wrapping and paragraph fallback
//! - `TooltipController` - the single shared tooltip and its timers
//! - `AnnotationSession<D, T, H>` - one page's worth of state, generic over the platform
//! - `MemoryDom` and friends for headless runs and tests

pub mod color;
pub mod config;
pub mod error;
pub mod highlight;
pub mod locate;
pub mod matching;
pub mod memory;
pub mod platform;
pub mod session;
pub mod style;
pub mod timers;
pub mod tooltip;
pub mod types;
pub mod walk;

pub use config::{AnnotatorConfig, FallbackDisclosure, MatchConfig, TimingConfig, TooltipLayout};
pub use error::{AnnotateError, DomError};
pub use highlight::{FallbackMark, HIGHLIGHT_CLASS, Highlights, Marker};
pub use locate::{LocatedText, collect_regions, locate};
pub use matching::{MatchStrategy, NodeText, PhraseMatcher};
pub use memory::{HeadlessSession, ManualTimers, MemoryDom, MemoryNode, RecordingHost};
pub use platform::{
    AnnotationDom, HostBridge, ListenerTarget, NodeKind, PageInfo, ReportRequest, TimerPlatform,
    TimerSlot, TimerToken, UiEvent, UiEventKind,
};
pub use session::{AnnotationOutcome, AnnotationReport, AnnotationSession};
pub use smol_str::SmolStr;
pub use style::{STYLE_ELEMENT_ID, StyleInjector};
pub use tooltip::{Placement, Side, TOOLTIP_CLASS, TooltipController, TooltipState, compute_placement};
pub use types::{FallbackId, Issue, MarkerId, Rect, Severity, Size, Viewport};
pub use walk::{DomWalker, FilterResult, NodeFilter};
