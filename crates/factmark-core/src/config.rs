//! Tunable annotation constants.
//!
//! The thresholds and delays here are empirical. They are grouped so a host
//! can override any of them, but none of them are load-bearing for the
//! engine's invariants.

use serde::{Deserialize, Serialize};

/// Minimum trimmed length (in chars) a text node must exceed to be matched.
pub const MIN_NODE_TEXT_LEN: usize = 15;
/// Share of phrase words that must overlap for the majority-word strategy.
pub const WORD_OVERLAP_RATIO: f64 = 0.6;
/// Floor on the absolute word-overlap count.
pub const MIN_WORD_MATCHES: usize = 2;
/// Phrase words shorter than or equal to this are ignored.
pub const MAX_IGNORED_WORD_LEN: usize = 2;
/// Share of key words that must be present for the key-word strategy.
pub const KEY_WORD_RATIO: f64 = 0.5;
pub const MIN_KEY_WORD_MATCHES: usize = 1;
/// Elements must have more text than this to take a fallback highlight.
pub const FALLBACK_MIN_TEXT_LEN: usize = 50;

pub const SETTLE_DELAY_MS: u32 = 500;
pub const SHOW_DELAY_MS: u32 = 100;
/// Long enough for the pointer to travel from the highlight to the tooltip.
pub const HIDE_GRACE_MS: u32 = 2000;
pub const FADE_OUT_MS: u32 = 200;

pub const VIEWPORT_MARGIN: f64 = 10.0;
pub const ANCHOR_GAP: f64 = 10.0;
pub const TOOLTIP_MAX_WIDTH: f64 = 320.0;

/// Matching thresholds used by the locator and the fallback scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchConfig {
    pub min_node_text_len: usize,
    pub word_overlap_ratio: f64,
    pub min_word_matches: usize,
    pub key_word_ratio: f64,
    pub min_key_word_matches: usize,
    pub fallback_min_text_len: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_node_text_len: MIN_NODE_TEXT_LEN,
            word_overlap_ratio: WORD_OVERLAP_RATIO,
            min_word_matches: MIN_WORD_MATCHES,
            key_word_ratio: KEY_WORD_RATIO,
            min_key_word_matches: MIN_KEY_WORD_MATCHES,
            fallback_min_text_len: FALLBACK_MIN_TEXT_LEN,
        }
    }
}

/// Delays for the batch start and the tooltip choreography, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    pub settle_ms: u32,
    pub show_ms: u32,
    pub hide_grace_ms: u32,
    pub fade_out_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: SETTLE_DELAY_MS,
            show_ms: SHOW_DELAY_MS,
            hide_grace_ms: HIDE_GRACE_MS,
            fade_out_ms: FADE_OUT_MS,
        }
    }
}

/// Tooltip geometry, in CSS pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TooltipLayout {
    /// Minimum distance between the tooltip and the viewport edges.
    pub margin: f64,
    /// Vertical distance between the anchor and the tooltip.
    pub gap: f64,
    pub max_width: f64,
}

impl Default for TooltipLayout {
    fn default() -> Self {
        Self {
            margin: VIEWPORT_MARGIN,
            gap: ANCHOR_GAP,
            max_width: TOOLTIP_MAX_WIDTH,
        }
    }
}

/// How a fallback (paragraph-level) highlight discloses its issue on click.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackDisclosure {
    /// Open the shared tooltip anchored at the element.
    #[default]
    Tooltip,
    /// Blocking host dialog.
    Dialog,
}

/// Full engine configuration. Every field has a default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnotatorConfig {
    pub matching: MatchConfig,
    pub timing: TimingConfig,
    pub layout: TooltipLayout,
    pub fallback_disclosure: FallbackDisclosure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AnnotatorConfig =
            serde_json::from_str(r#"{"timing":{"hideGraceMs":500},"fallbackDisclosure":"dialog"}"#)
                .unwrap();
        assert_eq!(config.timing.hide_grace_ms, 500);
        assert_eq!(config.timing.show_ms, SHOW_DELAY_MS);
        assert_eq!(config.matching, MatchConfig::default());
        assert_eq!(config.fallback_disclosure, FallbackDisclosure::Dialog);
    }
}
