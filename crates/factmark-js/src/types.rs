//! Types exposed to JavaScript via wasm-bindgen.

use factmark_core::{AnnotationOutcome, AnnotationReport, Issue, MatchStrategy, Severity};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// A flagged claim as produced by the analysis step.
///
/// `severity` is case-insensitive; unknown values count as medium.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsIssue {
    pub claim: String,
    #[serde(default)]
    #[tsify(optional, type = "\"low\" | \"medium\" | \"high\" | string")]
    pub severity: Option<String>,
    #[serde(default)]
    #[tsify(optional)]
    pub reason: Option<String>,
    #[serde(default)]
    #[tsify(optional)]
    pub correction: Option<String>,
}

impl From<JsIssue> for Issue {
    fn from(issue: JsIssue) -> Self {
        Issue::new(
            issue.claim,
            issue.severity.as_deref().map(Severity::from).unwrap_or_default(),
            issue.reason.unwrap_or_default(),
            issue.correction.unwrap_or_default(),
        )
    }
}

/// What happened to one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JsOutcome {
    #[serde(rename_all = "camelCase")]
    Highlighted {
        marker_id: String,
        strategy: String,
        region: usize,
    },
    #[serde(rename_all = "camelCase")]
    Fallback { fallback_id: String },
    Skipped,
}

fn strategy_name(strategy: MatchStrategy) -> &'static str {
    match strategy {
        MatchStrategy::Exact => "exact",
        MatchStrategy::MajorityWords => "majorityWords",
        MatchStrategy::KeyWords => "keyWords",
    }
}

impl From<&AnnotationOutcome> for JsOutcome {
    fn from(outcome: &AnnotationOutcome) -> Self {
        match *outcome {
            AnnotationOutcome::Highlighted {
                marker,
                strategy,
                region,
            } => JsOutcome::Highlighted {
                marker_id: marker.to_string(),
                strategy: strategy_name(strategy).to_string(),
                region,
            },
            AnnotationOutcome::Fallback { mark } => JsOutcome::Fallback {
                fallback_id: mark.to_string(),
            },
            AnnotationOutcome::Skipped => JsOutcome::Skipped,
        }
    }
}

/// Outcomes of one annotation pass, in input order, plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsReport {
    pub outcomes: Vec<JsOutcome>,
    pub highlighted: usize,
    pub fallbacks: usize,
    pub skipped: usize,
}

impl From<&AnnotationReport> for JsReport {
    fn from(report: &AnnotationReport) -> Self {
        Self {
            outcomes: report.outcomes.iter().map(JsOutcome::from).collect(),
            highlighted: report.highlighted(),
            fallbacks: report.fallbacks(),
            skipped: report.skipped(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factmark_core::{FallbackId, MarkerId};

    #[test]
    fn test_issue_defaults() {
        let issue: Issue = JsIssue {
            claim: "coffee cures cancer".into(),
            severity: Some("HIGH".into()),
            reason: None,
            correction: None,
        }
        .into();
        assert_eq!(issue.severity, Severity::High);
        assert!(issue.reason.is_empty());

        let unknown: Issue = JsIssue {
            claim: "x".into(),
            severity: Some("catastrophic".into()),
            reason: None,
            correction: None,
        }
        .into();
        assert_eq!(unknown.severity, Severity::Medium);
    }

    #[test]
    fn test_report_conversion() {
        let report = AnnotationReport {
            outcomes: vec![
                AnnotationOutcome::Highlighted {
                    marker: MarkerId(1),
                    strategy: MatchStrategy::MajorityWords,
                    region: 0,
                },
                AnnotationOutcome::Fallback { mark: FallbackId(2) },
                AnnotationOutcome::Skipped,
            ],
        };
        let js = JsReport::from(&report);
        assert_eq!((js.highlighted, js.fallbacks, js.skipped), (1, 1, 1));
        assert_eq!(
            js.outcomes[0],
            JsOutcome::Highlighted {
                marker_id: "m1".into(),
                strategy: "majorityWords".into(),
                region: 0,
            }
        );
        assert_eq!(js.outcomes[1], JsOutcome::Fallback { fallback_id: "f2".into() });
    }
}
