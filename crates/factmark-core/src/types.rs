//! Core annotation types: issues, severities, identities and geometry.
//!
//! These types are platform-agnostic and shared by every DOM backend.

use serde::{Deserialize, Serialize};

/// Three-level ordinal classification driving color coding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    /// Lowercase name, as used in class names and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Class applied to markers and tooltips of this severity.
    pub fn class_name(self) -> &'static str {
        match self {
            Severity::Low => "severity-low",
            Severity::Medium => "severity-medium",
            Severity::High => "severity-high",
        }
    }

    /// Short label for the tooltip badge.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low risk",
            Severity::Medium => "Medium risk",
            Severity::High => "High risk",
        }
    }
}

impl From<&str> for Severity {
    /// Case-insensitive; anything unrecognized is treated as medium.
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "minor" => Severity::Low,
            "high" | "critical" | "severe" => Severity::High,
            _ => Severity::Medium,
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        Severity::from(s.as_str())
    }
}

impl From<Severity> for &'static str {
    fn from(s: Severity) -> Self {
        s.as_str()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flagged claim to locate and annotate in the page.
///
/// Supplied by the surrounding extension and immutable for the duration of
/// one annotation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Text fragment to locate. May not appear verbatim in the page.
    pub claim: String,
    #[serde(default)]
    pub severity: Severity,
    /// Why the claim was flagged.
    #[serde(default)]
    pub reason: String,
    /// Corrected information.
    #[serde(default)]
    pub correction: String,
}

impl Issue {
    pub fn new(
        claim: impl Into<String>,
        severity: Severity,
        reason: impl Into<String>,
        correction: impl Into<String>,
    ) -> Self {
        Self {
            claim: claim.into(),
            severity,
            reason: reason.into(),
            correction: correction.into(),
        }
    }
}

/// Identity of a wrapping highlight within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(pub u32);

/// Identity of a paragraph-level fallback highlight within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FallbackId(pub u32);

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "m{}", self.0)
    }
}

impl std::fmt::Display for FallbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Axis-aligned rectangle in CSS pixels, viewport-relative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Visible area of the page plus its scroll offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parsing() {
        assert_eq!(Severity::from("HIGH"), Severity::High);
        assert_eq!(Severity::from(" low "), Severity::Low);
        assert_eq!(Severity::from("critical"), Severity::High);
        assert_eq!(Severity::from("bogus"), Severity::Medium);
    }

    #[test]
    fn test_issue_deserialize_defaults() {
        let issue: Issue = serde_json::from_str(r#"{"claim":"x","severity":"High"}"#).unwrap();
        assert_eq!(issue.severity, Severity::High);
        assert!(issue.reason.is_empty());

        let issue: Issue = serde_json::from_str(r#"{"claim":"x"}"#).unwrap();
        assert_eq!(issue.severity, Severity::Medium);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::High).unwrap();
        assert_eq!(json, "\"high\"");
    }

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 30.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 50.0);
        assert_eq!(r.center_x(), 60.0);
    }
}
