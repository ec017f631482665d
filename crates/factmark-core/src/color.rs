//! Severity palette and CSS color helpers.

use crate::types::Severity;

/// Convert RGBA u32 (packed as 0xRRGGBBAA) to CSS rgba() string.
pub fn rgba_u32_to_css(color: u32) -> String {
    let (r, g, b) = channels(color);
    let a = (color & 0xFF) as f32 / 255.0;
    format!("rgba({}, {}, {}, {})", r, g, b, a)
}

/// Convert RGBA u32 to CSS rgba() string with a custom alpha value.
///
/// Used for the translucent highlight tints.
pub fn rgba_u32_to_css_alpha(color: u32, alpha: f32) -> String {
    let (r, g, b) = channels(color);
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}

fn channels(color: u32) -> (u32, u32, u32) {
    ((color >> 24) & 0xFF, (color >> 16) & 0xFF, (color >> 8) & 0xFF)
}

impl Severity {
    /// Opaque accent color: underline, badge, tooltip border.
    pub fn accent(self) -> u32 {
        match self {
            Severity::Low => 0xF5A623FF,
            Severity::Medium => 0xF26B1DFF,
            Severity::High => 0xD0021BFF,
        }
    }

    /// Background tint behind highlighted text.
    pub fn tint_css(self) -> String {
        rgba_u32_to_css_alpha(self.accent(), 0.18)
    }

    pub fn accent_css(self) -> String {
        rgba_u32_to_css(self.accent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_to_css() {
        assert_eq!(rgba_u32_to_css(0xFF0000FF), "rgba(255, 0, 0, 1)");
        assert_eq!(rgba_u32_to_css(0x0000FF00), "rgba(0, 0, 255, 0)");
    }

    #[test]
    fn test_severity_tint() {
        assert_eq!(Severity::High.tint_css(), "rgba(208, 2, 27, 0.18)");
        assert_eq!(Severity::High.accent_css(), "rgba(208, 2, 27, 1)");
    }
}
