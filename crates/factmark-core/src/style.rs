//! Style injector: one stylesheet per document for highlights and tooltip.

use crate::color::rgba_u32_to_css_alpha;
use crate::highlight::HIGHLIGHT_CLASS;
use crate::platform::AnnotationDom;
use crate::tooltip::{REPORT_BUTTON_CLASS, TOOLTIP_CLASS, TOOLTIP_VISIBLE_CLASS};
use crate::types::Severity;

/// Id of the injected `<style>` element.
pub const STYLE_ELEMENT_ID: &str = "factmark-styles";

const SEVERITIES: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

fn severity_rules(severity: Severity) -> String {
    let class = severity.class_name();
    let accent = severity.accent_css();
    format!(
        r#".{hl}.{class} {{
    background-color: {tint};
    text-decoration: underline wavy {accent};
    text-underline-offset: 3px;
}}
.{hl}.{class}:hover {{
    background-color: {hover};
}}
.{tip}.{class} {{
    border-top: 3px solid {accent};
}}
.factmark-badge.{class} {{
    background-color: {accent};
}}
"#,
        hl = HIGHLIGHT_CLASS,
        tip = TOOLTIP_CLASS,
        tint = severity.tint_css(),
        hover = rgba_u32_to_css_alpha(severity.accent(), 0.32),
    )
}

/// The full stylesheet text.
pub fn stylesheet() -> String {
    let mut css = format!(
        r#"/* factmark annotations */
.{hl} {{
    cursor: help;
    border-radius: 2px;
    transition: background-color 0.15s ease;
}}
.{tip} {{
    position: absolute;
    z-index: 2147483647;
    box-sizing: border-box;
    padding: 12px 14px;
    background: #ffffff;
    color: #1f2328;
    border-radius: 6px;
    box-shadow: 0 6px 24px rgba(0, 0, 0, 0.18);
    font: 14px/1.45 system-ui, -apple-system, "Segoe UI", sans-serif;
    opacity: 0;
    transition: opacity 0.2s ease;
    pointer-events: auto;
}}
.{tip}.{visible} {{
    opacity: 1;
}}
.{tip} .factmark-arrow {{
    position: absolute;
    left: var(--factmark-arrow-left, 50%);
    width: 10px;
    height: 10px;
    margin-left: -5px;
    background: inherit;
    transform: rotate(45deg);
}}
.{tip}.factmark-below .factmark-arrow {{
    top: -5px;
}}
.{tip}.factmark-above .factmark-arrow {{
    bottom: -5px;
}}
.{tip} .factmark-badge {{
    display: inline-block;
    padding: 2px 8px;
    border-radius: 999px;
    color: #ffffff;
    font-size: 12px;
    font-weight: 600;
}}
.{tip} .factmark-section {{
    margin-top: 8px;
}}
.{tip} .factmark-section p {{
    margin: 2px 0 0;
}}
.{tip} .{report} {{
    margin-top: 10px;
    padding: 4px 10px;
    border: 1px solid #d0d7de;
    border-radius: 4px;
    background: #f6f8fa;
    font: inherit;
    cursor: pointer;
}}
"#,
        hl = HIGHLIGHT_CLASS,
        tip = TOOLTIP_CLASS,
        visible = TOOLTIP_VISIBLE_CLASS,
        report = REPORT_BUTTON_CLASS,
    );
    for severity in SEVERITIES {
        css.push_str(&severity_rules(severity));
    }
    css
}

/// Inserts the stylesheet at most once per document.
#[derive(Debug, Default)]
pub struct StyleInjector {
    injected: bool,
}

impl StyleInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_injected(&self) -> bool {
        self.injected
    }

    /// Insert the stylesheet into the head, or the body when there is none.
    ///
    /// Failures are logged and leave highlights unstyled.
    pub fn ensure<D: AnnotationDom + ?Sized>(&mut self, dom: &D) {
        if self.injected {
            return;
        }
        if dom.element_by_id(STYLE_ELEMENT_ID).is_some() {
            // A previous session on this page left it in place.
            self.injected = true;
            return;
        }
        let Some(parent) = dom.head().or_else(|| dom.body()) else {
            tracing::warn!(target: "factmark::style", "no head or body to attach styles to");
            return;
        };
        let result = dom.create_element("style").and_then(|style| {
            dom.set_attribute(&style, "id", STYLE_ELEMENT_ID)?;
            let text = dom.create_text(&stylesheet())?;
            dom.append_child(&style, &text)?;
            dom.append_child(&parent, &style)
        });
        match result {
            Ok(()) => {
                self.injected = true;
                tracing::debug!(target: "factmark::style", "stylesheet injected");
            }
            Err(e) => tracing::debug!(target: "factmark::style", error = %e, "stylesheet not injected"),
        }
    }

    /// Remove the stylesheet so a later `ensure` inserts it again.
    pub fn remove<D: AnnotationDom + ?Sized>(&mut self, dom: &D) {
        if let Some(style) = dom.element_by_id(STYLE_ELEMENT_ID) {
            if let Err(e) = dom.remove(&style) {
                tracing::warn!(target: "factmark::style", error = %e, "failed to remove stylesheet");
            }
        }
        self.injected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;

    #[test]
    fn test_inject_once() {
        let dom = MemoryDom::new();
        let mut styles = StyleInjector::new();
        styles.ensure(&dom);
        styles.ensure(&dom);

        let style = dom.element_by_id(STYLE_ELEMENT_ID).unwrap();
        assert_eq!(dom.parent(&style), dom.head());
        assert_eq!(dom.count_with_tag("style"), 1);
    }

    #[test]
    fn test_existing_stylesheet_is_reused() {
        let dom = MemoryDom::new();
        StyleInjector::new().ensure(&dom);
        let mut second = StyleInjector::new();
        second.ensure(&dom);
        assert!(second.is_injected());
        assert_eq!(dom.count_with_tag("style"), 1);
    }

    #[test]
    fn test_falls_back_to_body_without_head() {
        let dom = MemoryDom::without_head();
        let mut styles = StyleInjector::new();
        styles.ensure(&dom);
        let style = dom.element_by_id(STYLE_ELEMENT_ID).unwrap();
        assert_eq!(dom.parent(&style), dom.body());
    }

    #[test]
    fn test_failure_is_silent() {
        let dom = MemoryDom::new();
        dom.fail_next_mutation();
        let mut styles = StyleInjector::new();
        styles.ensure(&dom);
        assert!(!styles.is_injected());
        assert!(dom.element_by_id(STYLE_ELEMENT_ID).is_none());

        styles.ensure(&dom);
        assert!(styles.is_injected());
    }

    #[test]
    fn test_remove_allows_reinjection() {
        let dom = MemoryDom::new();
        let mut styles = StyleInjector::new();
        styles.ensure(&dom);
        styles.remove(&dom);
        assert!(dom.element_by_id(STYLE_ELEMENT_ID).is_none());
        styles.ensure(&dom);
        assert!(dom.element_by_id(STYLE_ELEMENT_ID).is_some());
    }

    #[test]
    fn test_stylesheet_covers_every_severity() {
        let css = stylesheet();
        for severity in SEVERITIES {
            assert!(css.contains(&format!(".{}.{}", HIGHLIGHT_CLASS, severity.class_name())));
        }
        assert!(css.contains("rgba(208, 2, 27, 0.18)"));
    }
}
