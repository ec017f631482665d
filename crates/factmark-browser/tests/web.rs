//! WASM browser tests for factmark-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use factmark_browser::{
    AnnotationOutcome, AnnotatorConfig, BrowserAnnotator, HIGHLIGHT_CLASS, Issue, STYLE_ELEMENT_ID,
    Severity, TOOLTIP_CLASS, TooltipState,
};

const COFFEE_PAGE: &str =
    "<article><p>Studies show that drinking coffee cures cancer in most adults.</p></article>";

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Mount a fixture under the body. Remove it with `unmount`.
fn mount(html: &str) -> web_sys::Element {
    let doc = document();
    let container = doc.create_element("div").unwrap();
    container.set_inner_html(html);
    doc.body().unwrap().append_child(&container).unwrap();
    container
}

fn unmount(container: web_sys::Element) {
    container.remove();
}

fn coffee() -> Issue {
    Issue::new(
        "drinking coffee cures cancer",
        Severity::High,
        "No clinical evidence supports this.",
        "Coffee has not been shown to cure cancer.",
    )
}

fn dispatch(element: &web_sys::Element, event: &str) {
    let event = web_sys::Event::new(event).unwrap();
    element.dispatch_event(&event).unwrap();
}

fn query(selector: &str) -> Option<web_sys::Element> {
    document().query_selector(selector).unwrap()
}

// === Highlighting ===

#[wasm_bindgen_test]
fn test_annotate_wraps_exact_claim() {
    let container = mount(COFFEE_PAGE);
    let before = container.inner_html();
    let annotator = BrowserAnnotator::new(AnnotatorConfig::default()).unwrap();

    let report = annotator.annotate_now(&[coffee()]);
    assert!(matches!(report.outcomes[0], AnnotationOutcome::Highlighted { .. }));
    let marker = container
        .query_selector(&format!(".{HIGHLIGHT_CLASS}.severity-high"))
        .unwrap()
        .expect("marker span");
    assert_eq!(marker.get_attribute("data-factmark-id").as_deref(), Some("m1"));
    assert!(document().get_element_by_id(STYLE_ELEMENT_ID).is_some());
    assert_eq!(annotator.with_session(|s| s.dom().listened_nodes()), 1);

    annotator.cleanup();
    assert_eq!(container.inner_html(), before);
    assert!(document().get_element_by_id(STYLE_ELEMENT_ID).is_none());
    assert_eq!(annotator.with_session(|s| s.dom().listened_nodes()), 0);
    unmount(container);
}

#[wasm_bindgen_test]
fn test_paraphrase_uses_fallback() {
    let container = mount(
        "<article><p>Studio staging of the 1969 lunar mission has long been a conspiracy theory.</p></article>",
    );
    let annotator = BrowserAnnotator::new(AnnotatorConfig::default()).unwrap();
    let issue = Issue::new("the moon landing was staged in a studio", Severity::Medium, "", "");

    let report = annotator.annotate_now(&[issue]);
    assert!(matches!(report.outcomes[0], AnnotationOutcome::Fallback { .. }));
    // First qualifying block in document order: the fixture container itself.
    let marked = query("[data-factmark-fallback]").expect("fallback element");
    assert!(marked.text_content().unwrap().contains("lunar mission"));

    annotator.cleanup();
    assert!(!marked.has_attribute("data-factmark-fallback"));
    let style = marked.dyn_ref::<web_sys::HtmlElement>().unwrap().style();
    assert_eq!(style.get_property_value("background-color").unwrap(), "");
    unmount(container);
}

// === Tooltip ===

#[wasm_bindgen_test]
fn test_hover_shows_single_tooltip() {
    let container = mount(COFFEE_PAGE);
    let annotator = BrowserAnnotator::new(AnnotatorConfig::default()).unwrap();
    annotator.annotate_now(&[coffee()]);
    let marker = container
        .query_selector(&format!(".{HIGHLIGHT_CLASS}"))
        .unwrap()
        .unwrap();

    dispatch(&marker, "mouseenter");
    dispatch(&marker, "mouseleave");
    dispatch(&marker, "mouseenter");

    let tooltips = document()
        .query_selector_all(&format!(".{TOOLTIP_CLASS}"))
        .unwrap();
    assert_eq!(tooltips.length(), 1);
    let tooltip = query(&format!(".{TOOLTIP_CLASS}")).unwrap();
    assert!(tooltip.text_content().unwrap().contains("No clinical evidence supports this."));
    assert_eq!(annotator.with_session(|s| s.tooltip_state()), TooltipState::Showing);

    annotator.cleanup();
    assert!(query(&format!(".{TOOLTIP_CLASS}")).is_none());
    unmount(container);
}

#[wasm_bindgen_test]
fn test_report_button_invokes_callback() {
    let container = mount(COFFEE_PAGE);
    let annotator = BrowserAnnotator::new(AnnotatorConfig::default()).unwrap();
    annotator.annotate_now(&[coffee()]);

    let calls: Rc<RefCell<Vec<JsValue>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = calls.clone();
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
        sink.borrow_mut().push(value);
    });
    annotator.set_report_callback(Some(callback.as_ref().unchecked_ref::<js_sys::Function>().clone()));

    let marker = container
        .query_selector(&format!(".{HIGHLIGHT_CLASS}"))
        .unwrap()
        .unwrap();
    dispatch(&marker, "mouseenter");
    let button = query(".factmark-report")
        .unwrap()
        .dyn_into::<web_sys::HtmlElement>()
        .unwrap();
    button.click();

    assert_eq!(calls.borrow().len(), 1);
    let issue = js_sys::Reflect::get(&calls.borrow()[0], &"issue".into()).unwrap();
    let claim = js_sys::Reflect::get(&issue, &"claim".into()).unwrap();
    assert_eq!(claim.as_string().as_deref(), Some("drinking coffee cures cancer"));
    assert!(query(&format!(".{TOOLTIP_CLASS}")).is_none());

    drop(annotator);
    unmount(container);
}

#[wasm_bindgen_test]
fn test_drop_reverts_page() {
    let container = mount(COFFEE_PAGE);
    let before = container.inner_html();
    {
        let annotator = BrowserAnnotator::new(AnnotatorConfig::default()).unwrap();
        annotator.annotate_now(&[coffee()]);
        assert_ne!(container.inner_html(), before);
    }
    assert_eq!(container.inner_html(), before);
    unmount(container);
}
