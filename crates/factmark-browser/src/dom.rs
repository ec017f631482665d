//! `AnnotationDom` over the live browser document.

use std::cell::RefCell;

use factmark_core::{
    AnnotationDom, DomError, ListenerTarget, NodeKind, Rect, UiEvent, UiEventKind, Viewport,
};
use gloo_events::EventListener;
use smol_str::SmolStr;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Node, Window};

use crate::dispatch::Dispatcher;

fn js_error(op: &'static str) -> impl Fn(JsValue) -> DomError {
    move |err| {
        let message = err
            .dyn_ref::<js_sys::Error>()
            .map(|e| String::from(e.message()))
            .or_else(|| err.as_string())
            .unwrap_or_else(|| format!("{err:?}"));
        DomError::new(op, message)
    }
}

fn as_element<'a>(node: &'a Node, op: &'static str) -> Result<&'a Element, DomError> {
    node.dyn_ref::<Element>()
        .ok_or_else(|| DomError::new(op, "not an element"))
}

fn as_html_element<'a>(node: &'a Node, op: &'static str) -> Result<&'a HtmlElement, DomError> {
    node.dyn_ref::<HtmlElement>()
        .ok_or_else(|| DomError::new(op, "not an html element"))
}

pub struct BrowserDom {
    window: Window,
    document: Document,
    dispatcher: Dispatcher,
    /// Live listeners per node. Dropping an `EventListener` removes it.
    listeners: RefCell<Vec<(Node, Vec<EventListener>)>>,
}

impl BrowserDom {
    pub fn new(window: Window, dispatcher: Dispatcher) -> Result<Self, DomError> {
        let document = window
            .document()
            .ok_or_else(|| DomError::new("document", "window has no document"))?;
        Ok(Self {
            window,
            document,
            dispatcher,
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Number of nodes that currently carry engine listeners.
    pub fn listened_nodes(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl AnnotationDom for BrowserDom {
    type Node = Node;

    fn body(&self) -> Option<Node> {
        self.document.body().map(Into::into)
    }

    fn head(&self) -> Option<Node> {
        self.document.head().map(Into::into)
    }

    fn kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::ELEMENT_NODE => NodeKind::Element,
            Node::TEXT_NODE => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self, node: &Node) -> Option<SmolStr> {
        node.dyn_ref::<Element>()
            .map(|el| SmolStr::new(el.local_name().to_ascii_lowercase()))
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<(), DomError> {
        as_element(node, "set_attribute")?
            .set_attribute(name, value)
            .map_err(js_error("set_attribute"))
    }

    fn remove_attribute(&self, node: &Node, name: &str) -> Result<(), DomError> {
        as_element(node, "remove_attribute")?
            .remove_attribute(name)
            .map_err(js_error("remove_attribute"))
    }

    fn has_class(&self, node: &Node, class: &str) -> bool {
        node.dyn_ref::<Element>()
            .is_some_and(|el| el.class_list().contains(class))
    }

    fn add_class(&self, node: &Node, class: &str) -> Result<(), DomError> {
        as_element(node, "add_class")?
            .class_list()
            .add_1(class)
            .map_err(js_error("add_class"))
    }

    fn remove_class(&self, node: &Node, class: &str) -> Result<(), DomError> {
        as_element(node, "remove_class")?
            .class_list()
            .remove_1(class)
            .map_err(js_error("remove_class"))
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn text_content(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }

    fn element_by_id(&self, id: &str) -> Option<Node> {
        self.document.get_element_by_id(id).map(Into::into)
    }

    fn create_element(&self, tag: &str) -> Result<Node, DomError> {
        self.document
            .create_element(tag)
            .map(Into::into)
            .map_err(js_error("create_element"))
    }

    fn create_text(&self, data: &str) -> Result<Node, DomError> {
        Ok(self.document.create_text_node(data).into())
    }

    fn append_child(&self, parent: &Node, child: &Node) -> Result<(), DomError> {
        parent
            .append_child(child)
            .map(|_| ())
            .map_err(js_error("append_child"))
    }

    fn replace_child(&self, parent: &Node, new_child: &Node, old_child: &Node) -> Result<(), DomError> {
        parent
            .replace_child(new_child, old_child)
            .map(|_| ())
            .map_err(js_error("replace_child"))
    }

    fn remove(&self, node: &Node) -> Result<(), DomError> {
        let Some(parent) = node.parent_node() else {
            return Ok(());
        };
        parent
            .remove_child(node)
            .map(|_| ())
            .map_err(js_error("remove"))
    }

    fn style_property(&self, node: &Node, property: &str) -> String {
        node.dyn_ref::<HtmlElement>()
            .and_then(|el| el.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style_property(&self, node: &Node, property: &str, value: &str) -> Result<(), DomError> {
        as_html_element(node, "set_style_property")?
            .style()
            .set_property(property, value)
            .map_err(js_error("set_style_property"))
    }

    fn remove_style_property(&self, node: &Node, property: &str) -> Result<(), DomError> {
        as_html_element(node, "remove_style_property")?
            .style()
            .remove_property(property)
            .map(|_| ())
            .map_err(js_error("remove_style_property"))
    }

    fn bounding_rect(&self, node: &Node) -> Rect {
        node.dyn_ref::<Element>()
            .map(|el| {
                let r = el.get_bounding_client_rect();
                Rect::new(r.x(), r.y(), r.width(), r.height())
            })
            .unwrap_or_default()
    }

    fn viewport(&self) -> Viewport {
        let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
        let defaults = Viewport::default();
        Viewport {
            width: dimension(self.window.inner_width()).unwrap_or(defaults.width),
            height: dimension(self.window.inner_height()).unwrap_or(defaults.height),
            scroll_x: self.window.scroll_x().unwrap_or(0.0),
            scroll_y: self.window.scroll_y().unwrap_or(0.0),
        }
    }

    fn is_connected(&self, node: &Node) -> bool {
        node.is_connected()
    }

    fn listen(&self, node: &Node, target: ListenerTarget, kinds: &[UiEventKind]) -> Result<(), DomError> {
        let added: Vec<EventListener> = kinds
            .iter()
            .map(|&kind| {
                let dispatcher = self.dispatcher.clone();
                EventListener::new(node, kind.dom_event_name(), move |_event| {
                    dispatcher.event(UiEvent::new(target, kind));
                })
            })
            .collect();

        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter_mut().find(|(n, _)| n == node) {
            Some((_, existing)) => existing.extend(added),
            None => listeners.push((node.clone(), added)),
        }
        Ok(())
    }

    fn unlisten(&self, node: &Node) {
        // Take the listeners out before dropping them.
        let removed: Vec<_> = {
            let mut listeners = self.listeners.borrow_mut();
            let (removed, kept) = std::mem::take(&mut *listeners)
                .into_iter()
                .partition(|(n, _)| n == node);
            *listeners = kept;
            removed
        };
        drop(removed);
    }
}
