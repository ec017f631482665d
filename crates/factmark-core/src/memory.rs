//! In-memory document, timers and host for headless runs and tests.
//!
//! `MemoryDom` is a small arena tree with enough DOM behavior for the
//! engine: ordered children, attributes, inline styles, listeners and
//! configurable geometry. It serializes to HTML so tests can compare a
//! subtree before and after a round of mutations.

use std::cell::{Cell, RefCell};

use smol_str::SmolStr;

use crate::config::AnnotatorConfig;
use crate::error::DomError;
use crate::platform::{
    AnnotationDom, HostBridge, ListenerTarget, NodeKind, PageInfo, ReportRequest, TimerPlatform,
    TimerToken, UiEventKind,
};
use crate::session::AnnotationSession;
use crate::types::{Rect, Size, Viewport};

/// Handle to a node in a [`MemoryDom`]. Only meaningful for the DOM that made it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemoryNode(usize);

#[derive(Debug)]
enum Data {
    Element {
        tag: SmolStr,
        attrs: Vec<(String, String)>,
        styles: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    data: Data,
    parent: Option<usize>,
    children: Vec<usize>,
    listeners: Vec<(ListenerTarget, UiEventKind)>,
    rect: Option<Rect>,
}

#[derive(Debug)]
enum Failure {
    Any,
    /// Fail the named operation after letting `skip` calls of it through.
    Op { name: &'static str, skip: usize },
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<NodeData>,
    root: usize,
    head: Option<usize>,
    body: usize,
}

impl Tree {
    fn push(&mut self, data: Data) -> usize {
        self.nodes.push(NodeData {
            data,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
            rect: None,
        });
        self.nodes.len() - 1
    }

    fn detach(&mut self, id: usize) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|&c| c != id);
        }
    }

    fn attach(&mut self, parent: usize, child: usize) {
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn is_connected(&self, mut id: usize) -> bool {
        loop {
            if id == self.root {
                return true;
            }
            match self.nodes[id].parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn attr(&self, id: usize, name: &str) -> Option<&str> {
        match &self.nodes[id].data {
            Data::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            Data::Text(_) => None,
        }
    }

    fn has_class(&self, id: usize, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|v| v.split_whitespace().any(|c| c == class))
    }

    fn descendants(&self, id: usize, out: &mut Vec<usize>) {
        for &child in &self.nodes[id].children {
            out.push(child);
            self.descendants(child, out);
        }
    }

    fn text(&self, id: usize, out: &mut String) {
        match &self.nodes[id].data {
            Data::Text(data) => out.push_str(data),
            Data::Element { .. } => {
                for &child in &self.nodes[id].children {
                    self.text(child, out);
                }
            }
        }
    }

    fn serialize(&self, id: usize, out: &mut String) {
        match &self.nodes[id].data {
            Data::Text(data) => escape_into(data, false, out),
            Data::Element { tag, attrs, styles } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                if !styles.is_empty() {
                    out.push_str(" style=\"");
                    escape_into(&style_text(styles), true, out);
                    out.push('"');
                }
                out.push('>');
                for &child in &self.nodes[id].children {
                    self.serialize(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn style_text(styles: &[(String, String)]) -> String {
    styles
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn parse_style(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let (k, v) = (k.trim(), v.trim());
            (!k.is_empty()).then(|| (k.to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}

/// Arena-backed document: `<html>` with an optional `<head>` and a `<body>`.
#[derive(Debug)]
pub struct MemoryDom {
    tree: RefCell<Tree>,
    failure: RefCell<Option<Failure>>,
    class_sizes: RefCell<Vec<(String, Size)>>,
    viewport: Cell<Viewport>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::build(true)
    }

    /// A document whose `<html>` has no `<head>`.
    pub fn without_head() -> Self {
        Self::build(false)
    }

    fn build(with_head: bool) -> Self {
        let element = |tag: &str| Data::Element {
            tag: SmolStr::new(tag),
            attrs: Vec::new(),
            styles: Vec::new(),
        };
        let mut tree = Tree {
            nodes: Vec::new(),
            root: 0,
            head: None,
            body: 0,
        };
        tree.root = tree.push(element("html"));
        if with_head {
            let head = tree.push(element("head"));
            tree.attach(tree.root, head);
            tree.head = Some(head);
        }
        tree.body = tree.push(element("body"));
        tree.attach(tree.root, tree.body);

        Self {
            tree: RefCell::new(tree),
            failure: RefCell::new(None),
            class_sizes: RefCell::new(Vec::new()),
            viewport: Cell::new(Viewport::default()),
        }
    }

    pub fn root_node(&self) -> MemoryNode {
        MemoryNode(self.tree.borrow().root)
    }

    pub fn body_node(&self) -> MemoryNode {
        MemoryNode(self.tree.borrow().body)
    }

    /// Append a new element under `parent`.
    pub fn element(&self, parent: &MemoryNode, tag: &str) -> MemoryNode {
        self.element_with(parent, tag, &[])
    }

    pub fn element_with(&self, parent: &MemoryNode, tag: &str, attrs: &[(&str, &str)]) -> MemoryNode {
        let mut tree = self.tree.borrow_mut();
        let id = tree.push(Data::Element {
            tag: SmolStr::new(tag.to_ascii_lowercase()),
            attrs: Vec::new(),
            styles: Vec::new(),
        });
        drop(tree);
        for (name, value) in attrs {
            self.write_attribute(id, name, value);
        }
        self.tree.borrow_mut().attach(parent.0, id);
        MemoryNode(id)
    }

    /// Append a new text node under `parent`.
    pub fn text(&self, parent: &MemoryNode, data: &str) -> MemoryNode {
        let mut tree = self.tree.borrow_mut();
        let id = tree.push(Data::Text(data.to_string()));
        tree.attach(parent.0, id);
        MemoryNode(id)
    }

    /// Outer HTML of a node, with inline styles serialized as a `style` attribute.
    pub fn to_html(&self, node: &MemoryNode) -> String {
        let mut out = String::new();
        self.tree.borrow().serialize(node.0, &mut out);
        out
    }

    pub fn document_html(&self) -> String {
        self.to_html(&self.root_node())
    }

    /// Make the next fallible operation of any kind fail.
    pub fn fail_next_mutation(&self) {
        *self.failure.borrow_mut() = Some(Failure::Any);
    }

    /// Make the next call of the named operation fail, e.g. `"replace_child"`.
    pub fn fail_next(&self, op: &'static str) {
        self.fail_after(op, 0);
    }

    /// Let `skip` calls of the named operation succeed, then fail the next one.
    pub fn fail_after(&self, op: &'static str, skip: usize) {
        *self.failure.borrow_mut() = Some(Failure::Op { name: op, skip });
    }

    fn check(&self, op: &'static str) -> Result<(), DomError> {
        let mut failure = self.failure.borrow_mut();
        let hit = match &mut *failure {
            Some(Failure::Any) => true,
            Some(Failure::Op { name, skip }) if *name == op => {
                if *skip > 0 {
                    *skip -= 1;
                    false
                } else {
                    true
                }
            }
            Some(Failure::Op { .. }) => false,
            None => false,
        };
        if hit {
            *failure = None;
            return Err(DomError::new(op, "injected failure"));
        }
        Ok(())
    }

    pub fn listeners(&self, node: &MemoryNode) -> Vec<(ListenerTarget, UiEventKind)> {
        self.tree.borrow().nodes[node.0].listeners.clone()
    }

    /// Listener registrations across every node, attached or not.
    pub fn listener_count(&self) -> usize {
        self.tree.borrow().nodes.iter().map(|n| n.listeners.len()).sum()
    }

    fn connected_matching(&self, pred: impl Fn(&Tree, usize) -> bool) -> usize {
        let tree = self.tree.borrow();
        let mut all = Vec::new();
        tree.descendants(tree.root, &mut all);
        all.into_iter().filter(|&id| pred(&*tree, id)).count()
    }

    /// Number of attached elements carrying `class`.
    pub fn count_with_class(&self, class: &str) -> usize {
        self.connected_matching(|tree, id| tree.has_class(id, class))
    }

    pub fn count_with_tag(&self, tag: &str) -> usize {
        self.connected_matching(|tree, id| {
            matches!(&tree.nodes[id].data, Data::Element { tag: t, .. } if t == tag)
        })
    }

    /// Number of descendants of `node` carrying `class`.
    pub fn count_with_class_under(&self, node: &MemoryNode, class: &str) -> usize {
        let tree = self.tree.borrow();
        let mut all = Vec::new();
        tree.descendants(node.0, &mut all);
        all.into_iter().filter(|&id| tree.has_class(id, class)).count()
    }

    pub fn set_rect(&self, node: &MemoryNode, rect: Rect) {
        self.tree.borrow_mut().nodes[node.0].rect = Some(rect);
    }

    /// Size reported for elements with `class` that have no explicit rect.
    pub fn set_class_size(&self, class: &str, size: Size) {
        let mut sizes = self.class_sizes.borrow_mut();
        sizes.retain(|(c, _)| c != class);
        sizes.push((class.to_string(), size));
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }

    fn write_attribute(&self, id: usize, name: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        let Data::Element { attrs, styles, .. } = &mut tree.nodes[id].data else {
            return;
        };
        if name == "style" {
            *styles = parse_style(value);
            return;
        }
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn element_data<R>(
        &self,
        node: &MemoryNode,
        op: &'static str,
        f: impl FnOnce(&mut Vec<(String, String)>, &mut Vec<(String, String)>) -> R,
    ) -> Result<R, DomError> {
        let mut tree = self.tree.borrow_mut();
        match &mut tree.nodes[node.0].data {
            Data::Element { attrs, styles, .. } => Ok(f(attrs, styles)),
            Data::Text(_) => Err(DomError::new(op, "not an element")),
        }
    }
}

impl AnnotationDom for MemoryDom {
    type Node = MemoryNode;

    fn body(&self) -> Option<MemoryNode> {
        Some(self.body_node())
    }

    fn head(&self) -> Option<MemoryNode> {
        self.tree.borrow().head.map(MemoryNode)
    }

    fn kind(&self, node: &MemoryNode) -> NodeKind {
        match self.tree.borrow().nodes[node.0].data {
            Data::Element { .. } => NodeKind::Element,
            Data::Text(_) => NodeKind::Text,
        }
    }

    fn tag_name(&self, node: &MemoryNode) -> Option<SmolStr> {
        match &self.tree.borrow().nodes[node.0].data {
            Data::Element { tag, .. } => Some(tag.clone()),
            Data::Text(_) => None,
        }
    }

    fn attribute(&self, node: &MemoryNode, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        if name == "style" {
            if let Data::Element { styles, .. } = &tree.nodes[node.0].data {
                return (!styles.is_empty()).then(|| style_text(styles));
            }
        }
        tree.attr(node.0, name).map(str::to_string)
    }

    fn set_attribute(&self, node: &MemoryNode, name: &str, value: &str) -> Result<(), DomError> {
        self.check("set_attribute")?;
        self.element_data(node, "set_attribute", |_, _| ())?;
        self.write_attribute(node.0, name, value);
        Ok(())
    }

    fn remove_attribute(&self, node: &MemoryNode, name: &str) -> Result<(), DomError> {
        self.check("remove_attribute")?;
        self.element_data(node, "remove_attribute", |attrs, styles| {
            if name == "style" {
                styles.clear();
            }
            attrs.retain(|(k, _)| k != name);
        })
    }

    fn has_class(&self, node: &MemoryNode, class: &str) -> bool {
        self.tree.borrow().has_class(node.0, class)
    }

    fn add_class(&self, node: &MemoryNode, class: &str) -> Result<(), DomError> {
        self.check("add_class")?;
        self.element_data(node, "add_class", |attrs, _| {
            match attrs.iter_mut().find(|(k, _)| k == "class") {
                Some((_, value)) => {
                    if !value.split_whitespace().any(|c| c == class) {
                        if !value.is_empty() {
                            value.push(' ');
                        }
                        value.push_str(class);
                    }
                }
                None => attrs.push(("class".to_string(), class.to_string())),
            }
        })
    }

    fn remove_class(&self, node: &MemoryNode, class: &str) -> Result<(), DomError> {
        self.check("remove_class")?;
        self.element_data(node, "remove_class", |attrs, _| {
            if let Some((_, value)) = attrs.iter_mut().find(|(k, _)| k == "class") {
                *value = value
                    .split_whitespace()
                    .filter(|c| *c != class)
                    .collect::<Vec<_>>()
                    .join(" ");
            }
            attrs.retain(|(k, v)| k != "class" || !v.is_empty());
        })
    }

    fn children(&self, node: &MemoryNode) -> Vec<MemoryNode> {
        self.tree.borrow().nodes[node.0]
            .children
            .iter()
            .map(|&c| MemoryNode(c))
            .collect()
    }

    fn parent(&self, node: &MemoryNode) -> Option<MemoryNode> {
        self.tree.borrow().nodes[node.0].parent.map(MemoryNode)
    }

    fn text_content(&self, node: &MemoryNode) -> String {
        let mut out = String::new();
        self.tree.borrow().text(node.0, &mut out);
        out
    }

    fn element_by_id(&self, id: &str) -> Option<MemoryNode> {
        let tree = self.tree.borrow();
        let mut all = Vec::new();
        tree.descendants(tree.root, &mut all);
        all.into_iter()
            .find(|&n| tree.attr(n, "id") == Some(id))
            .map(MemoryNode)
    }

    fn create_element(&self, tag: &str) -> Result<MemoryNode, DomError> {
        self.check("create_element")?;
        let id = self.tree.borrow_mut().push(Data::Element {
            tag: SmolStr::new(tag.to_ascii_lowercase()),
            attrs: Vec::new(),
            styles: Vec::new(),
        });
        Ok(MemoryNode(id))
    }

    fn create_text(&self, data: &str) -> Result<MemoryNode, DomError> {
        self.check("create_text")?;
        let id = self.tree.borrow_mut().push(Data::Text(data.to_string()));
        Ok(MemoryNode(id))
    }

    fn append_child(&self, parent: &MemoryNode, child: &MemoryNode) -> Result<(), DomError> {
        self.check("append_child")?;
        if self.kind(parent) != NodeKind::Element {
            return Err(DomError::new("append_child", "parent is not an element"));
        }
        self.tree.borrow_mut().attach(parent.0, child.0);
        Ok(())
    }

    fn replace_child(
        &self,
        parent: &MemoryNode,
        new_child: &MemoryNode,
        old_child: &MemoryNode,
    ) -> Result<(), DomError> {
        self.check("replace_child")?;
        let mut tree = self.tree.borrow_mut();
        if tree.nodes[old_child.0].parent != Some(parent.0) {
            return Err(DomError::new("replace_child", "old child is not a child of parent"));
        }
        tree.detach(new_child.0);
        let children = &mut tree.nodes[parent.0].children;
        let Some(index) = children.iter().position(|&c| c == old_child.0) else {
            return Err(DomError::new("replace_child", "old child is not a child of parent"));
        };
        children[index] = new_child.0;
        tree.nodes[new_child.0].parent = Some(parent.0);
        tree.nodes[old_child.0].parent = None;
        Ok(())
    }

    fn remove(&self, node: &MemoryNode) -> Result<(), DomError> {
        self.check("remove")?;
        self.tree.borrow_mut().detach(node.0);
        Ok(())
    }

    fn style_property(&self, node: &MemoryNode, property: &str) -> String {
        match &self.tree.borrow().nodes[node.0].data {
            Data::Element { styles, .. } => styles
                .iter()
                .find(|(k, _)| k == property)
                .map(|(_, v)| v.clone())
                .unwrap_or_default(),
            Data::Text(_) => String::new(),
        }
    }

    fn set_style_property(&self, node: &MemoryNode, property: &str, value: &str) -> Result<(), DomError> {
        self.check("set_style_property")?;
        self.element_data(node, "set_style_property", |_, styles| {
            match styles.iter_mut().find(|(k, _)| k == property) {
                Some((_, v)) => *v = value.to_string(),
                None => styles.push((property.to_string(), value.to_string())),
            }
        })
    }

    fn remove_style_property(&self, node: &MemoryNode, property: &str) -> Result<(), DomError> {
        self.check("remove_style_property")?;
        self.element_data(node, "remove_style_property", |_, styles| {
            styles.retain(|(k, _)| k != property);
        })
    }

    fn bounding_rect(&self, node: &MemoryNode) -> Rect {
        if let Some(rect) = self.tree.borrow().nodes[node.0].rect {
            return rect;
        }
        self.class_sizes
            .borrow()
            .iter()
            .find(|(class, _)| self.has_class(node, class))
            .map(|(_, size)| Rect::new(0.0, 0.0, size.width, size.height))
            .unwrap_or_default()
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn is_connected(&self, node: &MemoryNode) -> bool {
        self.tree.borrow().is_connected(node.0)
    }

    fn listen(&self, node: &MemoryNode, target: ListenerTarget, kinds: &[UiEventKind]) -> Result<(), DomError> {
        self.check("listen")?;
        let mut tree = self.tree.borrow_mut();
        tree.nodes[node.0]
            .listeners
            .extend(kinds.iter().map(|&kind| (target, kind)));
        Ok(())
    }

    fn unlisten(&self, node: &MemoryNode) {
        self.tree.borrow_mut().nodes[node.0].listeners.clear();
    }
}

/// Timers driven by an explicit clock.
#[derive(Debug, Default)]
pub struct ManualTimers {
    now: Cell<u64>,
    pending: RefCell<Vec<(u64, TimerToken)>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn pending_tokens(&self) -> Vec<TimerToken> {
        self.pending.borrow().iter().map(|(_, t)| *t).collect()
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its due time. Ties fire in arming order.
    pub fn pop_due(&self, until: u64) -> Option<TimerToken> {
        let mut pending = self.pending.borrow_mut();
        let (index, &(due, token)) = pending
            .iter()
            .enumerate()
            .filter(|(_, (due, _))| *due <= until)
            .min_by_key(|(i, (due, _))| (*due, *i))?;
        pending.remove(index);
        self.now.set(due.max(self.now.get()));
        Some(token)
    }

    /// Advance the clock by `ms`, handing every due token to `fire` in order.
    /// Timers armed by `fire` run in the same call if they fall due in time.
    pub fn run_for(&self, ms: u32, mut fire: impl FnMut(TimerToken)) {
        let until = self.now.get() + u64::from(ms);
        while let Some(token) = self.pop_due(until) {
            fire(token);
        }
        self.now.set(until);
    }
}

impl TimerPlatform for ManualTimers {
    fn set_timeout(&self, token: TimerToken, delay_ms: u32) {
        let due = self.now.get() + u64::from(delay_ms);
        self.pending.borrow_mut().push((due, token));
    }

    fn clear_timeout(&self, token: TimerToken) {
        self.pending.borrow_mut().retain(|(_, t)| *t != token);
    }
}

/// Host that records report hand-offs and dialogs.
#[derive(Debug)]
pub struct RecordingHost {
    page: PageInfo,
    reports: RefCell<Vec<ReportRequest>>,
    dialogs: RefCell<Vec<String>>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new(PageInfo {
            url: "https://example.com/article".to_string(),
            title: "Example article".to_string(),
        })
    }
}

impl RecordingHost {
    pub fn new(page: PageInfo) -> Self {
        Self {
            page,
            reports: RefCell::new(Vec::new()),
            dialogs: RefCell::new(Vec::new()),
        }
    }

    pub fn reports(&self) -> Vec<ReportRequest> {
        self.reports.borrow().clone()
    }

    pub fn dialogs(&self) -> Vec<String> {
        self.dialogs.borrow().clone()
    }
}

impl HostBridge for RecordingHost {
    fn page_info(&self) -> PageInfo {
        self.page.clone()
    }

    fn submit_report(&self, request: ReportRequest) {
        self.reports.borrow_mut().push(request);
    }

    fn show_dialog(&self, message: &str) {
        self.dialogs.borrow_mut().push(message.to_string());
    }
}

/// A session over the in-memory platform.
pub type HeadlessSession = AnnotationSession<MemoryDom, ManualTimers, RecordingHost>;

impl HeadlessSession {
    pub fn headless(dom: MemoryDom) -> Self {
        Self::headless_with(dom, AnnotatorConfig::default())
    }

    pub fn headless_with(dom: MemoryDom, config: AnnotatorConfig) -> Self {
        AnnotationSession::new(dom, ManualTimers::new(), RecordingHost::default(), config)
    }

    /// Advance the manual clock, firing due timers into the session.
    pub fn advance(&mut self, ms: u32) {
        let until = self.timers().now() + u64::from(ms);
        while let Some(token) = self.timers().pop_due(until) {
            self.fire_timer(token);
        }
        self.timers().now.set(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let p = dom.element_with(&body, "p", &[("id", "intro"), ("style", "color: red")]);
        dom.text(&p, "a < b & \"c\"");
        dom.add_class(&p, "lead").unwrap();

        insta::assert_snapshot!(dom.to_html(&body), @r#"<body><p id="intro" class="lead" style="color: red">a &lt; b &amp; "c"</p></body>"#);
    }

    #[test]
    fn test_replace_child_moves_node() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let p = dom.element(&body, "p");
        let span = dom.element(&p, "span");
        let text = dom.text(&span, "inner");

        dom.replace_child(&p, &text, &span).unwrap();
        assert_eq!(dom.to_html(&p), "<p>inner</p>");
        assert_eq!(dom.parent(&span), None);
        assert!(dom.children(&span).is_empty());
    }

    #[test]
    fn test_detached_subtree_is_not_connected() {
        let dom = MemoryDom::new();
        let body = dom.body_node();
        let div = dom.element(&body, "div");
        let text = dom.text(&div, "x");
        assert!(dom.is_connected(&text));
        dom.remove(&div).unwrap();
        assert!(!dom.is_connected(&text));
        assert_eq!(dom.count_with_tag("div"), 0);
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let timers = ManualTimers::new();
        let token = |seq| TimerToken {
            slot: crate::platform::TimerSlot::Show,
            seq,
        };
        timers.set_timeout(token(1), 200);
        timers.set_timeout(token(2), 100);
        timers.set_timeout(token(3), 500);

        let mut fired = Vec::new();
        timers.run_for(300, |t| fired.push(t.seq));
        assert_eq!(fired, vec![2, 1]);
        assert_eq!(timers.now(), 300);
        assert_eq!(timers.pending_count(), 1);
    }
}
