//! Owned element tree for ONIX records.
//!
//! Input records are parsed leniently: mismatched or stray end tags are
//! tolerated and elements left open at end of input are closed, so that
//! hand-edited legacy feeds still load. Element names are stored without a
//! namespace prefix.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::error::{Error, Result};
use crate::util::{decode_text, declared_encoding, local_name, resolve_entity, strip_bom, unescape_attr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// An element holding a single text value.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut el = Self::new(name);
        el.children.push(Node::Text(text.into()));
        el
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Append text, merging with a preceding text node.
    pub fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|el| el.name == name)
    }

    pub fn children_named<'s, 'n>(&'s self, name: &'n str) -> impl Iterator<Item = &'s Element> {
        self.elements().filter(move |el| el.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    pub fn has_element_children(&self) -> bool {
        self.elements().next().is_some()
    }

    /// Concatenated direct text, trimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(t) = node {
                out.push_str(t);
            }
        }
        out.trim().to_string()
    }

    /// Text of the first child called `name`, if non-empty.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.children_named(name)
            .map(Element::text)
            .find(|text| !text.is_empty())
    }

    /// Every descendant called `name`, in document order.
    ///
    /// Does not look inside a match, so nested `Product` elements are never
    /// reported twice.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect_named(self, name, &mut found);
        found
    }

    /// First descendant called `name`, depth-first.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for el in self.elements() {
            if el.name == name {
                return Some(el);
            }
            if let Some(found) = el.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Rename this element and all descendants through `rename`.
    pub fn rename_all(&mut self, rename: &impl Fn(&str) -> Option<&'static str>) {
        if let Some(new_name) = rename(&self.name) {
            self.name = new_name.to_string();
        }
        for node in &mut self.children {
            if let Node::Element(el) = node {
                el.rename_all(rename);
            }
        }
    }
}

fn collect_named<'a>(parent: &'a Element, name: &str, found: &mut Vec<&'a Element>) {
    for el in parent.elements() {
        if el.name == name {
            found.push(el);
        } else {
            collect_named(el, name, found);
        }
    }
}

fn start_element(e: &BytesStart) -> Element {
    let qname = e.name();
    let name = String::from_utf8_lossy(local_name(qname.as_ref())).into_owned();
    let mut el = Element::new(name);
    for attr in e.attributes().with_checks(false).flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        el.attributes.push((key, unescape_attr(&raw)));
    }
    el
}

/// Drop whitespace-only text between child elements.
fn finish(mut el: Element) -> Element {
    if el.has_element_children() {
        el.children
            .retain(|node| !matches!(node, Node::Text(t) if t.trim().is_empty()));
    }
    el
}

struct TreeBuilder {
    stack: Vec<Element>,
    root: Option<Element>,
}

impl TreeBuilder {
    fn attach(&mut self, el: Element) {
        match self.stack.last_mut() {
            Some(parent) => parent.push(el),
            None if self.root.is_none() => self.root = Some(el),
            None => debug!(element = %el.name, "Ignoring content after the root element"),
        }
    }

    fn close_top(&mut self) {
        if let Some(el) = self.stack.pop() {
            let el = finish(el);
            self.attach(el);
        }
    }

    /// Close up to and including the nearest open element called `name`.
    fn close(&mut self, name: &str) {
        match self.stack.iter().rposition(|el| el.name == name) {
            Some(pos) => {
                while self.stack.len() > pos {
                    if self.stack.len() > pos + 1
                        && let Some(top) = self.stack.last()
                    {
                        debug!(element = %top.name, "Closing unclosed element");
                    }
                    self.close_top();
                }
            }
            None => debug!(element = name, "Ignoring unmatched end tag"),
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(top) = self.stack.last_mut() {
            top.push_text(text);
        }
    }
}

/// Parse an ONIX document into a tree.
///
/// The bytes are decoded per their XML declaration (falling back to
/// Windows-1252 for legacy feeds that are not UTF-8).
pub fn parse_document(bytes: &[u8]) -> Result<Element> {
    let bytes = strip_bom(bytes);
    let hint = declared_encoding(bytes);
    let content = decode_text(bytes, hint.as_deref());

    let mut reader = Reader::from_str(&content);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut builder = TreeBuilder {
        stack: Vec::new(),
        root: None,
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => builder.stack.push(start_element(&e)),
            Ok(Event::Empty(e)) => {
                let el = start_element(&e);
                builder.attach(el);
            }
            Ok(Event::End(e)) => {
                let qname = e.name();
                let name = String::from_utf8_lossy(local_name(qname.as_ref())).into_owned();
                builder.close(&name);
            }
            Ok(Event::Text(e)) => builder.text(&String::from_utf8_lossy(e.as_ref())),
            Ok(Event::CData(e)) => builder.text(&String::from_utf8_lossy(e.as_ref())),
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                match resolve_entity(&entity) {
                    Some(resolved) => builder.text(&resolved),
                    None => builder.text(&format!("&{entity};")),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Parse(format!(
                    "{} at position {}",
                    e,
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    while !builder.stack.is_empty() {
        builder.close_top();
    }

    builder
        .root
        .ok_or_else(|| Error::Parse("document has no root element".into()))
}
