//! Attribute-preserving XML document model
//!
//! A small element tree over `quick-xml` events. It keeps what a NuGet
//! configuration round-trip needs: element order, attribute order, text and
//! comments. Whitespace-only text is dropped and the writer re-indents, so
//! documents are canonicalized in layout but unchanged in structure.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use crate::error::{CoreError, Result};

const INDENT: &str = "  ";

/// An XML element with its attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// One ordered child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Value of the named attribute, if present.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All element children, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Element children with the given name, in document order.
    pub fn children_named<'s>(&'s self, name: &str) -> impl Iterator<Item = &'s Element> {
        self.child_elements().filter(move |el| el.name == name)
    }

    /// First element child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children_named(name).next()
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Returns the named child element, appending an empty one if absent.
    pub fn ensure_child(&mut self, name: &str) -> &mut Element {
        if let Some(position) = self.children.iter().position(
            |node| matches!(node, Node::Element(el) if el.name == name),
        ) {
            match &mut self.children[position] {
                Node::Element(el) => el,
                _ => unreachable!("position matched an element node"),
            }
        } else {
            self.children.push(Node::Element(Element::new(name)));
            match self.children.last_mut() {
                Some(Node::Element(el)) => el,
                _ => unreachable!("just pushed an element node"),
            }
        }
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }
}

/// Parse a document into its root element.
///
/// Returns `Ok(None)` for input with no root element at all (empty or
/// text-only content). Ill-formed markup is an error; content outside the
/// root element other than comments and processing instructions is ignored.
pub fn parse_document(input: &str) -> Result<Option<Element>> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(CoreError::invalid_document("multiple root elements"));
                }
                stack.push(element_from_start(&start)?);
            }
            Ok(Event::Empty(start)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(CoreError::invalid_document("multiple root elements"));
                }
                let element = element_from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(element)),
                    None => root = Some(element),
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| CoreError::invalid_document("unexpected closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(element)),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(text)) => {
                if let Some(parent) = stack.last_mut() {
                    let content = text.unescape().map_err(CoreError::xml)?;
                    if !content.is_empty() {
                        parent.children.push(Node::Text(content.into_owned()));
                    }
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(parent) = stack.last_mut() {
                    let content = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(Node::Text(content));
                }
            }
            Ok(Event::Comment(comment)) => {
                if let Some(parent) = stack.last_mut() {
                    let content = String::from_utf8_lossy(&comment.into_inner()).into_owned();
                    parent.children.push(Node::Comment(content));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declaration, doctype, processing instructions
            Err(e) => return Err(CoreError::xml(e)),
        }
    }

    if !stack.is_empty() {
        return Err(CoreError::invalid_document(format!(
            "unclosed element <{}>",
            stack[stack.len() - 1].name
        )));
    }
    Ok(root)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(CoreError::xml)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(CoreError::xml)?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Serialize a document with a UTF-8 declaration and two-space indentation.
pub fn to_xml_string(root: &Element) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    write_element(&mut out, root, 0);
    out
}

fn write_element(out: &mut String, element: &Element, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str(" />\n");
        return;
    }

    // A single text child stays inline: <key>value</key>
    if let [Node::Text(text)] = element.children.as_slice() {
        out.push('>');
        out.push_str(&escape(text.as_str()));
        out.push_str("</");
        out.push_str(&element.name);
        out.push_str(">\n");
        return;
    }

    out.push_str(">\n");
    for child in &element.children {
        match child {
            Node::Element(el) => write_element(out, el, depth + 1),
            Node::Text(text) => {
                for _ in 0..=depth {
                    out.push_str(INDENT);
                }
                out.push_str(&escape(text.as_str()));
                out.push('\n');
            }
            Node::Comment(comment) => {
                for _ in 0..=depth {
                    out.push_str(INDENT);
                }
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->\n");
            }
        }
    }
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push_str(">\n");
}
