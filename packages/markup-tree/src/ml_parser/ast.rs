//! ML Parser AST
//!
//! Element/attribute/text nodes produced by the tree builder.

use crate::parse_util::ParseSourceSpan;
use serde::Serialize;

/// Node type union
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Node {
    Attribute(Attribute),
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            Node::Attribute(attr) => &attr.source_span,
            Node::Element(el) => &el.source_span,
            Node::Text(text) => &text.source_span,
        }
    }
}

/// Text node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

impl Text {
    pub fn new(value: String, source_span: ParseSourceSpan) -> Self {
        Text { value, source_span }
    }
}

/// Attribute node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
}

impl Attribute {
    pub fn new(name: String, value: String, source_span: ParseSourceSpan) -> Self {
        Attribute {
            name,
            value,
            source_span,
        }
    }
}

/// Element node
///
/// `source_span` covers the start tag only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    pub source_span: ParseSourceSpan,
}

impl Element {
    pub fn new(
        name: String,
        attrs: Vec<Attribute>,
        children: Vec<Node>,
        source_span: ParseSourceSpan,
    ) -> Self {
        Element {
            name,
            attrs,
            children,
            source_span,
        }
    }
}

/// Visitor trait for traversing AST
pub trait Visitor {
    fn visit_element(&mut self, element: &Element);
    fn visit_attribute(&mut self, attribute: &Attribute);
    fn visit_text(&mut self, text: &Text);
}

/// Visit all nodes in array
pub fn visit_all(visitor: &mut dyn Visitor, nodes: &[Node]) {
    for node in nodes {
        match node {
            Node::Element(e) => visitor.visit_element(e),
            Node::Attribute(a) => visitor.visit_attribute(a),
            Node::Text(t) => visitor.visit_text(t),
        }
    }
}
