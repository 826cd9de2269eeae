//! Syntax tree produced by the SmartScript parser
//!
//! The tree is owned top-down: a [`DocumentNode`] owns its children and a
//! [`ForLoopNode`] owns its body. There are no parent links. Consumers walk
//! the tree through [`NodeVisitor`]; the engine and [`SourceWriter`] are the
//! two visitors in this crate.

pub mod visitor;
pub mod writer;

use crate::elements::Element;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use visitor::{walk_children, NodeVisitor};
pub use writer::SourceWriter;

/// Root of a parsed template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentNode {
    pub children: Vec<Node>,
}

/// Literal text between tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
}

/// `{$= ... $}` tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoNode {
    pub elements: Vec<Element>,
}

/// `{$ FOR ... $}` block with its body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoopNode {
    pub variable: String,
    pub start: Element,
    pub end: Element,
    /// Absent step means 1
    pub step: Option<Element>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Document(DocumentNode),
    Text(TextNode),
    Echo(EchoNode),
    ForLoop(ForLoopNode),
}

impl Node {
    /// Dispatch to the visitor method for this variant
    pub fn accept<V: NodeVisitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        match self {
            Self::Document(node) => visitor.visit_document(node),
            Self::Text(node) => visitor.visit_text(node),
            Self::Echo(node) => visitor.visit_echo(node),
            Self::ForLoop(node) => visitor.visit_for_loop(node),
        }
    }

    /// Child nodes owned by this node
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Document(node) => &node.children,
            Self::ForLoop(node) => &node.children,
            Self::Text(_) | Self::Echo(_) => &[],
        }
    }

    fn count(&self) -> usize {
        1 + self.children().iter().map(Node::count).sum::<usize>()
    }

    fn depth(&self) -> usize {
        let nested = self.children().iter().map(Node::depth).max().unwrap_or(0);
        match self {
            Self::ForLoop(_) => nested + 1,
            _ => nested,
        }
    }
}

impl DocumentNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn accept<V: NodeVisitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        visitor.visit_document(self)
    }

    /// Total number of nodes, including the document itself
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Deepest FOR nesting level (0 for a template without loops)
    pub fn max_depth(&self) -> usize {
        self.children.iter().map(Node::depth).max().unwrap_or(0)
    }
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl EchoNode {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }
}

impl ForLoopNode {
    pub fn new(variable: impl Into<String>, start: Element, end: Element, step: Option<Element>) -> Self {
        Self {
            variable: variable.into(),
            start,
            end,
            step,
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }
}

impl fmt::Display for DocumentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&SourceWriter::render(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_document() -> DocumentNode {
        let mut inner = ForLoopNode::new(
            "j",
            Element::ConstantInteger(1),
            Element::ConstantInteger(2),
            None,
        );
        inner.add_child(Node::Echo(EchoNode::new(vec![Element::Variable("j".into())])));

        let mut outer = ForLoopNode::new(
            "i",
            Element::ConstantInteger(1),
            Element::Variable("n".into()),
            Some(Element::ConstantInteger(2)),
        );
        outer.add_child(Node::Text(TextNode::new("row ")));
        outer.add_child(Node::ForLoop(inner));

        let mut document = DocumentNode::new();
        document.add_child(Node::Text(TextNode::new("start")));
        document.add_child(Node::ForLoop(outer));
        document
    }

    #[test]
    fn test_statistics() {
        let document = nested_document();
        assert_eq!(document.node_count(), 6);
        assert_eq!(document.max_depth(), 2);
        assert_eq!(DocumentNode::new().max_depth(), 0);
        assert_eq!(DocumentNode::new().node_count(), 1);
    }

    #[test]
    fn test_serde_shape() {
        let node = Node::Text(TextNode::new("hi"));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "Text");
        assert_eq!(json["text"], "hi");

        let document = nested_document();
        let text = serde_json::to_string(&document).unwrap();
        let back: DocumentNode = serde_json::from_str(&text).unwrap();
        assert_eq!(back, document);
    }
}
