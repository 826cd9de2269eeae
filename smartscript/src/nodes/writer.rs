//! Re-serialization of a node tree into template source
use super::{walk_children, DocumentNode, EchoNode, ForLoopNode, NodeVisitor, TextNode};
use std::convert::Infallible;

/// Visitor that prints a tree back as SmartScript source.
///
/// Text is escaped so the output parses to an equal tree.
#[derive(Debug, Default)]
pub struct SourceWriter {
    output: String,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a whole document
    pub fn render(document: &DocumentNode) -> String {
        let mut writer = Self::new();
        match document.accept(&mut writer) {
            Ok(()) => writer.into_output(),
            Err(never) => match never {},
        }
    }

    pub fn into_output(self) -> String {
        self.output
    }

    fn write_elements<'e>(&mut self, elements: impl IntoIterator<Item = &'e crate::elements::Element>) {
        for element in elements {
            self.output.push(' ');
            self.output.push_str(&element.as_text());
        }
    }
}

impl NodeVisitor for SourceWriter {
    type Error = Infallible;

    fn visit_document(&mut self, node: &DocumentNode) -> Result<(), Infallible> {
        walk_children(self, &node.children)
    }

    fn visit_text(&mut self, node: &TextNode) -> Result<(), Infallible> {
        for ch in node.text.chars() {
            if matches!(ch, '\\' | '{') {
                self.output.push('\\');
            }
            self.output.push(ch);
        }
        Ok(())
    }

    fn visit_echo(&mut self, node: &EchoNode) -> Result<(), Infallible> {
        self.output.push_str("{$=");
        self.write_elements(&node.elements);
        self.output.push_str(" $}");
        Ok(())
    }

    fn visit_for_loop(&mut self, node: &ForLoopNode) -> Result<(), Infallible> {
        self.output.push_str("{$ FOR ");
        self.output.push_str(&node.variable);
        self.write_elements([&node.start, &node.end].into_iter().chain(node.step.as_ref()));
        self.output.push_str(" $}");
        walk_children(self, &node.children)?;
        self.output.push_str("{$END$}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Element;
    use crate::nodes::Node;
    use crate::tokens::Operator;

    #[test]
    fn test_render_escapes_text() {
        let mut document = DocumentNode::new();
        document.add_child(Node::Text(TextNode::new(r"a\b{c}")));
        assert_eq!(SourceWriter::render(&document), r"a\\b\{c}");
    }

    #[test]
    fn test_render_tags() {
        let mut body = ForLoopNode::new(
            "i",
            Element::ConstantInteger(1),
            Element::ConstantDouble(5.0),
            Some(Element::StringLiteral("2".into())),
        );
        body.add_child(Node::Echo(EchoNode::new(vec![
            Element::Variable("i".into()),
            Element::ConstantInteger(2),
            Element::Operator(Operator::Mul),
            Element::Function("dup".into()),
        ])));

        let mut document = DocumentNode::new();
        document.add_child(Node::ForLoop(body));

        assert_eq!(
            document.to_string(),
            "{$ FOR i 1 5.0 \"2\" $}{$= i 2 * @dup $}{$END$}"
        );
    }

    #[test]
    fn test_render_empty_echo() {
        let mut document = DocumentNode::new();
        document.add_child(Node::Echo(EchoNode::new(Vec::new())));
        assert_eq!(document.to_string(), "{$= $}");
    }
}
