//! Visitor over the node tree
use super::{DocumentNode, EchoNode, ForLoopNode, Node, TextNode};

/// One method per node variant. Visitors decide themselves whether and when
/// to descend into children, usually through [`walk_children`].
pub trait NodeVisitor {
    type Error;

    fn visit_document(&mut self, node: &DocumentNode) -> Result<(), Self::Error>;

    fn visit_text(&mut self, node: &TextNode) -> Result<(), Self::Error>;

    fn visit_echo(&mut self, node: &EchoNode) -> Result<(), Self::Error>;

    fn visit_for_loop(&mut self, node: &ForLoopNode) -> Result<(), Self::Error>;
}

/// Visit each child in order, stopping at the first error
pub fn walk_children<V: NodeVisitor + ?Sized>(
    visitor: &mut V,
    children: &[Node],
) -> Result<(), V::Error> {
    children.iter().try_for_each(|child| child.accept(visitor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Element;

    /// Records visit order and fails on a chosen text
    struct Recorder {
        seen: Vec<String>,
        fail_on: Option<&'static str>,
    }

    impl NodeVisitor for Recorder {
        type Error = String;

        fn visit_document(&mut self, node: &DocumentNode) -> Result<(), String> {
            self.seen.push("document".into());
            walk_children(self, &node.children)
        }

        fn visit_text(&mut self, node: &TextNode) -> Result<(), String> {
            if self.fail_on == Some(node.text.as_str()) {
                return Err(format!("failed on {}", node.text));
            }
            self.seen.push(format!("text:{}", node.text));
            Ok(())
        }

        fn visit_echo(&mut self, node: &EchoNode) -> Result<(), String> {
            self.seen.push(format!("echo:{}", node.elements.len()));
            Ok(())
        }

        fn visit_for_loop(&mut self, node: &ForLoopNode) -> Result<(), String> {
            self.seen.push(format!("for:{}", node.variable));
            walk_children(self, &node.children)
        }
    }

    fn sample() -> DocumentNode {
        let mut body = ForLoopNode::new(
            "i",
            Element::ConstantInteger(1),
            Element::ConstantInteger(3),
            None,
        );
        body.add_child(Node::Text(TextNode::new("b")));
        body.add_child(Node::Echo(EchoNode::new(vec![Element::Variable("i".into())])));

        let mut document = DocumentNode::new();
        document.add_child(Node::Text(TextNode::new("a")));
        document.add_child(Node::ForLoop(body));
        document.add_child(Node::Text(TextNode::new("c")));
        document
    }

    #[test]
    fn test_visit_order() {
        let mut recorder = Recorder {
            seen: Vec::new(),
            fail_on: None,
        };
        sample().accept(&mut recorder).unwrap();
        assert_eq!(
            recorder.seen,
            vec!["document", "text:a", "for:i", "text:b", "echo:1", "text:c"]
        );
    }

    #[test]
    fn test_walk_stops_at_first_error() {
        let mut recorder = Recorder {
            seen: Vec::new(),
            fail_on: Some("b"),
        };
        let result = sample().accept(&mut recorder);
        assert_eq!(result, Err("failed on b".to_string()));
        assert_eq!(recorder.seen, vec!["document", "text:a", "for:i"]);
    }
}
