//! Stack-based template parser
//!
//! The parser pulls tokens from a [`Lexer`] and flips its mode at tag
//! boundaries. Open FOR blocks live on an explicit stack above the document
//! root; `{$END$}` pops the innermost block and attaches it to whatever is
//! open beneath it. Nesting depth therefore never grows the call stack.

use crate::config::runtime::LexicalPreferences;
use crate::elements::Element;
use crate::lexical::{Lexer, LexerError, LexerMode, LexicalMetrics};
use crate::log_debug;
use crate::nodes::{DocumentNode, EchoNode, ForLoopNode, Node, TextNode};
use crate::syntax::error::{ParseError, ParseResult};
use crate::tokens::{SpannedToken, Token};
use crate::utils::Span;

/// Tag names recognised after `{$`
const ECHO_MARKER: &str = "=";
const FOR_KEYWORD: &str = "for";
const END_KEYWORD: &str = "end";

/// FOR block waiting for its END tag
#[derive(Debug)]
struct OpenBlock {
    node: ForLoopNode,
    opened_at: Span,
}

/// Successful parse together with the lexer counters gathered on the way
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    pub document: DocumentNode,
    pub metrics: LexicalMetrics,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    root: DocumentNode,
    open_blocks: Vec<OpenBlock>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_preferences(source, LexicalPreferences::default())
    }

    pub fn with_preferences(source: &'a str, preferences: LexicalPreferences) -> Self {
        Self {
            lexer: Lexer::with_preferences(source, preferences),
            root: DocumentNode::new(),
            open_blocks: Vec::new(),
        }
    }

    /// Parse the whole template into a document
    pub fn parse(self) -> ParseResult<DocumentNode> {
        self.parse_template().map(|parsed| parsed.document)
    }

    /// Parse the whole template, keeping lexer metrics
    pub fn parse_template(mut self) -> ParseResult<ParsedTemplate> {
        loop {
            let token = self.lexer.next_token()?;
            match token.value {
                Token::Eof => break,
                Token::Text(text) => self.append(Node::Text(TextNode::new(text))),
                Token::TagStart => {
                    self.lexer.set_mode(LexerMode::InsideTag);
                    self.parse_tag(token.span)?;
                    self.lexer.set_mode(LexerMode::Basic);
                }
                other => {
                    return Err(ParseError::unexpected_token(
                        "text or '{$'",
                        &other.to_string(),
                        token.span,
                    ))
                }
            }
        }

        if let Some(innermost) = self.open_blocks.last() {
            return Err(ParseError::UnclosedBlock {
                open_blocks: self.open_blocks.len(),
                span: innermost.opened_at,
            });
        }

        Ok(ParsedTemplate {
            document: self.root,
            metrics: self.lexer.metrics().clone(),
        })
    }

    // ========================================================================
    // TAGS
    // ========================================================================

    fn parse_tag(&mut self, tag_span: Span) -> ParseResult<()> {
        let name = self.next_in_tag(tag_span)?;

        match &name.value {
            Token::Identifier(marker) if marker == ECHO_MARKER => self.parse_echo(tag_span),
            token if token.is_keyword(FOR_KEYWORD) => self.parse_for(tag_span),
            token if token.is_keyword(END_KEYWORD) => self.parse_end(tag_span, name.span),
            Token::Identifier(unknown) => Err(ParseError::UnknownTag {
                name: unknown.clone(),
                span: name.span,
            }),
            other => Err(ParseError::unexpected_token(
                "tag name",
                &other.to_string(),
                name.span,
            )),
        }
    }

    fn parse_echo(&mut self, tag_span: Span) -> ParseResult<()> {
        let mut elements = Vec::new();
        while let Some((element, _)) = self.next_element(tag_span, "echo element or '$}'")? {
            elements.push(element);
        }

        self.append(Node::Echo(EchoNode::new(elements)));
        Ok(())
    }

    fn parse_for(&mut self, tag_span: Span) -> ParseResult<()> {
        let mut arguments = Vec::new();
        while let Some((element, span)) = self.next_element(tag_span, "constant or variable")? {
            if !element.is_loop_operand() {
                return Err(ParseError::unexpected_token(
                    "constant or variable",
                    &element.as_text(),
                    span,
                ));
            }
            arguments.push(element);
        }

        let count = arguments.len();
        let step = if count == 4 { arguments.pop() } else { None };
        let [first, start, end]: [Element; 3] =
            arguments
                .try_into()
                .map_err(|_| ParseError::InvalidForArity {
                    count,
                    span: tag_span,
                })?;

        let Element::Variable(variable) = first else {
            return Err(ParseError::InvalidLoopVariable {
                found: first.as_text(),
                span: tag_span,
            });
        };

        log_debug!("Opening FOR block",
            "variable" => variable.as_str(),
            "depth" => self.open_blocks.len() + 1
        );

        self.open_blocks.push(OpenBlock {
            node: ForLoopNode::new(variable, start, end, step),
            opened_at: tag_span,
        });
        Ok(())
    }

    /// Next element of the current tag, or `None` at `$}`
    fn next_element(
        &mut self,
        tag_span: Span,
        expected: &str,
    ) -> ParseResult<Option<(Element, Span)>> {
        let token = self.next_in_tag(tag_span)?;
        let element = match token.value {
            Token::TagEnd => return Ok(None),
            Token::Integer(value) => Element::ConstantInteger(value),
            Token::Double(value) => Element::ConstantDouble(value),
            Token::Str(value) => Element::StringLiteral(value),
            Token::Operator(op) => Element::Operator(op),
            Token::Identifier(name) => classify_identifier(name, token.span)?,
            other => {
                return Err(ParseError::unexpected_token(
                    expected,
                    &other.to_string(),
                    token.span,
                ))
            }
        };
        Ok(Some((element, token.span)))
    }

    fn parse_end(&mut self, tag_span: Span, name_span: Span) -> ParseResult<()> {
        let Some(block) = self.open_blocks.pop() else {
            return Err(ParseError::UnmatchedEnd { span: name_span });
        };

        let closing = self.next_in_tag(tag_span)?;
        if closing.value != Token::TagEnd {
            return Err(ParseError::unexpected_token(
                "'$}' after END",
                &closing.value.to_string(),
                closing.span,
            ));
        }

        log_debug!("Closing FOR block",
            "variable" => block.node.variable.as_str(),
            "children" => block.node.children.len()
        );

        self.append(Node::ForLoop(block.node));
        Ok(())
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    /// Next token inside a tag; end of input reports where the tag opened
    fn next_in_tag(&mut self, tag_span: Span) -> ParseResult<SpannedToken> {
        self.lexer.next_token().map_err(|error| match error {
            LexerError::UnterminatedTag { .. } => ParseError::UnclosedTag { span: tag_span },
            other => ParseError::Lexer(other),
        })
    }

    /// Attach a node to the innermost open block
    fn append(&mut self, node: Node) {
        match self.open_blocks.last_mut() {
            Some(block) => block.node.add_child(node),
            None => self.root.add_child(node),
        }
    }
}

/// Map an identifier token to a function or variable element
fn classify_identifier(name: String, span: Span) -> ParseResult<Element> {
    if let Some(function) = name.strip_prefix('@') {
        return if is_valid_name(function) {
            Ok(Element::Function(function.to_string()))
        } else {
            Err(ParseError::InvalidName {
                expected: "function",
                name,
                span,
            })
        };
    }

    if is_valid_name(&name) {
        Ok(Element::Variable(name))
    } else {
        Err(ParseError::InvalidName {
            expected: "variable",
            name,
            span,
        })
    }
}

/// A letter followed by letters, digits or underscores
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(char::is_alphabetic)
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Operator;
    use assert_matches::assert_matches;

    fn parse(source: &str) -> ParseResult<DocumentNode> {
        Parser::new(source).parse()
    }

    #[test]
    fn test_text_only() {
        let document = parse("Hello, world!\nSecond line").unwrap();
        assert_eq!(
            document.children,
            vec![Node::Text(TextNode::new("Hello, world!\nSecond line"))]
        );
    }

    #[test]
    fn test_echo_elements() {
        let document = parse("{$= i i * @sin \"0.000\" @decfmt 1.5 -2 $}").unwrap();
        assert_eq!(
            document.children,
            vec![Node::Echo(EchoNode::new(vec![
                Element::Variable("i".into()),
                Element::Variable("i".into()),
                Element::Operator(Operator::Mul),
                Element::Function("sin".into()),
                Element::StringLiteral("0.000".into()),
                Element::Function("decfmt".into()),
                Element::ConstantDouble(1.5),
                Element::ConstantInteger(-2),
            ]))]
        );
    }

    #[test]
    fn test_for_loop_nesting() {
        let document =
            parse("a{$ FOR i 1 10 2 $}b{$for j i \"3\"$}{$=j$}{$end$}{$ END $}c").unwrap();

        assert_eq!(document.children.len(), 3);
        let Node::ForLoop(outer) = &document.children[1] else {
            panic!("expected FOR node");
        };
        assert_eq!(outer.variable, "i");
        assert_eq!(outer.start, Element::ConstantInteger(1));
        assert_eq!(outer.end, Element::ConstantInteger(10));
        assert_eq!(outer.step, Some(Element::ConstantInteger(2)));
        assert_eq!(outer.children.len(), 2);

        let Node::ForLoop(inner) = &outer.children[1] else {
            panic!("expected nested FOR node");
        };
        assert_eq!(inner.start, Element::Variable("i".into()));
        assert_eq!(inner.end, Element::StringLiteral("3".into()));
        assert_eq!(inner.step, None);
        assert_eq!(document.max_depth(), 2);
    }

    #[test]
    fn test_unmatched_end() {
        assert_matches!(parse("{$END$}"), Err(ParseError::UnmatchedEnd { .. }));
        assert_matches!(
            parse("{$FOR i 1 2$}{$END$}{$END$}"),
            Err(ParseError::UnmatchedEnd { .. })
        );
    }

    #[test]
    fn test_unclosed_for_block() {
        assert_matches!(
            parse("{$FOR i 1 2$}{$FOR j 1 2$}x{$END$}"),
            Err(ParseError::UnclosedBlock { open_blocks: 1, .. })
        );
        assert_matches!(
            parse("{$FOR i 1 2$}"),
            Err(ParseError::UnclosedBlock { open_blocks: 1, .. })
        );
    }

    #[test]
    fn test_for_arity() {
        assert_matches!(
            parse("{$FOR i 1$}{$END$}"),
            Err(ParseError::InvalidForArity { count: 2, .. })
        );
        assert_matches!(
            parse("{$FOR i 1 2 3 4$}{$END$}"),
            Err(ParseError::InvalidForArity { count: 5, .. })
        );
    }

    #[test]
    fn test_for_requires_variable_first() {
        assert_matches!(
            parse("{$FOR 1 2 3$}{$END$}"),
            Err(ParseError::InvalidLoopVariable { ref found, .. }) if found == "1"
        );
        assert_matches!(
            parse("{$FOR \"i\" 2 3$}{$END$}"),
            Err(ParseError::InvalidLoopVariable { .. })
        );
    }

    #[test]
    fn test_for_rejects_functions_and_operators() {
        assert_matches!(
            parse("{$FOR i @sin 3$}{$END$}"),
            Err(ParseError::UnexpectedToken { .. })
        );
        assert_matches!(
            parse("{$FOR i 1 * 3$}{$END$}"),
            Err(ParseError::UnexpectedToken { .. })
        );
    }

    #[test]
    fn test_for_operand_error_reports_element_text() {
        assert_matches!(
            parse("{$FOR i 1 @sin$}{$END$}"),
            Err(ParseError::UnexpectedToken { expected, found, span })
                if expected == "constant or variable" && found == "@sin" && span.start.column == 11
        );
        assert_matches!(
            parse("{$FOR i + 2$}{$END$}"),
            Err(ParseError::UnexpectedToken { found, .. }) if found == "+"
        );
        // the same elements are fine inside an echo
        assert!(parse("{$= i 1 @sin + $}").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert_matches!(
            parse("{$= _x $}"),
            Err(ParseError::InvalidName { expected: "variable", .. })
        );
        assert_matches!(
            parse("{$= @1x $}"),
            Err(ParseError::InvalidName { expected: "function", .. })
        );
        assert_matches!(
            parse("{$= a@b $}"),
            Err(ParseError::InvalidName { expected: "variable", .. })
        );
    }

    #[test]
    fn test_unknown_tag_and_missing_name() {
        assert_matches!(
            parse("{$ IF x $}"),
            Err(ParseError::UnknownTag { ref name, .. }) if name == "IF"
        );
        assert_matches!(parse("{$ 5 $}"), Err(ParseError::UnexpectedToken { .. }));
        assert_matches!(parse("{$$}"), Err(ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_end_must_close_tag_immediately() {
        assert_matches!(
            parse("{$FOR i 1 2$}{$END i$}"),
            Err(ParseError::UnexpectedToken { .. })
        );
    }

    #[test]
    fn test_unclosed_tag_reports_tag_start() {
        let error = parse("text {$= 1 2").unwrap_err();
        assert_matches!(error, ParseError::UnclosedTag { span } if span.start.column == 6);
    }

    #[test]
    fn test_lexer_errors_propagate() {
        assert_matches!(
            parse("bad \\escape"),
            Err(ParseError::Lexer(LexerError::InvalidEscape { .. }))
        );
        assert_matches!(
            parse("{$= \"unterminated $}"),
            Err(ParseError::Lexer(LexerError::UnterminatedString { .. }))
        );
    }

    #[test]
    fn test_reserialization_round_trip() {
        let sources = [
            "plain text without tags",
            "escaped \\{$ braces \\\\ and slashes",
            "{$ FOR i -1 10.5 \"2\" $}x{$= i \"a\\\"b\" @dup * $}{$END$}",
            "{$FOR a 1 2$}{$FOR b a 3 1$}{$= a b + $}{$END$}{$END$}",
        ];

        for source in sources {
            let document = parse(source).unwrap();
            let reparsed = parse(&document.to_string()).unwrap();
            assert_eq!(reparsed, document, "round trip failed for {source}");
        }
    }

    #[test]
    fn test_text_reserialization_is_exact() {
        let source = "no tags, only \\\\ and \\{ escapes";
        let document = parse(source).unwrap();
        assert_eq!(document.to_string(), source);
    }

    #[test]
    fn test_parse_template_keeps_metrics() {
        let parsed = Parser::new("a{$= 1 $}b").parse_template().unwrap();
        assert_eq!(parsed.document.node_count(), 4);
        assert_eq!(parsed.metrics.total_tokens, 7);
    }
}
