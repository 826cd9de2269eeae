//! Expression atoms appearing inside echo and for-loop tags
//!
//! Every element can print itself back as template syntax via
//! [`Element::as_text`]; lexing that text again yields an equal element.

use crate::tokens::Operator;
use crate::utils::format_double;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    ConstantInteger(i32),
    ConstantDouble(f64),
    /// Unescaped string contents
    StringLiteral(String),
    Variable(String),
    /// Function name without the leading `@`
    Function(String),
    Operator(Operator),
}

impl Element {
    /// Canonical template text for this element
    pub fn as_text(&self) -> String {
        match self {
            Self::ConstantInteger(value) => value.to_string(),
            Self::ConstantDouble(value) => format_double(*value),
            Self::StringLiteral(value) => quote_string(value),
            Self::Variable(name) => name.clone(),
            Self::Function(name) => format!("@{}", name),
            Self::Operator(op) => op.symbol().to_string(),
        }
    }

    /// Constants and variables are the only elements a FOR tag accepts
    pub fn is_loop_operand(&self) -> bool {
        matches!(
            self,
            Self::ConstantInteger(_)
                | Self::ConstantDouble(_)
                | Self::StringLiteral(_)
                | Self::Variable(_)
        )
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::{Lexer, LexerMode};
    use crate::tokens::Token;

    fn relex(text: &str) -> Token {
        let mut lexer = Lexer::new(text);
        lexer.set_mode(LexerMode::InsideTag);
        lexer.next_token().expect("element text must lex").into_inner()
    }

    #[test]
    fn test_as_text_forms() {
        assert_eq!(Element::ConstantInteger(-3).as_text(), "-3");
        assert_eq!(Element::ConstantDouble(2.0).as_text(), "2.0");
        assert_eq!(Element::Function("decfmt".into()).as_text(), "@decfmt");
        assert_eq!(Element::Operator(Operator::Pow).as_text(), "^");
        assert_eq!(
            Element::StringLiteral("say \"hi\"\n".into()).as_text(),
            r#""say \"hi\"\n""#
        );
    }

    #[test]
    fn test_as_text_relexes_to_same_value() {
        assert_eq!(relex(&Element::ConstantDouble(0.125).as_text()), Token::Double(0.125));
        assert_eq!(relex(&Element::ConstantDouble(-7.0).as_text()), Token::Double(-7.0));
        assert_eq!(relex(&Element::ConstantInteger(i32::MIN).as_text()), Token::Integer(i32::MIN));
        assert_eq!(
            relex(&Element::StringLiteral("a\\b\t\"c\"".into()).as_text()),
            Token::Str("a\\b\t\"c\"".into())
        );
        assert_eq!(
            relex(&Element::Function("sin".into()).as_text()),
            Token::Identifier("@sin".into())
        );
    }

    #[test]
    fn test_loop_operands() {
        assert!(Element::Variable("i".into()).is_loop_operand());
        assert!(Element::StringLiteral("1".into()).is_loop_operand());
        assert!(!Element::Operator(Operator::Add).is_loop_operand());
        assert!(!Element::Function("sin".into()).is_loop_operand());
    }
}
