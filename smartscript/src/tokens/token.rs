//! Token model produced by the SmartScript lexer
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary arithmetic operators available inside tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    /// All operators in symbol order
    pub const ALL: [Operator; 5] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Pow,
    ];

    /// Get operator from its source character
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '^' => Some(Self::Pow),
            _ => None,
        }
    }

    /// Get the operator as it appears in template source
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Lexical token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    /// Raw text outside tags, escapes already resolved
    Text(String),
    /// Quoted string literal, escapes already resolved
    Str(String),
    /// Numeral that fits a 32-bit signed integer
    Integer(i32),
    /// Any other numeral
    Double(f64),
    Operator(Operator),
    /// Names, `@function` names and the `=` echo marker
    Identifier(String),
    /// `{$`
    TagStart,
    /// `$}`
    TagEnd,
    Eof,
}

/// Token kinds, one per [`Token`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Text,
    String,
    Integer,
    Double,
    Operator,
    Identifier,
    TagStart,
    TagEnd,
    Eof,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::String => "STRING",
            Self::Integer => "INTEGER",
            Self::Double => "DOUBLE",
            Self::Operator => "OPERATOR",
            Self::Identifier => "IDENTIFIER",
            Self::TagStart => "TAG_START",
            Self::TagEnd => "TAG_END",
            Self::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token {
    /// Get the kind of this token
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Text(_) => TokenKind::Text,
            Self::Str(_) => TokenKind::String,
            Self::Integer(_) => TokenKind::Integer,
            Self::Double(_) => TokenKind::Double,
            Self::Operator(_) => TokenKind::Operator,
            Self::Identifier(_) => TokenKind::Identifier,
            Self::TagStart => TokenKind::TagStart,
            Self::TagEnd => TokenKind::TagEnd,
            Self::Eof => TokenKind::Eof,
        }
    }

    /// Get the token value as text (unescaped for text and strings)
    pub fn lexeme(&self) -> String {
        match self {
            Self::Text(text) | Self::Str(text) | Self::Identifier(text) => text.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Double(value) => crate::utils::format_double(*value),
            Self::Operator(op) => op.symbol().to_string(),
            Self::TagStart => "{$".to_string(),
            Self::TagEnd => "$}".to_string(),
            Self::Eof => String::new(),
        }
    }

    /// Check if this token is an identifier with the given name, ignoring case
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Self::Identifier(name) if name.eq_ignore_ascii_case(keyword))
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eof => write!(f, "{}", self.kind()),
            _ => write!(f, "{}({:?})", self.kind(), self.lexeme()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_symbols_round_trip() {
        for op in Operator::ALL {
            let ch = op.symbol().chars().next();
            assert_eq!(ch.and_then(Operator::from_char), Some(op));
        }
        assert_eq!(Operator::from_char('%'), None);
    }

    #[test]
    fn test_token_kind_and_lexeme() {
        assert_eq!(Token::Str("a\"b".into()).kind(), TokenKind::String);
        assert_eq!(Token::Str("a\"b".into()).lexeme(), "a\"b");
        assert_eq!(Token::Double(2.0).lexeme(), "2.0");
        assert_eq!(Token::TagEnd.lexeme(), "$}");
        assert_eq!(TokenKind::TagStart.to_string(), "TAG_START");
    }

    #[test]
    fn test_keyword_match_ignores_case() {
        let token = Token::Identifier("For".into());
        assert!(token.is_keyword("FOR"));
        assert!(!token.is_keyword("END"));
        assert!(!Token::Str("for".into()).is_keyword("for"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::Identifier("@sin".into()).to_string(), "IDENTIFIER(\"@sin\")");
        assert_eq!(Token::Eof.to_string(), "EOF");
    }
}
