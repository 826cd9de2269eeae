//! Token system for SmartScript lexical analysis
//!
//! Tokens are deliberately coarse: function names (`@sin`), the echo marker
//! (`=`) and keywords (`FOR`, `END`) all arrive as [`Token::Identifier`] and
//! are classified by the parser, which knows the tag context.
//!
//! Every token produced by the lexer is wrapped in [`Spanned`] so later
//! stages can report where a problem was found.

pub mod token;

pub use token::{Operator, Token, TokenKind};

pub use crate::utils::{Position, Span, Spanned};

/// Token with its source location
pub type SpannedToken = Spanned<Token>;
