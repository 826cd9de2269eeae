//! Shared primitives for the SmartScript lexer, parser and engine
//!
//! Source positions live in [`span`]; numeric literal parsing and the
//! canonical double rendering shared by elements and runtime values live in
//! [`numbers`].

pub mod numbers;
pub mod span;

pub use numbers::{format_double, parse_integer_then_double, parse_numeral, Number, Numeral};
pub use span::{Position, SourceMap, Span, Spanned};
