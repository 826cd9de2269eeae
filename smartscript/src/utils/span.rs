//! Source locations for tokens and diagnostics
//!
//! The lexer advances a [`Position`] one character at a time; every token
//! carries the [`Span`] it was read from, and the CLI turns a position back
//! into a line excerpt through [`SourceMap`].

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// Byte offset plus 1-based line and character column
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// First character of a template
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Position just after `ch`
    pub fn advance(self, ch: char) -> Self {
        let offset = self.offset + ch.len_utf8();
        if ch == '\n' {
            Self::new(offset, self.line + 1, 1)
        } else {
            Self::new(offset, self.line, self.column + 1)
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open range `[start, end)` of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start.offset <= end.offset, "span ends before it starts");
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Span of the single-byte character at `pos`
    pub fn single(pos: Position) -> Self {
        Self::new(pos, Position::new(pos.offset + 1, pos.line, pos.column + 1))
    }

    /// Span for values that never appeared in a template
    pub fn dummy() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Template text covered by this span
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start.offset..self.end.offset).unwrap_or("")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}-{}", self.start, self.end.column)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A lexed value and where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned::new(f(self.value), self.span)
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Line index over a template
#[derive(Debug, Clone)]
pub struct SourceMap<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(offset, _)| offset + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// Text of 1-based line `line`, without its terminator
    pub fn get_line(&self, line: u32) -> Option<&'a str> {
        let index = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map_or(self.source.len(), |next| next - 1);
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// `error: message`, the location, and the offending line with a caret under `position`
    pub fn format_error(&self, position: Position, message: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "error: {}", message);
        let _ = writeln!(out, "  --> {}", position);

        if let Some(line) = self.get_line(position.line) {
            let number = position.line.to_string();
            let gutter = " ".repeat(number.len());
            let indent = " ".repeat(position.column.saturating_sub(1) as usize);
            let _ = writeln!(out, "{} |", gutter);
            let _ = writeln!(out, "{} | {}", number, line);
            let _ = writeln!(out, "{} | {}^", gutter, indent);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance_tracks_lines() {
        let pos = Position::start().advance('a').advance('\n').advance('é');
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
        assert_eq!(pos.offset, 2 + 'é'.len_utf8());
    }

    #[test]
    fn test_span_display_and_slice() {
        let source = "{$= i $}";
        let span = Span::single(Position::new(4, 1, 5));
        assert_eq!(span.to_string(), "1:5-6");
        assert_eq!(span.slice(source), "i");
        assert_eq!(span.len(), 1);
        assert!(Span::dummy().is_empty());

        let multi = Span::new(Position::start(), Position::new(12, 2, 3));
        assert_eq!(multi.to_string(), "1:1-2:3");
        assert_eq!(multi.slice("short"), "");
    }

    #[test]
    fn test_spanned_map_keeps_span() {
        let span = Span::single(Position::new(7, 1, 8));
        let doubled = Spanned::new(21, span).map(|n| n * 2);
        assert_eq!(doubled.span, span);
        assert_eq!(doubled.into_inner(), 42);
    }

    #[test]
    fn test_source_map_error_excerpt() {
        let source = "first line\r\nsecond {$ bad $}\nthird";
        let map = SourceMap::new(source);

        assert_eq!(map.get_line(1), Some("first line"));
        assert_eq!(map.get_line(3), Some("third"));
        assert_eq!(map.get_line(4), None);
        assert_eq!(map.get_line(0), None);

        let excerpt = map.format_error(Position::new(22, 2, 11), "unknown tag");
        assert!(excerpt.contains("--> 2:11"));
        assert!(excerpt.contains("2 | second {$ bad $}"));
        assert!(excerpt.ends_with("          ^\n"));
    }
}
