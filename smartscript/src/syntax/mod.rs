//! Syntax analysis: template source to node tree
//!
//! [`parse`] is the main entry point. It drives the lexer through both modes
//! and either returns a complete [`DocumentNode`] or the first error found;
//! partial trees are never returned.

mod error;
mod parser;

pub use error::{ParseError, ParseResult};
pub use parser::{ParsedTemplate, Parser};

use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::nodes::DocumentNode;
use crate::{log_debug, log_error, log_success};

/// Parse a template with default preferences
pub fn parse(source: &str) -> ParseResult<DocumentNode> {
    parse_with_preferences(source, LexicalPreferences::default()).map(|parsed| parsed.document)
}

/// Parse a template, returning the tree and lexer metrics
pub fn parse_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> ParseResult<ParsedTemplate> {
    log_debug!("Starting syntax analysis", "source_bytes" => source.len());

    let include_positions = preferences.include_position_in_errors;
    let result = Parser::with_preferences(source, preferences).parse_template();

    match &result {
        Ok(parsed) => {
            log_success!(codes::success::PARSE_COMPLETE, "Syntax analysis completed",
                "nodes" => parsed.document.node_count(),
                "max_depth" => parsed.document.max_depth(),
                "tokens" => parsed.metrics.total_tokens
            );
        }
        Err(error) => match error.span().filter(|_| include_positions) {
            Some(span) => log_error!(error.error_code(), "Syntax analysis failed",
                span = span,
                "error" => error
            ),
            None => log_error!(error.error_code(), "Syntax analysis failed",
                "error" => error
            ),
        },
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_returns_document() {
        let document = parse("{$FOR i 1 5 2$}{$=i$}{$END$}").unwrap();
        assert_eq!(document.node_count(), 3);
    }

    #[test]
    fn test_parse_with_preferences_reports_metrics() {
        let preferences = LexicalPreferences {
            collect_detailed_metrics: true,
            include_position_in_errors: false,
        };
        let parsed = parse_with_preferences("x{$= \"s\" $}", preferences).unwrap();
        assert_eq!(parsed.metrics.string_tokens, 1);
        assert_eq!(parsed.metrics.tag_count, 1);
    }

    #[test]
    fn test_parse_errors_are_not_partial() {
        assert_matches!(parse("ok {$END$}"), Err(ParseError::UnmatchedEnd { .. }));
    }
}
