//! Lexical analysis for SmartScript templates
//!
//! The parser drives a [`Lexer`] directly and switches its mode at tag
//! boundaries. [`tokenize`] performs the same mode switching itself and is
//! used for token dumps and diagnostics.

pub mod analyzer;

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{SpannedToken, Token};
use crate::utils::Span;
use crate::{log_debug, log_error, log_success};

pub use analyzer::{Lexer, LexerError, LexerMode, LexicalMetrics};

// ============================================================================
// MODULE API
// ============================================================================

/// Tokenize a whole template, following tag boundaries
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, LexerError> {
    tokenize_with_preferences(source, LexicalPreferences::default())
}

/// Tokenize with custom runtime preferences (security limits stay compile-time)
pub fn tokenize_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> Result<Vec<SpannedToken>, LexerError> {
    log_debug!("Starting lexical analysis",
        "source_bytes" => source.len(),
        "max_tokens_allowed" => MAX_TOKEN_COUNT
    );

    let include_positions = preferences.include_position_in_errors;
    let mut lexer = Lexer::with_preferences(source, preferences);
    let mut tokens = Vec::new();

    loop {
        let token = match lexer.next_token() {
            Ok(token) => token,
            Err(error) => {
                log_lexer_error(&error, include_positions);
                return Err(error);
            }
        };

        match token.value {
            Token::TagStart => lexer.set_mode(LexerMode::InsideTag),
            Token::TagEnd => lexer.set_mode(LexerMode::Basic),
            _ => {}
        }

        let done = token.value.is_eof();
        tokens.push(token);
        if done {
            break;
        }
    }

    let metrics = lexer.metrics();
    log_success!(codes::success::TOKENIZATION_COMPLETE, "Lexical analysis completed",
        "tokens" => metrics.total_tokens,
        "tags" => metrics.tag_count,
        "max_string_length" => metrics.max_string_length
    );

    Ok(tokens)
}

/// Log a lexer failure, with its position when the preference allows it
pub(crate) fn log_lexer_error(error: &LexerError, include_positions: bool) {
    match error.position().filter(|_| include_positions) {
        Some(position) => log_error!(error.error_code(), &error.to_string(),
            span = Span::single(position),
            "action" => error.recommended_action()
        ),
        None => log_error!(error.error_code(), &error.to_string(),
            "action" => error.recommended_action()
        ),
    }
}

// ============================================================================
// SECURITY LIMITS
// ============================================================================

/// Get the current compile-time security limits (for reporting/debugging)
pub fn get_security_limits() -> SecurityLimits {
    SecurityLimits {
        max_string_size: MAX_STRING_SIZE,
        max_identifier_length: MAX_IDENTIFIER_LENGTH,
        max_token_count: MAX_TOKEN_COUNT,
    }
}

/// Information about compile-time security limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityLimits {
    pub max_string_size: usize,
    pub max_identifier_length: usize,
    pub max_token_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{Operator, TokenKind};
    use assert_matches::assert_matches;

    #[test]
    fn test_tokenize_switches_modes() {
        let tokens = tokenize("a{$FOR i 1 3$}b{$= i 2 * $}{$END$}").unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.value.kind()).collect();

        assert_eq!(
            kinds,
            vec![
                TokenKind::Text,
                TokenKind::TagStart,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Integer,
                TokenKind::Integer,
                TokenKind::TagEnd,
                TokenKind::Text,
                TokenKind::TagStart,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Integer,
                TokenKind::Operator,
                TokenKind::TagEnd,
                TokenKind::TagStart,
                TokenKind::Identifier,
                TokenKind::TagEnd,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[12].value, Token::Operator(Operator::Mul));
    }

    #[test]
    fn test_tokenize_reports_first_error() {
        assert_matches!(tokenize("ok {$= 1"), Err(LexerError::UnterminatedTag { .. }));
        assert_matches!(tokenize("{$ \"x $}"), Err(LexerError::UnterminatedString { .. }));
    }

    #[test]
    fn test_tokenize_empty_source() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].value.is_eof());
    }

    #[test]
    fn test_security_limits_are_positive() {
        let limits = get_security_limits();
        assert!(limits.max_string_size > 0);
        assert!(limits.max_identifier_length > 0);
        assert!(limits.max_token_count > 0);
    }
}
