//! Parse errors with error code mapping and span-accurate reporting

use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::utils::Span;

pub type ParseResult<T> = Result<T, ParseError>;

/// Template parse errors. Every error aborts the whole parse.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error("Unexpected token: expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unknown tag '{name}' at {span}")]
    UnknownTag { name: String, span: Span },

    #[error("END tag without an open FOR block at {span}")]
    UnmatchedEnd { span: Span },

    #[error("{open_blocks} FOR block(s) still open at end of input (innermost opened at {span})")]
    UnclosedBlock { open_blocks: usize, span: Span },

    #[error("FOR tag takes 3 or 4 arguments, found {count} at {span}")]
    InvalidForArity { count: usize, span: Span },

    #[error("FOR tag must start with a variable, found {found} at {span}")]
    InvalidLoopVariable { found: String, span: Span },

    #[error("Invalid {expected} name '{name}' at {span}")]
    InvalidName {
        expected: &'static str,
        name: String,
        span: Span,
    },

    #[error("Tag opened at {span} is never closed")]
    UnclosedTag { span: Span },
}

impl ParseError {
    /// Create unexpected token error
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::Lexer(error) => error.error_code(),
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnknownTag { .. } => codes::syntax::UNKNOWN_TAG,
            Self::UnmatchedEnd { .. } => codes::syntax::UNMATCHED_END,
            Self::UnclosedBlock { .. } => codes::syntax::UNCLOSED_BLOCK,
            Self::InvalidForArity { .. } => codes::syntax::INVALID_FOR_ARITY,
            Self::InvalidLoopVariable { .. } => codes::syntax::INVALID_LOOP_VARIABLE,
            Self::InvalidName { .. } => codes::syntax::INVALID_NAME,
            Self::UnclosedTag { .. } => codes::syntax::UNCLOSED_TAG,
        }
    }

    /// Get span if available
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer(error) => error.position().map(Span::single),
            Self::UnexpectedToken { span, .. }
            | Self::UnknownTag { span, .. }
            | Self::UnmatchedEnd { span }
            | Self::UnclosedBlock { span, .. }
            | Self::InvalidForArity { span, .. }
            | Self::InvalidLoopVariable { span, .. }
            | Self::InvalidName { span, .. }
            | Self::UnclosedTag { span } => Some(*span),
        }
    }

    /// Check if the failure came from the lexer
    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::Lexer(_))
    }

    /// Get error severity
    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    /// Get error description
    pub fn description(&self) -> &'static str {
        codes::get_description(self.error_code().as_str())
    }

    /// Get recommended action
    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_lexer_errors_keep_their_code() {
        let error: ParseError = LexerError::UnterminatedTag {
            position: Position::new(3, 1, 4),
        }
        .into();

        assert!(error.is_lexical());
        assert_eq!(error.error_code(), codes::lexical::UNTERMINATED_TAG);
        assert_eq!(error.span().map(|s| s.start()), Some(Position::new(3, 1, 4)));
    }

    #[test]
    fn test_classification_uses_code_registry() {
        let error = ParseError::UnmatchedEnd {
            span: Span::single(Position::start()),
        };
        assert_eq!(error.error_code(), codes::syntax::UNMATCHED_END);
        assert_ne!(error.description(), "Unknown error");
        assert_eq!(error.to_string(), "END tag without an open FOR block at 1:1-2");
    }
}
