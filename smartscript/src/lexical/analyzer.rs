//! Two-mode lexer for SmartScript templates
//!
//! The lexer never switches modes on its own: the parser calls
//! [`Lexer::set_mode`] after it sees `{$` and again after `$}`. Outside tags
//! ([`LexerMode::Basic`]) raw text is collected; inside tags
//! ([`LexerMode::InsideTag`]) names, numerals, operators and string literals
//! are produced.

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{Operator, Token, TokenKind};
use crate::utils::{parse_numeral, Numeral, Position, Span, Spanned};
use std::iter::Peekable;
use std::str::Chars;

/// Lexical analysis errors with compile-time security boundaries
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' inside tag at {position}")]
    InvalidCharacter { character: char, position: Position },

    #[error("Invalid escape sequence '{sequence}' at {position}")]
    InvalidEscape { sequence: String, position: Position },

    #[error("Unterminated string literal starting at {position}")]
    UnterminatedString { position: Position },

    #[error("Unterminated tag: end of input reached at {position}")]
    UnterminatedTag { position: Position },

    #[error("Invalid number format '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },

    #[error("Expected '$' after '{{' at {position}")]
    InvalidTagStart { position: Position },

    #[error("Expected '}}' after '$' at {position}")]
    InvalidTagEnd { position: Position },

    #[error("Token requested after end of input at {position}")]
    ReadPastEof { position: Position },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH}) at {position}")]
    IdentifierTooLong { length: usize, position: Position },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE}) at {position}")]
    StringTooLarge { size: usize, position: Position },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::InvalidEscape { .. } => codes::lexical::INVALID_ESCAPE,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::UnterminatedTag { .. } => codes::lexical::UNTERMINATED_TAG,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::InvalidTagStart { .. } | LexerError::InvalidTagEnd { .. } => {
                codes::lexical::INVALID_TAG_DELIMITER
            }
            LexerError::ReadPastEof { .. } => codes::lexical::READ_PAST_EOF,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    /// Position where the problem was detected
    pub fn position(&self) -> Option<Position> {
        match self {
            LexerError::InvalidCharacter { position, .. }
            | LexerError::InvalidEscape { position, .. }
            | LexerError::UnterminatedString { position }
            | LexerError::UnterminatedTag { position }
            | LexerError::InvalidNumber { position, .. }
            | LexerError::InvalidTagStart { position }
            | LexerError::InvalidTagEnd { position }
            | LexerError::ReadPastEof { position }
            | LexerError::IdentifierTooLong { position, .. }
            | LexerError::StringTooLarge { position, .. } => Some(*position),
            LexerError::TooManyTokens { .. } => None,
        }
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

/// Lexer operating mode, driven by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexerMode {
    /// Outside tags: raw text with `\\` and `\{` escapes
    #[default]
    Basic,
    /// Between `{$` and `$}`
    InsideTag,
}

/// Token counters gathered while lexing
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub text_tokens: usize,
    pub string_tokens: usize,
    pub numeric_tokens: usize,
    pub operator_tokens: usize,
    pub identifier_tokens: usize,
    pub tag_count: usize,
    pub max_string_length: usize,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;

        if !preferences.collect_detailed_metrics {
            return;
        }

        match token.kind() {
            TokenKind::Text => self.text_tokens += 1,
            TokenKind::String => self.string_tokens += 1,
            TokenKind::Integer | TokenKind::Double => self.numeric_tokens += 1,
            TokenKind::Operator => self.operator_tokens += 1,
            TokenKind::Identifier => self.identifier_tokens += 1,
            TokenKind::TagStart => self.tag_count += 1,
            TokenKind::TagEnd | TokenKind::Eof => {}
        }
    }

    pub(crate) fn record_string_length(&mut self, length: usize) {
        self.max_string_length = self.max_string_length.max(length);
    }
}

/// Pull-based SmartScript lexer
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    position: Position,
    mode: LexerMode,
    finished: bool,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_preferences(source, LexicalPreferences::default())
    }

    pub fn with_preferences(source: &'a str, preferences: LexicalPreferences) -> Self {
        Self {
            chars: source.chars().peekable(),
            position: Position::start(),
            mode: LexerMode::Basic,
            finished: false,
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    pub fn set_mode(&mut self, mode: LexerMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> LexerMode {
        self.mode
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    /// Produce the next token in the current mode.
    ///
    /// After [`Token::Eof`] has been returned once, every further call fails
    /// with [`LexerError::ReadPastEof`].
    pub fn next_token(&mut self) -> Result<Spanned<Token>, LexerError> {
        if self.finished {
            return Err(LexerError::ReadPastEof {
                position: self.position,
            });
        }

        if self.metrics.total_tokens >= MAX_TOKEN_COUNT {
            return Err(LexerError::TooManyTokens {
                count: self.metrics.total_tokens,
            });
        }

        let token = match self.mode {
            LexerMode::Basic => self.lex_basic()?,
            LexerMode::InsideTag => self.lex_inside_tag()?,
        };

        if token.value.is_eof() {
            self.finished = true;
        }
        self.metrics.record_token(&token.value, &self.preferences);

        Ok(token)
    }

    // ========================================================================
    // CHARACTER CURSOR
    // ========================================================================

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.position = self.position.advance(ch);
        Some(ch)
    }

    fn finish(&self, token: Token, start: Position) -> Spanned<Token> {
        Spanned::new(token, Span::new(start, self.position))
    }

    // ========================================================================
    // BASIC MODE
    // ========================================================================

    fn lex_basic(&mut self) -> Result<Spanned<Token>, LexerError> {
        let start = self.position;

        match self.peek_char() {
            None => Ok(self.finish(Token::Eof, start)),
            Some('{') => {
                self.bump();
                if self.peek_char() == Some('$') {
                    self.bump();
                    Ok(self.finish(Token::TagStart, start))
                } else {
                    Err(LexerError::InvalidTagStart { position: start })
                }
            }
            Some(_) => {
                let text = self.read_text()?;
                Ok(self.finish(Token::Text(text), start))
            }
        }
    }

    fn read_text(&mut self) -> Result<String, LexerError> {
        let mut text = String::new();

        while let Some(ch) = self.peek_char() {
            match ch {
                '{' => break,
                '\\' => {
                    let escape_position = self.position;
                    self.bump();
                    match self.bump() {
                        Some(escaped @ ('\\' | '{')) => text.push(escaped),
                        other => {
                            return Err(LexerError::InvalidEscape {
                                sequence: escape_sequence(other),
                                position: escape_position,
                            })
                        }
                    }
                }
                _ => {
                    self.bump();
                    text.push(ch);
                }
            }
        }

        Ok(text)
    }

    // ========================================================================
    // INSIDE-TAG MODE
    // ========================================================================

    fn lex_inside_tag(&mut self) -> Result<Spanned<Token>, LexerError> {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.bump();
        }

        let start = self.position;
        let Some(ch) = self.peek_char() else {
            return Err(LexerError::UnterminatedTag { position: start });
        };

        match ch {
            '$' => {
                self.bump();
                if self.peek_char() == Some('}') {
                    self.bump();
                    Ok(self.finish(Token::TagEnd, start))
                } else {
                    Err(LexerError::InvalidTagEnd { position: start })
                }
            }
            '"' => {
                let value = self.read_string(start)?;
                Ok(self.finish(Token::Str(value), start))
            }
            '-' => {
                self.bump();
                if self.peek_char().is_some_and(is_numeral_char) {
                    let token = self.read_numeral(start, String::from("-"))?;
                    Ok(self.finish(token, start))
                } else {
                    Ok(self.finish(Token::Operator(Operator::Sub), start))
                }
            }
            c if is_numeral_char(c) => {
                let token = self.read_numeral(start, String::new())?;
                Ok(self.finish(token, start))
            }
            c if is_identifier_start(c) => {
                let name = self.read_identifier(start)?;
                Ok(self.finish(Token::Identifier(name), start))
            }
            c => match Operator::from_char(c) {
                Some(op) => {
                    self.bump();
                    Ok(self.finish(Token::Operator(op), start))
                }
                None => Err(LexerError::InvalidCharacter {
                    character: c,
                    position: start,
                }),
            },
        }
    }

    fn read_numeral(&mut self, start: Position, mut text: String) -> Result<Token, LexerError> {
        while let Some(ch) = self.peek_char().filter(|c| is_numeral_char(*c)) {
            self.bump();
            text.push(ch);
        }

        match parse_numeral(&text) {
            Some(Numeral::Integer(value)) => Ok(Token::Integer(value)),
            Some(Numeral::Double(value)) => Ok(Token::Double(value)),
            None => Err(LexerError::InvalidNumber {
                text,
                position: start,
            }),
        }
    }

    fn read_identifier(&mut self, start: Position) -> Result<String, LexerError> {
        let mut name = String::new();

        while let Some(ch) = self.peek_char().filter(|c| is_identifier_char(*c)) {
            self.bump();
            name.push(ch);
            // `=` closes the identifier so `{$=i$}` lexes as `=` then `i`
            if ch == '=' {
                break;
            }
        }

        let length = name.chars().count();
        if length > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong {
                length,
                position: start,
            });
        }

        Ok(name)
    }

    fn read_string(&mut self, start: Position) -> Result<String, LexerError> {
        self.bump();
        let mut value = String::new();

        loop {
            let Some(ch) = self.peek_char() else {
                return Err(LexerError::UnterminatedString { position: start });
            };

            match ch {
                '"' => {
                    self.bump();
                    break;
                }
                '\\' => {
                    let escape_position = self.position;
                    self.bump();
                    let resolved = match self.bump() {
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        None => return Err(LexerError::UnterminatedString { position: start }),
                        other => {
                            return Err(LexerError::InvalidEscape {
                                sequence: escape_sequence(other),
                                position: escape_position,
                            })
                        }
                    };
                    value.push(resolved);
                }
                _ => {
                    self.bump();
                    value.push(ch);
                }
            }

            if value.len() > MAX_STRING_SIZE {
                return Err(LexerError::StringTooLarge {
                    size: value.len(),
                    position: start,
                });
            }
        }

        self.metrics.record_string_length(value.len());
        Ok(value)
    }
}

fn escape_sequence(escaped: Option<char>) -> String {
    match escaped {
        Some(ch) => format!("\\{}", ch),
        None => "\\".to_string(),
    }
}

fn is_numeral_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '.'
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || matches!(ch, '_' | '@' | '=')
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '@' | '=')
}
