//! Diagnostic codes and their metadata
//!
//! `E0xx` codes are grouped by pipeline stage (file processing `E005`,
//! lexical `E020`, syntax `E040`, execution `E060`); `I0xx` codes mark a
//! stage completing. Each code has one row in the tables below.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const INVALID_ESCAPE: Code = Code::new("E021");
    pub const UNTERMINATED_STRING: Code = Code::new("E022");
    pub const UNTERMINATED_TAG: Code = Code::new("E023");
    pub const INVALID_NUMBER: Code = Code::new("E024");
    pub const INVALID_TAG_DELIMITER: Code = Code::new("E025");
    pub const READ_PAST_EOF: Code = Code::new("E026");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E027");
    pub const STRING_TOO_LARGE: Code = Code::new("E028");
    pub const TOO_MANY_TOKENS: Code = Code::new("E029");
}

/// Syntax analysis error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const UNKNOWN_TAG: Code = Code::new("E041");
    pub const UNMATCHED_END: Code = Code::new("E042");
    pub const UNCLOSED_BLOCK: Code = Code::new("E043");
    pub const INVALID_FOR_ARITY: Code = Code::new("E044");
    pub const INVALID_LOOP_VARIABLE: Code = Code::new("E045");
    pub const INVALID_NAME: Code = Code::new("E046");
    pub const UNCLOSED_TAG: Code = Code::new("E047");
}

/// Execution error codes
pub mod execution {
    use super::Code;

    pub const STACK_UNDERFLOW: Code = Code::new("E060");
    pub const UNBOUND_VARIABLE: Code = Code::new("E061");
    pub const DIVISION_BY_ZERO: Code = Code::new("E062");
    pub const UNKNOWN_FUNCTION: Code = Code::new("E063");
    pub const INVALID_OPERAND: Code = Code::new("E064");
    pub const ARITHMETIC_OVERFLOW: Code = Code::new("E065");
    pub const OUTPUT_FAILURE: Code = Code::new("E066");
    pub const FUNCTION_FAILURE: Code = Code::new("E067");
    pub const DUPLICATE_FUNCTION: Code = Code::new("E068");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I002");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I003");
    pub const PARSE_COMPLETE: Code = Code::new("I004");
    pub const RENDER_COMPLETE: Code = Code::new("I005");
}

// ============================================================================
// METADATA TABLES
// ============================================================================

use Severity::{Critical, High, Low, Medium};

/// `(code, severity, recoverable, requires_halt, description, recommended_action)`
type Row = (Code, Severity, bool, bool, &'static str, &'static str);

const FILE_PROCESSING_CODES: &[Row] = &[
    (
        file_processing::FILE_NOT_FOUND,
        Medium,
        false,
        false,
        "Template file not found",
        "Verify the template path exists",
    ),
    (
        file_processing::INVALID_EXTENSION,
        Low,
        true,
        false,
        "Template file has an unexpected extension",
        "Rename the template to use the .smscr extension",
    ),
    (
        file_processing::FILE_TOO_LARGE,
        High,
        false,
        false,
        "Template file exceeds the maximum allowed size",
        "Split the template or rebuild with a larger file size limit",
    ),
    (
        file_processing::EMPTY_FILE,
        Low,
        true,
        false,
        "Template file is empty",
        "Add content to the template",
    ),
    (
        file_processing::PERMISSION_DENIED,
        Medium,
        false,
        false,
        "Permission denied reading template file",
        "Check file permissions",
    ),
    (
        file_processing::INVALID_ENCODING,
        Medium,
        false,
        false,
        "Template file is not valid UTF-8",
        "Re-encode the template as UTF-8",
    ),
    (
        file_processing::IO_ERROR,
        High,
        false,
        false,
        "I/O error while reading template file",
        "Check the file system and retry",
    ),
    (
        file_processing::INVALID_PATH,
        High,
        false,
        true,
        "Template path is empty or not a regular file",
        "Pass the path of a template file",
    ),
    (
        success::FILE_PROCESSING_SUCCESS,
        Low,
        true,
        false,
        "Template file read successfully",
        "No action required",
    ),
];

const LEXICAL_CODES: &[Row] = &[
    (
        lexical::INVALID_CHARACTER,
        High,
        false,
        false,
        "Character not allowed inside a tag",
        "Remove the character or move it outside the tag",
    ),
    (
        lexical::INVALID_ESCAPE,
        High,
        false,
        false,
        "Invalid escape sequence",
        "Use \\\\ or \\{ in text and \\\\ \\\" \\n \\r \\t in strings",
    ),
    (
        lexical::UNTERMINATED_STRING,
        High,
        false,
        false,
        "String literal is not terminated",
        "Close the string literal with a double quote",
    ),
    (
        lexical::UNTERMINATED_TAG,
        High,
        false,
        false,
        "Tag is not terminated before end of input",
        "Close the tag with $}",
    ),
    (
        lexical::INVALID_NUMBER,
        High,
        false,
        false,
        "Malformed numeric literal",
        "Write numbers as integers or decimals, e.g. 42 or -3.5",
    ),
    (
        lexical::INVALID_TAG_DELIMITER,
        High,
        false,
        false,
        "Malformed tag delimiter",
        "Open tags with {$ and close them with $}, or escape a literal { as \\{",
    ),
    (
        lexical::READ_PAST_EOF,
        Critical,
        false,
        true,
        "Token requested after end of input",
        "Stop reading tokens once EOF has been returned",
    ),
    (
        lexical::IDENTIFIER_TOO_LONG,
        Medium,
        false,
        false,
        "Identifier exceeds maximum length",
        "Use a shorter variable or function name",
    ),
    (
        lexical::STRING_TOO_LARGE,
        High,
        false,
        false,
        "String literal exceeds maximum size",
        "Move large content into template text or parameters",
    ),
    (
        lexical::TOO_MANY_TOKENS,
        High,
        false,
        true,
        "Template produces too many tokens",
        "Split the template into smaller templates",
    ),
    (
        success::TOKENIZATION_COMPLETE,
        Low,
        true,
        false,
        "Tokenization completed",
        "No action required",
    ),
];

const SYNTAX_CODES: &[Row] = &[
    (
        syntax::UNEXPECTED_TOKEN,
        High,
        false,
        false,
        "Unexpected token",
        "Check the tag syntax near the reported position",
    ),
    (
        syntax::UNKNOWN_TAG,
        High,
        false,
        false,
        "Unknown tag name",
        "Use one of the tags =, FOR or END",
    ),
    (
        syntax::UNMATCHED_END,
        High,
        false,
        false,
        "END tag without an open FOR block",
        "Remove the END tag or add the matching FOR tag",
    ),
    (
        syntax::UNCLOSED_BLOCK,
        High,
        false,
        false,
        "FOR block is not closed before end of input",
        "Add a matching {$END$} tag",
    ),
    (
        syntax::INVALID_FOR_ARITY,
        High,
        false,
        false,
        "FOR tag has the wrong number of arguments",
        "Write FOR variable start end [step]",
    ),
    (
        syntax::INVALID_LOOP_VARIABLE,
        High,
        false,
        false,
        "First FOR argument is not a variable",
        "Start the FOR tag with a variable name",
    ),
    (
        syntax::INVALID_NAME,
        High,
        false,
        false,
        "Malformed variable or function name",
        "Names start with a letter, functions with @ followed by a letter",
    ),
    (syntax::UNCLOSED_TAG, High, false, false, "Tag was not closed", "Close the tag with $}"),
    (
        success::PARSE_COMPLETE,
        Low,
        true,
        false,
        "Template parsed into a document tree",
        "No action required",
    ),
];

const EXECUTION_CODES: &[Row] = &[
    (
        execution::STACK_UNDERFLOW,
        High,
        false,
        false,
        "Not enough values on the evaluation stack",
        "Check operator and function operand counts in the echo tag",
    ),
    (
        execution::UNBOUND_VARIABLE,
        High,
        false,
        false,
        "Variable is not bound",
        "Reference variables only inside the FOR block that defines them",
    ),
    (
        execution::DIVISION_BY_ZERO,
        High,
        false,
        false,
        "Division by zero",
        "Guard the divisor or change the template arithmetic",
    ),
    (
        execution::UNKNOWN_FUNCTION,
        High,
        false,
        false,
        "Unknown built-in function",
        "Register the function or fix its name",
    ),
    (
        execution::INVALID_OPERAND,
        High,
        false,
        false,
        "Operand cannot be used as a number",
        "Only numeric strings, integers, doubles and null take part in arithmetic",
    ),
    (
        execution::ARITHMETIC_OVERFLOW,
        High,
        false,
        false,
        "Integer arithmetic overflow",
        "Use double operands for large values",
    ),
    (
        execution::OUTPUT_FAILURE,
        Critical,
        false,
        true,
        "Writing to the output sink failed",
        "Check the output destination",
    ),
    (
        execution::FUNCTION_FAILURE,
        High,
        false,
        false,
        "Built-in function failed",
        "Check the arguments passed to the function",
    ),
    (
        execution::DUPLICATE_FUNCTION,
        Medium,
        false,
        false,
        "Function registered twice",
        "Register each built-in name once",
    ),
    (success::RENDER_COMPLETE, Low, true, false, "Template rendered", "No action required"),
];

const TABLES: &[(&str, &[Row])] = &[
    ("FileProcessing", FILE_PROCESSING_CODES),
    ("Lexical", LEXICAL_CODES),
    ("Syntax", SYNTAX_CODES),
    ("Execution", EXECUTION_CODES),
];

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    static REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        TABLES
            .iter()
            .flat_map(|(category, rows)| rows.iter().map(move |row| (*category, row)))
            .map(|(category, &(code, severity, recoverable, requires_halt, description, action))| {
                let metadata = ErrorMetadata {
                    code: code.as_str(),
                    category,
                    severity,
                    recoverable,
                    requires_halt,
                    description,
                    recommended_action: action,
                };
                (metadata.code, metadata)
            })
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Field of `code`'s metadata, or `fallback` for codes outside the tables
fn lookup<T>(code: &str, field: impl FnOnce(&'static ErrorMetadata) -> T, fallback: T) -> T {
    get_error_metadata(code).map_or(fallback, field)
}

pub fn get_severity(code: &str) -> Severity {
    lookup(code, |m| m.severity, Severity::Medium)
}

/// Unknown codes are treated as recoverable
pub fn is_recoverable(code: &str) -> bool {
    lookup(code, |m| m.recoverable, true)
}

pub fn requires_halt(code: &str) -> bool {
    lookup(code, |m| m.requires_halt, false)
}

pub fn get_description(code: &str) -> &'static str {
    lookup(code, |m| m.description, "Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    lookup(code, |m| m.recommended_action, "No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    lookup(code, |m| m.category, "Unknown")
}
