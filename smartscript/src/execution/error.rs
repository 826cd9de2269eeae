//! Runtime errors raised while rendering a template

use crate::logging::{codes, Code};

pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Errors from the per-key value stack
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MultistackError {
    #[error("Multistack entry '{key}' is empty")]
    EmptyEntry { key: String },
}

impl MultistackError {
    pub fn key(&self) -> &str {
        match self {
            Self::EmptyEntry { key } => key,
        }
    }
}

/// Render failures. Each one aborts the current render.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    #[error("Stack underflow: '{operation}' needs {required} operand(s), found {available}")]
    StackUnderflow {
        operation: String,
        required: usize,
        available: usize,
    },

    #[error("Variable '{name}' is not bound")]
    UnboundVariable { name: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow evaluating '{operation}'")]
    ArithmeticOverflow { operation: String },

    #[error("Invalid operand '{value}': {reason}")]
    InvalidOperand { value: String, reason: String },

    #[error("Unknown function '@{name}'")]
    UnknownFunction { name: String },

    #[error("Function '@{name}' failed: {reason}")]
    FunctionFailed { name: String, reason: String },

    #[error("Function '@{name}' is already registered")]
    DuplicateFunction { name: String },

    #[error("Failed to write output: {message}")]
    Output { message: String },

    #[error(transparent)]
    Multistack(#[from] MultistackError),
}

impl From<std::io::Error> for ExecutionError {
    fn from(error: std::io::Error) -> Self {
        Self::Output {
            message: error.to_string(),
        }
    }
}

impl ExecutionError {
    pub fn invalid_operand(value: impl Into<String>, reason: &str) -> Self {
        Self::InvalidOperand {
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn function_failed(name: &str, reason: impl Into<String>) -> Self {
        Self::FunctionFailed {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::StackUnderflow { .. } => codes::execution::STACK_UNDERFLOW,
            Self::UnboundVariable { .. } | Self::Multistack(_) => {
                codes::execution::UNBOUND_VARIABLE
            }
            Self::DivisionByZero => codes::execution::DIVISION_BY_ZERO,
            Self::ArithmeticOverflow { .. } => codes::execution::ARITHMETIC_OVERFLOW,
            Self::InvalidOperand { .. } => codes::execution::INVALID_OPERAND,
            Self::UnknownFunction { .. } => codes::execution::UNKNOWN_FUNCTION,
            Self::FunctionFailed { .. } => codes::execution::FUNCTION_FAILURE,
            Self::DuplicateFunction { .. } => codes::execution::DUPLICATE_FUNCTION,
            Self::Output { .. } => codes::execution::OUTPUT_FAILURE,
        }
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_become_output_failures() {
        let error: ExecutionError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed").into();
        assert_eq!(
            error,
            ExecutionError::Output {
                message: "pipe closed".into()
            }
        );
        assert_eq!(error.error_code(), codes::execution::OUTPUT_FAILURE);
    }

    #[test]
    fn test_multistack_errors_convert() {
        let error: ExecutionError = MultistackError::EmptyEntry { key: "i".into() }.into();
        assert_eq!(error.to_string(), "Multistack entry 'i' is empty");
        assert_ne!(error.description(), "Unknown error");
    }
}
