use crate::execution::ExecutionError;
use crate::file_processor::FileProcessorError;
use crate::logging::{codes, Code};
use crate::syntax::ParseError;
use crate::utils::Span;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Rendering failed: {0}")]
    Execution(#[from] ExecutionError),
}

impl PipelineError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(error) => error.error_code(),
            Self::Parse(error) => error.error_code(),
            Self::Execution(error) => error.error_code(),
        }
    }

    /// Source location, for errors raised while parsing
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Parse(error) => error.span(),
            _ => None,
        }
    }

    /// Name of the stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileProcessing(_) => "file_processing",
            Self::Parse(error) if error.is_lexical() => "lexical",
            Self::Parse(_) => "syntax",
            Self::Execution(_) => "execution",
        }
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}
