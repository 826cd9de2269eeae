//! SmartScript: a small templating language
//!
//! Templates mix literal text with `{$ ... $}` tags. `{$= ... $}` echoes the
//! result of a postfix expression and `{$FOR var start end [step]$} ... {$END$}`
//! repeats its body. Source is tokenized by [`lexical`], parsed by [`syntax`]
//! into a [`nodes::DocumentNode`], and rendered by [`execution`].

// Internal modules
#[macro_use]
pub mod logging;
pub mod config;
pub mod elements;
pub mod execution;
pub mod file_processor;
pub mod lexical;
pub mod nodes;
pub mod pipeline;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use elements::Element;
pub use execution::{ExecutionError, RequestContext, SmartScriptEngine, Value};
pub use nodes::{DocumentNode, Node, SourceWriter};
pub use pipeline::{PipelineError, RenderResult};
pub use syntax::{parse, ParseError};
