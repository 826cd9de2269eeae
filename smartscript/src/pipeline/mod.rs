//! End-to-end template processing: file -> parse -> render
//!
//! Each stage logs its own start and outcome; the pipeline adds the
//! template path to every event and logs around the execution engine.

mod error;
mod result;

pub use error::PipelineError;
pub use result::{DocumentStats, RenderResult};

use crate::config::runtime::LexicalPreferences;
use crate::execution::{RequestContext, SmartScriptEngine};
use crate::file_processor::{self, FileMetadata};
use crate::logging;
use crate::nodes::DocumentNode;
use crate::syntax::{self, ParsedTemplate};
use crate::{log_error, log_info};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

/// Parse template source into a document
pub fn compile_source(source: &str) -> Result<DocumentNode, PipelineError> {
    compile(source).map(|parsed| parsed.document)
}

/// Read and parse a template file
pub fn compile_file(file_path: impl AsRef<Path>) -> Result<DocumentNode, PipelineError> {
    let file_path = file_path.as_ref();
    logging::with_template_context(file_path.to_path_buf(), || {
        let file_result = file_processor::process_file(file_path)?;
        compile_source(&file_result.source)
    })
}

/// Parse and render template source through `context`
pub fn render_source(
    source: &str,
    context: &mut RequestContext<'_>,
) -> Result<RenderResult, PipelineError> {
    log_info!("Starting template render", "source_bytes" => source.len());
    render(source, None, context)
}

/// Read, parse and render a template file through `context`
pub fn render_file(
    file_path: impl AsRef<Path>,
    context: &mut RequestContext<'_>,
) -> Result<RenderResult, PipelineError> {
    let file_path = file_path.as_ref();
    logging::with_template_context(file_path.to_path_buf(), || {
        log_info!("Starting template file render", "file" => file_path.display());

        let file_result = file_processor::process_file(file_path)?;
        render(&file_result.source, Some(file_result.metadata), context)
    })
}

/// Render source to a string with request parameters only
pub fn render_to_string(
    source: &str,
    parameters: HashMap<String, String>,
) -> Result<String, PipelineError> {
    let mut output = Vec::new();
    let mut persistent = HashMap::new();
    {
        let mut context = RequestContext::new(&mut output, parameters, &mut persistent);
        render_source(source, &mut context)?;
    }
    Ok(String::from_utf8_lossy(&output).into_owned())
}

// ============================================================================
// STAGES
// ============================================================================

fn compile(source: &str) -> Result<ParsedTemplate, PipelineError> {
    Ok(syntax::parse_with_preferences(
        source,
        LexicalPreferences::default(),
    )?)
}

fn render(
    source: &str,
    file_metadata: Option<FileMetadata>,
    context: &mut RequestContext<'_>,
) -> Result<RenderResult, PipelineError> {
    let compile_start = Instant::now();
    let parsed = compile(source)?;
    let compile_duration = compile_start.elapsed();

    let stats = DocumentStats::collect(&parsed.document, &parsed.metrics);
    let (bytes_written, render_duration) = execute(&parsed.document, context)?;

    let result = RenderResult {
        stats,
        file_metadata,
        source_bytes: source.len(),
        bytes_written,
        compile_duration,
        render_duration,
    };
    result.log_success();
    Ok(result)
}

fn execute(
    document: &DocumentNode,
    context: &mut RequestContext<'_>,
) -> Result<(usize, Duration), PipelineError> {
    let written_before = context.bytes_written();
    let start = Instant::now();

    if let Err(error) = SmartScriptEngine::new(document).execute(context) {
        log_error!(error.error_code(), "Template execution failed",
            "error" => error,
            "bytes_written" => context.bytes_written() - written_before
        );
        return Err(error.into());
    }

    Ok((context.bytes_written() - written_before, start.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionError;
    use crate::file_processor::FileProcessorError;
    use crate::syntax::ParseError;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_compile_source() {
        let document = compile_source("a{$FOR i 1 2$}{$= i $}{$END$}").unwrap();
        assert_eq!(document.node_count(), 4);
        assert_matches!(
            compile_source("{$FOR i 1$}"),
            Err(PipelineError::Parse(ParseError::InvalidForArity { .. }))
        );
    }

    #[test]
    fn test_render_source_reports_stats() {
        let mut output = Vec::new();
        let mut persistent = HashMap::new();
        let mut context = RequestContext::new(&mut output, HashMap::new(), &mut persistent);

        let result =
            render_source("{$FOR i 1 3$}{$FOR j 1 2$}x{$END$}{$END$}", &mut context).unwrap();
        drop(context);

        assert_eq!(output, b"xxxxxx");
        assert_eq!(result.bytes_written, 6);
        assert_eq!(result.stats.max_depth, 2);
        assert_eq!(result.stats.node_count, 4);
        assert!(result.file_metadata.is_none());
        assert!(result.total_duration() >= result.render_duration);
    }

    #[test]
    fn test_render_to_string_uses_parameters() {
        let parameters = HashMap::from([("name".to_string(), "Ana".to_string())]);
        let output =
            render_to_string("Hi {$= \"name\" \"stranger\" @paramGet $}!", parameters).unwrap();
        assert_eq!(output, "Hi Ana!");
        assert_eq!(
            render_to_string("Hi {$= \"name\" \"stranger\" @paramGet $}!", HashMap::new())
                .unwrap(),
            "Hi stranger!"
        );
    }

    #[test]
    fn test_render_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("counter.smscr");
        fs::write(
            &file_path,
            "{$= \"hits\" 0 @pparamGet 1 + \"hits\" @pparamSet $}hits={$= \"hits\" \"?\" @pparamGet $}",
        )
        .unwrap();

        let mut persistent = HashMap::new();
        for expected in ["hits=1", "hits=2"] {
            let mut output = Vec::new();
            let mut context = RequestContext::new(&mut output, HashMap::new(), &mut persistent);
            let result = render_file(&file_path, &mut context).unwrap();
            drop(context);

            assert_eq!(String::from_utf8(output).unwrap(), expected);
            assert!(result.file_metadata.is_some());
        }
        assert_eq!(persistent.get("hits").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_errors_name_their_stage() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.smscr");
        let error = compile_file(&missing).unwrap_err();
        assert_matches!(
            error,
            PipelineError::FileProcessing(FileProcessorError::FileNotFound { .. })
        );
        assert_eq!(error.stage(), "file_processing");

        let error = render_to_string("{$= \"open", HashMap::new()).unwrap_err();
        assert_eq!(error.stage(), "lexical");
        assert!(error.span().is_some());

        let error = render_to_string("{$END$}", HashMap::new()).unwrap_err();
        assert_eq!(error.stage(), "syntax");

        let error = render_to_string("ok {$= 1 0 / $}", HashMap::new()).unwrap_err();
        assert_matches!(error, PipelineError::Execution(ExecutionError::DivisionByZero));
        assert_eq!(error.stage(), "execution");
        assert_eq!(error.error_code().as_str(), "E062");
    }
}
