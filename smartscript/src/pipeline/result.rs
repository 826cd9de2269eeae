use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::nodes::DocumentNode;
use serde::Serialize;
use std::time::Duration;

/// Shape of a parsed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    /// Nodes including the document root
    pub node_count: usize,
    /// Deepest FOR nesting
    pub max_depth: usize,
    pub token_count: usize,
}

impl DocumentStats {
    pub fn collect(document: &DocumentNode, metrics: &LexicalMetrics) -> Self {
        Self {
            node_count: document.node_count(),
            max_depth: document.max_depth(),
            token_count: metrics.total_tokens,
        }
    }
}

/// Outcome of compiling and rendering one template
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub stats: DocumentStats,
    /// Present when the template came from a file
    pub file_metadata: Option<FileMetadata>,
    pub source_bytes: usize,
    pub bytes_written: usize,
    pub compile_duration: Duration,
    pub render_duration: Duration,
}

impl RenderResult {
    pub fn total_duration(&self) -> Duration {
        self.compile_duration + self.render_duration
    }

    pub fn log_success(&self) {
        crate::log_success!(
            crate::logging::codes::success::RENDER_COMPLETE,
            "Template rendered",
            "nodes" => self.stats.node_count,
            "max_depth" => self.stats.max_depth,
            "tokens" => self.stats.token_count,
            "source_bytes" => self.source_bytes,
            "bytes_written" => self.bytes_written,
            "compile_ms" => format!("{:.2}", self.compile_duration.as_secs_f64() * 1000.0),
            "render_ms" => format!("{:.2}", self.render_duration.as_secs_f64() * 1000.0)
        );
    }
}
