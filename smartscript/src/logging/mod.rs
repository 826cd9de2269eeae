//! Global logging module for SmartScript
//!
//! Provides thread-safe global logging with per-thread template context and a
//! small macro interface. Until [`init_global_logging`] runs, every macro is a
//! no-op, so the library stays silent when embedded.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::utils::Span;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static TEMPLATE_CONTEXT: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Install the logger described by `SMARTSCRIPT_LOGGING_*`
///
/// Fails if the limit profile is unusable or a logger is already installed.
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config()?;
    let service = Arc::new(service::create_configured_service());
    init_global_logging_with_service(Arc::clone(&service))?;

    service.log_event(
        LogEvent::success(codes::success::SYSTEM_INITIALIZATION_COMPLETED, "Logging initialized")
            .with_context("settings", &config::get_config_summary()),
    );
    Ok(())
}

/// Install a caller-built service, e.g. a [`MemoryLogger`] in tests or `--verbose` in the CLI
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// TEMPLATE CONTEXT
// ============================================================================

/// Restores the enclosing template path when a scope ends, even by unwinding
struct TemplateScope {
    previous: Option<PathBuf>,
}

impl Drop for TemplateScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        TEMPLATE_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    }
}

/// Run `f` with `template_path` attached to every event it logs
pub fn with_template_context<F, R>(template_path: PathBuf, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _scope = TemplateScope {
        previous: TEMPLATE_CONTEXT.with(|ctx| ctx.borrow_mut().replace(template_path)),
    };
    f()
}

pub fn get_current_template() -> Option<PathBuf> {
    TEMPLATE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT
// ============================================================================

/// Context fields as produced by the logging macros
pub type Fields = Vec<(&'static str, String)>;

/// Whether `log_debug!` would reach a logger
pub fn debug_enabled() -> bool {
    try_get_global_logger().is_some_and(|logger| logger.should_log(LogLevel::Debug))
}

/// Attach fields and the current template, then hand the event to the global logger
pub fn log_event_with_context(event: LogEvent, fields: Fields) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    let mut event = fields
        .iter()
        .fold(event, |event, (key, value)| event.with_context(key, value));
    if let Some(template) = get_current_template() {
        event = event.with_context("template", &template.display().to_string());
    }
    logger.log_event(event);
}

pub fn log_error_with_context(code: Code, message: &str, span: Option<Span>, fields: Fields) {
    let event = LogEvent::error(code, message);
    let event = match span {
        Some(span) => event.with_span(span),
        None => event,
    };
    log_event_with_context(event, fields);
}
