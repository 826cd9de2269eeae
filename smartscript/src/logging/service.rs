//! Loggers and the level-filtering service in front of them
//!
//! Rendered template output owns stdout, so every logger here writes to stderr.

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Drops events above `max_level` before they reach the logger
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    max_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, max_level: LogLevel) -> Self {
        Self { logger, max_level }
    }

    /// Logger and level taken from `SMARTSCRIPT_LOGGING_*`
    pub fn with_config() -> Self {
        let logger: Arc<dyn Logger> = if config::use_structured_logging() {
            Arc::new(StructuredLogger)
        } else {
            Arc::new(ConsoleLogger)
        };
        Self::new(logger, config::get_min_log_level())
    }

    /// `Error` is the most severe level and always passes
    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.max_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }
}

fn write_stderr(line: &str) {
    // A closed stderr must not take the render down with it
    let _ = writeln!(std::io::stderr().lock(), "{}", line);
}

/// `[LEVEL] code message` lines
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        write_stderr(&event.format());
    }
}

/// One JSON object per line
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        let line = event.format_json().unwrap_or_else(|_| event.format());
        write_stderr(&line);
    }
}

/// Keeps the most recent events in memory; used by tests and embedders
pub struct MemoryLogger {
    capacity: usize,
    events: Mutex<VecDeque<LogEvent>>,
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::with_capacity(config::get_error_buffer_size())
    }
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|events| events.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    fn any(&self, predicate: impl Fn(&LogEvent) -> bool) -> bool {
        self.events
            .lock()
            .map(|events| events.iter().any(predicate))
            .unwrap_or(false)
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.any(|event| event.is_error() && event.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.any(|event| event.is_info() && event.code == code)
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            if events.len() == self.capacity {
                events.pop_front();
            }
            events.push_back(event.clone());
        }
    }
}

pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_service_filters_by_level() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Warning);

        service.log_event(LogEvent::error(codes::execution::DIVISION_BY_ZERO, "div"));
        service.log_event(LogEvent::warning("careful"));
        service.log_event(LogEvent::info("noise"));
        service.log_event(LogEvent::debug("more noise"));

        assert_eq!(memory.event_count(), 2);
        assert!(memory.has_error_with_code(codes::execution::DIVISION_BY_ZERO));
    }

    #[test]
    fn test_memory_logger_records_success() {
        let memory = MemoryLogger::new();
        memory.log(&LogEvent::success(codes::success::PARSE_COMPLETE, "parsed"));

        assert!(memory.has_success_with_code(codes::success::PARSE_COMPLETE));
        assert!(!memory.has_error_with_code(codes::success::PARSE_COMPLETE));
    }

    #[test]
    fn test_memory_logger_drops_oldest() {
        let memory = MemoryLogger::with_capacity(2);
        for message in ["first", "second", "third"] {
            memory.log(&LogEvent::info(message));
        }

        let messages: Vec<String> = memory.get_events().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["second", "third"]);
    }

    #[test]
    fn test_should_log_ordering() {
        let service = LoggingService::new(Arc::new(MemoryLogger::new()), LogLevel::Info);
        assert!(service.should_log(LogLevel::Error));
        assert!(service.should_log(LogLevel::Info));
        assert!(!service.should_log(LogLevel::Debug));
    }
}
