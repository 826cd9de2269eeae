//! Runtime preferences read from `SMARTSCRIPT_*` environment variables
//!
//! Unlike the limits in `compile_time`, these can change per process.

use crate::logging::events::LogLevel as EventLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Read `name` from the environment, falling back to `default` when unset or unparsable
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Reject template paths without the `.smscr` extension
    pub require_template_extension: bool,

    /// Log file metrics after a successful read
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_template_extension: env_or(env_vars::REQUIRE_TEMPLATE_EXTENSION, false),
            enable_performance_logging: env_or(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Count tokens per kind while lexing
    pub collect_detailed_metrics: bool,

    /// Attach line/column to logged lexer failures
    pub include_position_in_errors: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_or(env_vars::LEXICAL_DETAILED_METRICS, true),
            include_position_in_errors: env_or(env_vars::LEXICAL_INCLUDE_POSITIONS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPreferences {
    /// Mime type a fresh request context starts with
    pub default_mime_type: String,
}

impl Default for ExecutionPreferences {
    fn default() -> Self {
        let mime_type: String = env_or(env_vars::EXECUTION_DEFAULT_MIME_TYPE, String::new());
        Self {
            default_mime_type: if mime_type.is_empty() {
                "text/html".to_string()
            } else {
                mime_type
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// JSON lines instead of the human-readable format
    pub use_structured_logging: bool,

    /// Events below this level are dropped
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            min_log_level: env_or(env_vars::LOGGING_MIN_LEVEL, LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Same level in the logging module's event enum
    pub fn to_events_log_level(&self) -> EventLevel {
        match self {
            LogLevel::Error => EventLevel::Error,
            LogLevel::Warning => EventLevel::Warning,
            LogLevel::Info => EventLevel::Info,
            LogLevel::Debug => EventLevel::Debug,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level.to_ascii_lowercase().as_str() {
            "error" | "0" => Ok(LogLevel::Error),
            "warning" | "warn" | "1" => Ok(LogLevel::Warning),
            "info" | "2" => Ok(LogLevel::Info),
            "debug" | "3" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Parse a log level name or number, as accepted in `SMARTSCRIPT_LOGGING_MIN_LEVEL`
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    level.parse().ok()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub execution: ExecutionPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_TEMPLATE_EXTENSION: &str = "SMARTSCRIPT_REQUIRE_TEMPLATE_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "SMARTSCRIPT_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "SMARTSCRIPT_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_INCLUDE_POSITIONS: &str = "SMARTSCRIPT_LEXICAL_INCLUDE_POSITIONS";

    // Execution
    pub const EXECUTION_DEFAULT_MIME_TYPE: &str = "SMARTSCRIPT_DEFAULT_MIME_TYPE";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SMARTSCRIPT_LOGGING_USE_STRUCTURED";
    pub const LOGGING_MIN_LEVEL: &str = "SMARTSCRIPT_LOGGING_MIN_LEVEL";
}
