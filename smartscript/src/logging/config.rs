//! Effective logging settings
//!
//! Buffer sizes and message limits come from `compile_time::logging`; level
//! and output format come from [`LoggingPreferences`], read once per process.

use super::events::LogLevel;
use crate::config::compile_time::logging::{
    LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LENGTH, SECURITY_MIN_LOG_LEVEL,
};
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

const MIN_BUFFER_SIZE: usize = 100;
const MIN_MESSAGE_LENGTH: usize = 64;

fn preferences() -> &'static LoggingPreferences {
    static PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();
    PREFERENCES.get_or_init(LoggingPreferences::default)
}

/// Threshold for the configured service: the user's level, but never below the security floor
pub fn get_min_log_level() -> LogLevel {
    preferences()
        .min_log_level
        .to_events_log_level()
        .max(get_security_log_level())
}

pub fn use_structured_logging() -> bool {
    preferences().use_structured_logging
}

/// Level that stays visible whatever the user asks for
pub fn get_security_log_level() -> LogLevel {
    match SECURITY_MIN_LOG_LEVEL {
        0 => LogLevel::Error,
        1 => LogLevel::Warning,
        _ => LogLevel::Info,
    }
}

/// Capacity of a [`super::MemoryLogger`] built from configuration
pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Reject limit profiles too small to log anything useful
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE < MIN_BUFFER_SIZE {
        return Err(format!(
            "log_buffer_size is {}, need at least {}",
            LOG_BUFFER_SIZE, MIN_BUFFER_SIZE
        ));
    }
    if MAX_LOG_MESSAGE_LENGTH < MIN_MESSAGE_LENGTH {
        return Err(format!(
            "max_log_message_length is {}, need at least {}",
            MAX_LOG_MESSAGE_LENGTH, MIN_MESSAGE_LENGTH
        ));
    }
    Ok(())
}

/// One-line description of the effective settings, logged at startup
pub fn get_config_summary() -> String {
    format!(
        "level={} floor={} structured={} buffer={} max_message={}",
        get_min_log_level().as_str(),
        get_security_log_level().as_str(),
        use_structured_logging(),
        LOG_BUFFER_SIZE,
        MAX_LOG_MESSAGE_LENGTH,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_profiles_validate() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_min_level_respects_security_floor() {
        assert!(get_min_log_level() >= get_security_log_level());
        assert!(get_security_log_level() <= LogLevel::Info);
    }

    #[test]
    fn test_config_summary() {
        let summary = get_config_summary();
        assert!(summary.starts_with("level="));
        assert!(summary.contains(&format!("buffer={}", LOG_BUFFER_SIZE)));
    }
}
