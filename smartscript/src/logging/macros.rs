//! Logging macros
//!
//! Context values may be anything that implements `Display`; they are only
//! formatted when a global logger is installed.

/// Turn `"key" => value` pairs into owned fields
#[doc(hidden)]
#[macro_export]
macro_rules! __log_fields {
    () => {
        ::std::vec::Vec::<(&'static str, ::std::string::String)>::new()
    };
    ($($key:expr => $value:expr),+) => {
        ::std::vec![$(($key, ::std::format!("{}", $value))),+]
    };
}

/// `log_error!(code, message [, span = s] [, "key" => value ...])`
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::is_initialized() {
            $crate::logging::log_error_with_context(
                $code,
                $message,
                Some($span),
                $crate::__log_fields!($($key => $value),*),
            )
        }
    };
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::is_initialized() {
            $crate::logging::log_error_with_context(
                $code,
                $message,
                None,
                $crate::__log_fields!($($key => $value),*),
            )
        }
    };
}

/// `log_success!(code, message [, "key" => value ...])`
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::is_initialized() {
            $crate::logging::log_event_with_context(
                $crate::logging::LogEvent::success($code, $message),
                $crate::__log_fields!($($key => $value),*),
            )
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::is_initialized() {
            $crate::logging::log_event_with_context(
                $crate::logging::LogEvent::info($message),
                $crate::__log_fields!($($key => $value),*),
            )
        }
    };
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::is_initialized() {
            $crate::logging::log_event_with_context(
                $crate::logging::LogEvent::warning($message),
                $crate::__log_fields!($($key => $value),*),
            )
        }
    };
}

/// Fields are not even formatted unless debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::log_event_with_context(
                $crate::logging::LogEvent::debug($message),
                $crate::__log_fields!($($key => $value),*),
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;

    #[test]
    fn test_macros_accept_display_values() {
        // No global logger in unit tests: every macro must be a silent no-op
        let size: u64 = 1024;
        let path = std::path::PathBuf::from("page.smscr");
        let span = crate::utils::Span::dummy();

        log_error!(codes::lexical::INVALID_ESCAPE, "Invalid escape",
            "line" => 3,
            "char" => 'q'
        );
        log_error!(codes::syntax::UNMATCHED_END, "Stray END", span = span);
        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenized",
            "tokens" => 12,
            "size" => size,
        );
        log_info!("Rendering", "file" => path.display());
        log_warning!("Large template");
        log_debug!("Mode switch", "mode" => "InsideTag");
    }

    #[test]
    fn test_fields_are_owned_strings() {
        let fields = crate::__log_fields!("a" => 1, "b" => 2.5);
        assert_eq!(fields, vec![("a", "1".to_string()), ("b", "2.5".to_string())]);
        assert!(crate::__log_fields!().is_empty());
    }
}
