//! Configuration
//!
//! [`compile_time`] holds the limits `build.rs` generates from
//! `config/<profile>.toml` (profile chosen by `SMARTSCRIPT_BUILD_PROFILE`);
//! [`runtime`] holds preferences read from the environment at startup.

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

#[cfg(test)]
mod tests {
    use super::compile_time::*;

    #[test]
    fn test_generated_limits_are_consistent() {
        assert!(file_processing::LARGE_FILE_THRESHOLD <= file_processing::MAX_FILE_SIZE);
        assert!(lexical::MAX_IDENTIFIER_LENGTH > 0);
        assert!(lexical::MAX_STRING_SIZE > 0);
        assert!(logging::SECURITY_MIN_LOG_LEVEL <= 2);
    }

    #[test]
    fn test_profile_is_recorded() {
        assert!(!PROFILE.is_empty());
    }
}
