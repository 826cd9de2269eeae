//! Template file loading
//!
//! The size ceiling comes from the build profile; whether the `.smscr`
//! extension is enforced, and how much gets logged, are runtime preferences.

mod processor;

pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, TEMPLATE_EXTENSION,
};

use crate::config::runtime::FileProcessorPreferences;
use std::path::Path;

/// Load a template using the `SMARTSCRIPT_*` preferences of this process
pub fn process_file(path: impl AsRef<Path>) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(path)
}

pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}

pub fn get_max_file_size() -> u64 {
    FileProcessor::max_file_size()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::compile_time::file_processing::MAX_FILE_SIZE;

    #[test]
    fn test_process_file_uses_environment_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.smscr");
        std::fs::write(&path, "Hello {$= \"there\" $}").unwrap();

        let loaded = process_file(&path).unwrap();
        assert_eq!(loaded.metadata.line_count, 1);
        assert!(loaded.metadata.path.is_absolute());
    }

    #[test]
    fn test_processor_from_preferences() {
        let processor = create_processor_from_preferences(&FileProcessorPreferences {
            require_template_extension: true,
            enable_performance_logging: false,
        });
        assert!(processor.require_template_extension);
        assert!(!processor.enable_performance_logging);
    }

    #[test]
    fn test_max_file_size_comes_from_build_profile() {
        assert_eq!(get_max_file_size(), MAX_FILE_SIZE);
    }
}
