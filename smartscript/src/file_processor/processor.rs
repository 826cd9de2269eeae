//! Loading template files from disk

use crate::config::compile_time::file_processing::{LARGE_FILE_THRESHOLD, MAX_FILE_SIZE};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::{codes, Code};
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Extension expected on template files
pub const TEMPLATE_EXTENSION: &str = "smscr";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("template not found: {path}")]
    FileNotFound { path: String },

    #[error("expected a .{} template, got {}", TEMPLATE_EXTENSION, describe_extension(.extension))]
    InvalidExtension { extension: Option<String> },

    #[error("template is {size} bytes, the limit is {max_size}")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("template is empty")]
    EmptyFile,

    #[error("no permission to read {path}")]
    PermissionDenied { path: String },

    #[error("{path} is not valid UTF-8")]
    InvalidEncoding { path: String },

    #[error("cannot read template: {message}")]
    IoError { message: String },

    #[error("'{path}' is not a template file path")]
    InvalidPath { path: String },
}

fn describe_extension(extension: &Option<String>) -> String {
    match extension {
        Some(extension) => format!(".{}", extension),
        None => "no extension".to_string(),
    }
}

impl FileProcessorError {
    pub fn error_code(&self) -> Code {
        use codes::file_processing::*;
        match self {
            Self::FileNotFound { .. } => FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => INVALID_EXTENSION,
            Self::FileTooLarge { .. } => FILE_TOO_LARGE,
            Self::EmptyFile => EMPTY_FILE,
            Self::PermissionDenied { .. } => PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => INVALID_ENCODING,
            Self::IoError { .. } => IO_ERROR,
            Self::InvalidPath { .. } => INVALID_PATH,
        }
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    fn io(path: &Path, error: io::Error) -> Self {
        let path_text = path.display().to_string();
        match error.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound { path: path_text },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path: path_text },
            io::ErrorKind::InvalidData => Self::InvalidEncoding { path: path_text },
            _ => Self::IoError {
                message: format!("{}: {}", path_text, error),
            },
        }
    }
}

/// What was learned about a template file while loading it
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical path
    pub path: PathBuf,
    pub size: u64,
    /// Lowercased, without the dot
    pub extension: Option<String>,
    pub line_count: usize,
}

impl FileMetadata {
    pub fn is_template_file(&self) -> bool {
        self.extension.as_deref() == Some(TEMPLATE_EXTENSION)
    }

    /// Above the profile's `large_file_threshold`; such templates are logged with a warning
    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }

    pub fn human_readable_size(&self) -> String {
        human_readable(self.size)
    }
}

fn human_readable(bytes: u64) -> String {
    const STEPS: [(u64, &str); 3] = [(1 << 30, "GB"), (1 << 20, "MB"), (1 << 10, "KB")];

    STEPS
        .iter()
        .find(|(unit, _)| bytes >= *unit)
        .map(|(unit, name)| format!("{:.2} {}", bytes as f64 / *unit as f64, name))
        .unwrap_or_else(|| format!("{} B", bytes))
}

/// A loaded template
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }
}

/// Reads templates, applying the compile-time size limit and the runtime extension policy
#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_template_extension: bool,
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self::from_preferences(&FileProcessorPreferences::default())
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_template_extension: prefs.require_template_extension,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_template_extension_required(self, required: bool) -> Self {
        Self {
            require_template_extension: required,
            ..self
        }
    }

    pub fn with_performance_logging(self, enabled: bool) -> Self {
        Self {
            enable_performance_logging: enabled,
            ..self
        }
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    /// Load `file_path` as template source
    pub fn process_file(
        &self,
        file_path: impl AsRef<Path>,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let file_path = file_path.as_ref();
        let started = Instant::now();
        log_debug!("Loading template", "file" => file_path.display());

        match self.load(file_path) {
            Ok((source, metadata)) => {
                let result = FileProcessingResult {
                    source,
                    metadata,
                    processing_duration: started.elapsed(),
                };
                self.log_loaded(&result);
                Ok(result)
            }
            Err(error) => {
                log_error!(error.error_code(), "Template could not be loaded",
                    "file" => file_path.display(),
                    "error" => error
                );
                Err(error)
            }
        }
    }

    fn load(&self, file_path: &Path) -> Result<(String, FileMetadata), FileProcessorError> {
        let (path, size) = locate(file_path)?;
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);

        if size > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size,
                max_size: MAX_FILE_SIZE,
            });
        }
        if size == 0 {
            return Err(FileProcessorError::EmptyFile);
        }
        if self.require_template_extension && extension.as_deref() != Some(TEMPLATE_EXTENSION) {
            return Err(FileProcessorError::InvalidExtension { extension });
        }

        let source = fs::read_to_string(&path).map_err(|error| FileProcessorError::io(&path, error))?;
        let metadata = FileMetadata {
            line_count: source.lines().count(),
            path,
            size,
            extension,
        };
        Ok((source, metadata))
    }

    fn log_loaded(&self, result: &FileProcessingResult) {
        let metadata = &result.metadata;
        if metadata.is_large_file() {
            crate::log_warning!("Large template",
                "file" => metadata.path.display(),
                "size" => metadata.human_readable_size()
            );
        }

        if self.enable_performance_logging {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Template loaded",
                "file" => metadata.path.display(),
                "size" => metadata.human_readable_size(),
                "lines" => metadata.line_count,
                "chars" => result.char_count(),
                "duration_ms" => format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0)
            );
        } else {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Template loaded",
                "file" => metadata.path.display()
            );
        }
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical path and byte size of a regular file
fn locate(file_path: &Path) -> Result<(PathBuf, u64), FileProcessorError> {
    if file_path.as_os_str().is_empty() {
        return Err(FileProcessorError::InvalidPath {
            path: String::new(),
        });
    }

    let stat = fs::metadata(file_path).map_err(|error| FileProcessorError::io(file_path, error))?;
    if !stat.is_file() {
        return Err(FileProcessorError::InvalidPath {
            path: file_path.display().to_string(),
        });
    }

    let path = file_path
        .canonicalize()
        .map_err(|error| FileProcessorError::io(file_path, error))?;
    Ok((path, stat.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn processor() -> FileProcessor {
        FileProcessor {
            require_template_extension: false,
            enable_performance_logging: true,
        }
    }

    fn write(dir: &tempfile::TempDir, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_loads_source_and_metadata() {
        let dir = tempdir().unwrap();
        let content = "Hello\n{$= \"world\" $}\n";
        let path = write(&dir, "page.smscr", content);

        let result = processor().process_file(&path).unwrap();
        assert_eq!(result.source, content);
        assert_eq!(result.metadata.line_count, 2);
        assert_eq!(result.metadata.size, content.len() as u64);
        assert!(result.metadata.is_template_file());
        assert!(!result.metadata.is_large_file());
        assert_eq!(result.char_count(), content.chars().count());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let error = processor()
            .process_file(dir.path().join("missing.smscr"))
            .unwrap_err();
        assert_matches!(error, FileProcessorError::FileNotFound { .. });
        assert!(error.to_string().starts_with("template not found"));
    }

    #[test]
    fn test_directory_and_empty_path_are_invalid() {
        let dir = tempdir().unwrap();
        assert_matches!(
            processor().process_file(dir.path()),
            Err(FileProcessorError::InvalidPath { .. })
        );
        assert_matches!(
            processor().process_file(""),
            Err(FileProcessorError::InvalidPath { .. })
        );
    }

    #[test]
    fn test_compile_time_file_size_limit() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "large.smscr", "a".repeat((MAX_FILE_SIZE + 1) as usize));

        assert_matches!(
            processor().process_file(&path),
            Err(FileProcessorError::FileTooLarge { size, max_size })
                if size == MAX_FILE_SIZE + 1 && max_size == MAX_FILE_SIZE
        );
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "empty.smscr", "");
        assert_matches!(processor().process_file(&path), Err(FileProcessorError::EmptyFile));
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "page.txt", "content");

        assert!(processor().process_file(&path).is_ok());
        let error = processor()
            .with_template_extension_required(true)
            .process_file(&path)
            .unwrap_err();
        assert_matches!(
            error,
            FileProcessorError::InvalidExtension { extension: Some(ref ext) } if ext == "txt"
        );
        assert_eq!(error.to_string(), "expected a .smscr template, got .txt");
        assert_eq!(
            FileProcessorError::InvalidExtension { extension: None }.to_string(),
            "expected a .smscr template, got no extension"
        );
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "PAGE.SMSCR", "content");

        let result = processor()
            .with_template_extension_required(true)
            .process_file(&path)
            .unwrap();
        assert_eq!(result.metadata.extension.as_deref(), Some("smscr"));
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "binary.smscr", [0x66, 0x6f, 0xff, 0xfe]);
        assert_matches!(
            processor().process_file(&path),
            Err(FileProcessorError::InvalidEncoding { .. })
        );
    }

    #[test]
    fn test_error_classification() {
        let error = FileProcessorError::FileNotFound {
            path: "page.smscr".to_string(),
        };
        assert_eq!(error.error_code(), codes::file_processing::FILE_NOT_FOUND);
        assert_eq!(error.category(), "FileProcessing");
        assert_eq!(error.severity(), "Medium");
        assert!(!error.is_recoverable());
        assert_eq!(
            FileProcessorError::InvalidPath { path: String::new() }.error_code().as_str(),
            "E012"
        );
    }

    #[test]
    fn test_human_readable_size() {
        assert_eq!(human_readable(512), "512 B");
        assert_eq!(human_readable(2048), "2.00 KB");
        assert_eq!(human_readable(3 * 1024 * 1024), "3.00 MB");
    }
}
