//! Per-render request context: output sink plus parameter maps
//!
//! Request parameters are read-only. Persistent parameters are borrowed from
//! the caller, who decides how long they live. Temporary parameters exist
//! for one render only.

use crate::config::runtime::ExecutionPreferences;
use std::collections::HashMap;
use std::io::{self, Write};

pub struct RequestContext<'a> {
    output: &'a mut dyn Write,
    parameters: HashMap<String, String>,
    persistent_parameters: &'a mut HashMap<String, String>,
    temporary_parameters: HashMap<String, String>,
    mime_type: String,
    bytes_written: usize,
}

impl<'a> RequestContext<'a> {
    pub fn new(
        output: &'a mut dyn Write,
        parameters: HashMap<String, String>,
        persistent_parameters: &'a mut HashMap<String, String>,
    ) -> Self {
        Self::with_preferences(
            output,
            parameters,
            persistent_parameters,
            &ExecutionPreferences::default(),
        )
    }

    pub fn with_preferences(
        output: &'a mut dyn Write,
        parameters: HashMap<String, String>,
        persistent_parameters: &'a mut HashMap<String, String>,
        preferences: &ExecutionPreferences,
    ) -> Self {
        Self {
            output,
            parameters,
            persistent_parameters,
            temporary_parameters: HashMap::new(),
            mime_type: preferences.default_mime_type.clone(),
            bytes_written: 0,
        }
    }

    // ========================================================================
    // OUTPUT
    // ========================================================================

    pub fn write(&mut self, text: &str) -> io::Result<()> {
        self.write_bytes(text.as_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.write_all(bytes)?;
        self.bytes_written += bytes.len();
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }

    /// Bytes successfully written through this context
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn set_mime_type(&mut self, mime_type: impl Into<String>) {
        self.mime_type = mime_type.into();
    }

    // ========================================================================
    // PARAMETERS
    // ========================================================================

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        sorted_names(&self.parameters)
    }

    pub fn persistent_parameter(&self, name: &str) -> Option<&str> {
        self.persistent_parameters.get(name).map(String::as_str)
    }

    pub fn persistent_parameter_names(&self) -> Vec<&str> {
        sorted_names(self.persistent_parameters)
    }

    pub fn set_persistent_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.persistent_parameters.insert(name.into(), value.into());
    }

    pub fn remove_persistent_parameter(&mut self, name: &str) -> Option<String> {
        self.persistent_parameters.remove(name)
    }

    pub fn temporary_parameter(&self, name: &str) -> Option<&str> {
        self.temporary_parameters.get(name).map(String::as_str)
    }

    pub fn temporary_parameter_names(&self) -> Vec<&str> {
        sorted_names(&self.temporary_parameters)
    }

    pub fn set_temporary_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.temporary_parameters.insert(name.into(), value.into());
    }

    pub fn remove_temporary_parameter(&mut self, name: &str) -> Option<String> {
        self.temporary_parameters.remove(name)
    }
}

fn sorted_names(map: &HashMap<String, String>) -> Vec<&str> {
    let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
