//! Error types for promptkit operations.
//!
//! This module defines [`PromptkitError`], the primary error type used
//! throughout the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Validation and casting errors are fail-fast and surface verbatim
//! - Backend errors keep their [`BackendError`] classification unchanged
//! - Use `anyhow::Error` (via `PromptkitError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

use crate::backend::BackendError;

/// Core error type for promptkit operations.
#[derive(Debug, Error)]
pub enum PromptkitError {
    /// Template store I/O or parse failure.
    #[error("Template manager error: {message}")]
    TemplateManager { message: String },

    /// A command referenced a template that does not exist.
    #[error("Template not found: {name}")]
    UnknownTemplate { name: String },

    /// Template definition violates the schema.
    #[error("Invalid template field '{field}': {message}")]
    TemplateValidation { field: String, message: String },

    /// A variable value does not match its declared type.
    #[error("Invalid value '{value}' for variable '{key}': {message}")]
    InputValidation {
        key: String,
        value: String,
        message: String,
    },

    /// A `{{file: ...}}` reference could not be resolved.
    #[error("Failed to include {path}: {message}")]
    FileInclusion { path: PathBuf, message: String },

    /// A file includes itself, directly or through other files.
    #[error("Circular file inclusion detected: {chain}")]
    InclusionCycle { chain: String },

    /// Configuration file or environment could not be loaded.
    #[error("Failed to load config from {origin}: {message}")]
    ConfigLoad { origin: String, message: String },

    /// Configuration could not be written back to disk.
    #[error("Failed to save config to {path}: {message}")]
    ConfigSave { path: PathBuf, message: String },

    /// Generation backend failure.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PromptkitError {
    /// Shorthand for a [`PromptkitError::TemplateManager`] error.
    pub fn manager(message: impl Into<String>) -> Self {
        Self::TemplateManager {
            message: message.into(),
        }
    }

    /// Shorthand for a [`PromptkitError::TemplateValidation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for promptkit operations.
pub type Result<T> = std::result::Result<T, PromptkitError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendErrorKind;

    #[test]
    fn template_manager_displays_message() {
        let err = PromptkitError::manager("cannot create /nope");
        assert!(err.to_string().contains("cannot create /nope"));
    }

    #[test]
    fn unknown_template_displays_name() {
        let err = PromptkitError::UnknownTemplate {
            name: "summarize".into(),
        };
        assert!(err.to_string().contains("summarize"));
    }

    #[test]
    fn validation_displays_field_and_message() {
        let err = PromptkitError::validation("input_variables.topic", "missing description");
        let msg = err.to_string();
        assert!(msg.contains("input_variables.topic"));
        assert!(msg.contains("missing description"));
    }

    #[test]
    fn input_validation_displays_key_and_value() {
        let err = PromptkitError::InputValidation {
            key: "count".into(),
            value: "abc".into(),
            message: "expected a number".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("count"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn inclusion_cycle_displays_chain() {
        let err = PromptkitError::InclusionCycle {
            chain: "a.md -> b.md -> a.md".into(),
        };
        assert!(err.to_string().contains("a.md -> b.md -> a.md"));
    }

    #[test]
    fn config_load_displays_origin() {
        let err = PromptkitError::ConfigLoad {
            origin: "/home/me/.promptkit.yaml".into(),
            message: "bad yaml".into(),
        };
        assert!(err.to_string().contains("/home/me/.promptkit.yaml"));
    }

    #[test]
    fn backend_error_is_transparent() {
        let err: PromptkitError =
            BackendError::new(BackendErrorKind::RateLimit, "slow down").into();
        assert!(matches!(err, PromptkitError::Backend(_)));
        assert!(err.to_string().contains("slow down"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: PromptkitError = io_err.into();
        assert!(matches!(err, PromptkitError::Io(_)));
    }
}
