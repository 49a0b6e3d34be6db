//! Error handling for Hall processing operations.
//!
//! Provides the error taxonomy used across the pipeline: structural parse
//! failures, value-level format failures, unit resolution failures and
//! archive store conflicts, plus the I/O and configuration plumbing around
//! them.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the Hall processor
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for Hall processing operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Content does not match the section/step/chunk grammar
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// A single value could not be converted (durations, timestamps)
    #[error("Format error for '{field}': {message} (value: '{value}')")]
    Format {
        field: String,
        value: String,
        message: String,
    },

    /// Unit string could not be resolved to a dimension and factor
    #[error("Unit error for '{unit}': {message}")]
    Unit { unit: String, message: String },

    /// Existing archive differs from the freshly computed one
    #[error(
        "Archive '{filename}' already exists with different content. Remove the existing archive or rerun with overwrite enabled"
    )]
    StoreConflict { filename: String },

    /// Serializing or deserializing an archive document failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a structural parse error
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a value-level format error
    pub fn format(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Format {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a unit resolution error
    pub fn unit(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unit {
            unit: unit.into(),
            message: message.into(),
        }
    }

    /// Create a store conflict error
    pub fn store_conflict(filename: impl Into<String>) -> Self {
        Self::StoreConflict {
            filename: filename.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML: {}", error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON: {}", error),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid TOML: {}", error),
        }
    }
}
