//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Bounded resource that a capacity check guards
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    /// Global ion index (collection region columns)
    Ions,
    /// Isotope records
    Isotopes,
    /// Spatial collection bins
    Bins,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Ions => "ion index",
            Resource::Isotopes => "isotope count",
            Resource::Bins => "bin index",
        };
        f.write_str(name)
    }
}

/// Main error type for TRIFIC operations
#[derive(Error, Debug)]
pub enum TrificError {
    /// I/O errors (read/write failures on an opened stream)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration errors (invalid CLI arguments or geometry)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Structural errors in the collision log
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A value fell outside a configured upper bound
    #[error("Capacity exceeded: {resource} {value} is outside the configured limit of {limit}")]
    CapacityExceeded {
        resource: Resource,
        value: i64,
        limit: usize,
    },
}

/// Type alias for Results using TrificError
pub type Result<T> = std::result::Result<T, TrificError>;

impl TrificError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a capacity error
    pub fn capacity(resource: Resource, value: i64, limit: usize) -> Self {
        Self::CapacityExceeded {
            resource,
            value,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_names_resource() {
        let err = TrificError::capacity(Resource::Ions, 10_000, 10_000);
        let msg = err.to_string();
        assert!(msg.contains("ion index"));
        assert!(msg.contains("10000"));
    }

    #[test]
    fn test_parse_message_has_line() {
        let err = TrificError::parse(12, "collision row before any isotope header");
        assert_eq!(
            err.to_string(),
            "Parse error at line 12: collision row before any isotope header"
        );
    }
}
