//! Error types for the csv2ttl generation pipeline.
//!
//! This module defines one error type per concern:
//!
//! - [`CsvError`] - CSV reading and decoding errors
//! - [`ConfigError`] - Mapping configuration errors (schema, validation, namespaces)
//! - [`GenerateError`] - Top-level generation errors
//! - [`RegistryError`] - Stored configuration registry errors
//! - [`ServerError`] - HTTP API errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Anomalies inside a single row (blank cells, identifiers that canonicalize
//! to nothing, duplicate resources) are never errors: they are skipped and
//! counted in [`crate::transform::GenerationStats`].

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading tabular input.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content.
    #[error("Invalid CSV format: {0}")]
    Parse(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Two columns share the same header.
    #[error("Duplicate column header: {0}")]
    DuplicateHeader(String),

    /// The csv reader only splits on single ASCII bytes.
    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(char),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors in a mapping configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more entities lack a required field. All problems are listed.
    #[error("Invalid configuration: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    /// The JSON document does not match the configuration schema.
    #[error("Configuration does not match schema: {}", errors.join("; "))]
    Schema { errors: Vec<String> },

    /// JSON serialization/deserialization error.
    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Attempt to remove one of `rdf`, `rdfs`, `xsd`.
    #[error("Namespace prefix '{0}' is reserved and cannot be removed")]
    ReservedPrefix(String),

    /// A column referenced while editing the configuration does not exist.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

// =============================================================================
// Generation Errors (top-level)
// =============================================================================

/// Top-level generation errors.
///
/// This is the error returned by [`crate::transform::generate`]. Both
/// variants specific to generation are raised before any Turtle is produced.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No usable rows after blank rows were filtered.
    #[error("No rows to convert")]
    EmptyInput,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerateError {
    /// Validation messages when the error is an aggregated validation failure.
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            GenerateError::Config(ConfigError::Validation { errors }) => Some(errors),
            _ => None,
        }
    }
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors from the stored configuration registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Configuration not found.
    #[error("Configuration not found: {0}")]
    NotFound(String),

    /// Stored file holds something other than a configuration.
    #[error("Invalid stored configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("Registry IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Registry JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Generation error.
    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
