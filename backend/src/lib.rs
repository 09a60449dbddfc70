//! # csv2ttl - CSV to RDF Turtle conversion
//!
//! csv2ttl turns tabular data into a Turtle document driven by a mapping
//! configuration: which entity types exist, which column identifies each of
//! them, and how every column maps onto predicates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│        Generator         │────▶│   Turtle    │
//! │  (ISO/UTF8) │     │ (auto-delim)│     │ validate → link → emit   │     │  (.ttl)     │
//! └─────────────┘     └─────────────┘     └──────────────────────────┘     └─────────────┘
//!                                                      ▲
//!                                         mapping configuration (JSON)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use csv2ttl::{generate, parse_csv_str, Config, EntityConfig, PropertyMapping, XSD_STRING};
//!
//! let rows = parse_csv_str("id,title\n42,O'Brien's Tale\n", ',')?.rows;
//! let config = Config::default().with_entity(
//!     EntityConfig::new("Pub", "id", "ex:Publication")
//!         .with_property(PropertyMapping::literal("title", ["dc:title"], XSD_STRING)),
//! );
//! let generation = generate(&config, &rows)?;
//! print!("{}", generation.turtle);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Mapping configuration
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Canonicalization, linking, emission and serialization
//! - [`validation`] - Configuration validation
//! - [`cache`] - Stored configurations
//! - [`api`] - HTTP API server and logs

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Stored configurations
pub mod cache;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConfigResult, CsvError, CsvResult, GenerateError, GenerateResult, RegistryError,
    RegistryResult, ServerError, ServerResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Config, EntityConfig, EntitySelection, MappingKind, Namespaces, PropertyMapping, Row,
    DEFAULT_BASE_URI, DEFAULT_SPLIT_DELIMITER, XSD_STRING,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    ensure_valid, is_valid, load_config_json, validate, validate_config, validate_config_document,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, infer_datatype, parse_bytes_auto,
    parse_csv_file_auto, parse_csv_str, ParseResult,
};

// =============================================================================
// Re-exports - Generation
// =============================================================================

pub use transform::{
    canonicalize, emit_statements, format_delimiter, generate, generate_from_csv,
    generate_from_csv_file, link_relationships, serialize_turtle, CsvGeneration, CsvInfo,
    Generation, GenerationStage, GenerationStats, Generator,
};

// =============================================================================
// Re-exports - Registry
// =============================================================================

pub use cache::{ConfigRegistry, StoredConfig};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, GenerateRequest, GenerateResponse, ScaffoldRequest};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
