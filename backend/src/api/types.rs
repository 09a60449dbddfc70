//! REST API request and response types.
//!
//! JSON bodies use camelCase; the embedded configuration keeps its own
//! snake_case field names so it can be saved and fed back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{Config, EntitySelection};
use crate::transform::{CsvGeneration, CsvInfo, GenerationStats};

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// CSV text
    pub csv: String,
    pub config: Config,
    /// Delimiter override: one character, or `tab`
    #[serde(default)]
    pub delimiter: Option<String>,
}

/// Body of `POST /api/scaffold`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldRequest {
    pub csv: String,
    #[serde(default)]
    pub delimiter: Option<String>,
    /// Columns to turn into derived entities
    #[serde(default)]
    pub entity_columns: Vec<EntitySelection>,
}

/// Response sent after a successful generation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Unique job identifier
    pub job_id: String,
    /// "ready", or "warning" when nothing was generated
    pub status: String,
    pub turtle: String,
    /// Canonical effective configuration
    pub config: Config,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub csv_info: CsvInfo,
    pub stats: GenerationStats,
}

impl From<CsvGeneration> for GenerateResponse {
    fn from(result: CsvGeneration) -> Self {
        let generation = result.generation;
        let status = if generation.stats.statements > 0 {
            "ready"
        } else {
            "warning"
        };

        GenerateResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            turtle: generation.turtle,
            config: generation.config.canonical(),
            metadata: ResponseMetadata {
                csv_info: result.csv_info,
                stats: generation.stats,
            },
        }
    }
}

/// Response of `POST /api/scaffold`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldResponse {
    pub job_id: String,
    pub status: String,
    /// Draft configuration, incomplete entities included
    pub config: Config,
    pub csv_info: CsvInfo,
}

impl ScaffoldResponse {
    pub fn new(config: Config, csv_info: CsvInfo) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: "draft".to_string(),
            config,
            csv_info,
        }
    }
}

/// Read a delimiter override: a single ASCII character, or `tab` / `\t`.
pub fn parse_delimiter(raw: &str) -> Result<char, String> {
    if raw.eq_ignore_ascii_case("tab") || raw == "\\t" {
        return Ok('\t');
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(format!("Delimiter must be a single ASCII character, got '{}'", raw)),
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

/// Error response listing every configuration problem.
pub fn validation_error_response(errors: &[String]) -> Value {
    let mut body = error_response(&format!("Invalid configuration ({} errors)", errors.len()));
    body["errors"] = json!(errors);
    body
}
