//! Mapping configuration validation.
//!
//! Two layers:
//!
//! - **Document**: a JSON configuration is checked against the embedded
//!   Draft 7 schema (`schemas/mapping-config.json`) before it is deserialized.
//! - **Semantic**: every entity must have a name, an RDF class and an
//!   identifier column, and names must be unique. All problems are collected
//!   before the configuration is rejected, so nothing is generated from a
//!   partially valid configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use csv2ttl::{load_config_json, validate_config};
//!
//! let config = load_config_json(&std::fs::read_to_string("mapping.json")?)?;
//! if let Err(errors) = validate_config(&config) {
//!     for e in errors {
//!         eprintln!("{}", e);
//!     }
//! }
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult};
use crate::models::Config;

static CONFIG_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/mapping-config.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every error otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check: true/false only.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a JSON document against the configuration schema.
pub fn validate_config_document(data: &Value) -> Result<(), Vec<String>> {
    validate(&CONFIG_SCHEMA, data)
}

/// Parse a JSON configuration, checking it against the schema first.
pub fn load_config_json(json: &str) -> ConfigResult<Config> {
    let value: Value = serde_json::from_str(json)?;
    validate_config_document(&value).map_err(|errors| ConfigError::Schema { errors })?;
    Ok(Config::from_value(&value)?)
}

/// Check that every entity can be generated.
///
/// Entities are referred to by name when they have one, otherwise by their
/// 1-based position.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (idx, entity) in config.entities.iter().enumerate() {
        let name = entity.name.trim();
        let label = if name.is_empty() {
            (idx + 1).to_string()
        } else {
            name.to_string()
        };

        if name.is_empty() {
            errors.push(format!("Entity {}: name is required", idx + 1));
        } else if !seen.insert(name) {
            errors.push(format!("Entity {}: name is used by more than one entity", label));
        }
        if entity.rdf_class.trim().is_empty() {
            errors.push(format!("Entity {}: RDF class is required", label));
        }
        if entity.csv_identifier_column.is_empty() {
            errors.push(format!("Entity {}: an identifier column must be selected", label));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// [`validate_config`] as a [`ConfigError`].
pub fn ensure_valid(config: &Config) -> ConfigResult<()> {
    validate_config(config).map_err(|errors| ConfigError::Validation { errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityConfig, PropertyMapping, XSD_STRING};
    use serde_json::json;

    #[test]
    fn test_valid_config() {
        let config = Config::default().with_entity(
            EntityConfig::new("Pub", "id", "ex:Publication")
                .with_property(PropertyMapping::literal("title", ["dc:title"], XSD_STRING)),
        );
        assert!(validate_config(&config).is_ok());
        assert!(ensure_valid(&config).is_ok());
    }

    #[test]
    fn test_all_errors_collected() {
        let config = Config::default()
            .with_entity(EntityConfig::new("", "", ""))
            .with_entity(EntityConfig::new("Author", "author", ""))
            .with_entity(EntityConfig::new("Keyword", "", "ex:Keyword"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Entity 1: name is required",
                "Entity 1: RDF class is required",
                "Entity 1: an identifier column must be selected",
                "Entity Author: RDF class is required",
                "Entity Keyword: an identifier column must be selected",
            ]
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let config = Config::default()
            .with_entity(EntityConfig::new("Pub", "id", "ex:Publication"))
            .with_entity(EntityConfig::new("Pub", "other", "ex:Publication"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec!["Entity Pub: name is used by more than one entity"]);
    }

    #[test]
    fn test_ensure_valid_wraps_errors() {
        let config = Config::default().with_entity(EntityConfig::new("Pub", "id", ""));
        assert!(matches!(
            ensure_valid(&config),
            Err(ConfigError::Validation { errors }) if errors.len() == 1
        ));
    }

    #[test]
    fn test_document_schema() {
        let good = json!({
            "base_uri": "http://example.org/",
            "entities": [{
                "name": "Pub", "csv_identifier_column": "id", "rdf_class": "ex:Publication",
                "properties": [{ "csv_column": "title", "rdf_properties": ["dc:title"], "type": "literal" }]
            }]
        });
        assert!(validate_config_document(&good).is_ok());

        let bad = json!({
            "entities": [{
                "name": "Pub", "csv_identifier_column": "id", "rdf_class": "ex:Publication",
                "properties": [{ "csv_column": "title", "rdf_properties": "dc:title", "type": "blank" }]
            }]
        });
        let errors = validate_config_document(&bad).unwrap_err();
        assert!(errors.len() >= 2);
    }

    #[test]
    fn test_load_config_json() {
        let json = r#"{ "entities": [ { "name": "Pub", "csv_identifier_column": "id", "rdf_class": "ex:Publication" } ] }"#;
        let config = load_config_json(json).unwrap();
        assert_eq!(config.base_uri, crate::models::DEFAULT_BASE_URI);
        assert!(config.namespaces.get("xsd").is_some());

        assert!(matches!(
            load_config_json(r#"{ "entities": "none" }"#),
            Err(ConfigError::Schema { .. })
        ));
        assert!(matches!(load_config_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_is_valid() {
        let schema = json!({ "type": "object", "required": ["name"] });
        assert!(is_valid(&schema, &json!({ "name": "x" })));
        assert!(!is_valid(&schema, &json!({})));
    }
}
