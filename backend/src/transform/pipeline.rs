//! High-level generation API: rows and a mapping configuration in, Turtle out.
//!
//! A run moves through `Idle → Validating → Linking → Emitting → Done`, or
//! stops at `Rejected` when validation fails. Each stage is also available
//! on its own ([`crate::validation::validate_config`], [`link_relationships`],
//! [`emit_statements`], [`serialize_turtle`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use csv2ttl::transform::generate_from_csv;
//! use csv2ttl::Config;
//!
//! let config = Config::from_json(&std::fs::read_to_string("mapping.json")?)?;
//! let result = generate_from_csv(&std::fs::read("catalog.csv")?, None, &config)?;
//! std::fs::write("catalog.ttl", &result.generation.turtle)?;
//! ```

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::error::{ConfigError, GenerateError, GenerateResult};
use crate::models::{Config, Row};
use crate::parser::{filter_blank_rows, parse_bytes_auto, ParseResult};
use crate::validation::validate_config;

use super::entity::{process_entity, EntityStats};
use super::linker::link_relationships;
use super::registry::ResourceRegistry;
use super::turtle::{serialize_turtle, Statement};

/// Where a [`Generator`] is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStage {
    Idle,
    Validating,
    Linking,
    Emitting,
    Done,
    Rejected,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    /// Non-blank input rows.
    pub rows: usize,
    /// Statements emitted, one per resource.
    pub statements: usize,
    /// Triples emitted, type declarations included.
    pub triples: usize,
    /// Per entity, in configuration order.
    pub entities: Vec<EntityStats>,
}

/// Output of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub turtle: String,
    /// Effective configuration, relationships linked.
    pub config: Config,
    pub stats: GenerationStats,
}

impl Generation {
    /// Canonical JSON of the effective configuration.
    pub fn canonical_config_json(&self) -> Result<String, serde_json::Error> {
        self.config.to_canonical_json()
    }
}

/// One generation run over a configuration.
pub struct Generator<'a> {
    config: &'a Config,
    entity_columns: Option<Vec<String>>,
    stage: GenerationStage,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            entity_columns: None,
            stage: GenerationStage::Idle,
        }
    }

    /// Link these columns instead of the derived entities' identifier columns.
    pub fn with_entity_columns(mut self, columns: Vec<String>) -> Self {
        self.entity_columns = Some(columns);
        self
    }

    pub fn stage(&self) -> GenerationStage {
        self.stage
    }

    /// Run every stage over `rows`.
    ///
    /// Blank rows are dropped first; with nothing left the run fails with
    /// [`GenerateError::EmptyInput`] and stays `Idle`. A configuration with
    /// any incomplete entity is rejected with every problem listed.
    pub fn run(&mut self, rows: &[Row]) -> GenerateResult<Generation> {
        let rows = filter_blank_rows(rows);
        if rows.is_empty() {
            log_error("No rows to convert");
            return Err(GenerateError::EmptyInput);
        }

        self.stage = GenerationStage::Validating;
        log_info("🔍 Validating configuration...");
        if let Err(errors) = validate_config(self.config) {
            self.stage = GenerationStage::Rejected;
            log_error(format!("Configuration rejected ({} errors)", errors.len()));
            for e in &errors {
                log_info_indent(e.clone(), 1);
            }
            return Err(ConfigError::Validation { errors }.into());
        }
        log_success(format!("{} entities configured", self.config.entities.len()));

        self.stage = GenerationStage::Linking;
        let columns = self
            .entity_columns
            .clone()
            .unwrap_or_else(|| self.config.entity_columns());
        let linked = link_relationships(self.config, &columns);
        if !columns.is_empty() {
            log_info(format!("🔗 Linked entity columns: {}", columns.join(", ")));
        }

        self.stage = GenerationStage::Emitting;
        log_info("⚙️  Emitting statements...");
        let (statements, entity_stats) = emit_statements(&linked, &rows);
        for s in &entity_stats {
            log_info_indent(
                format!("{}: {} resources, {} duplicates skipped", s.entity, s.resources, s.duplicates),
                1,
            );
        }

        let turtle = serialize_turtle(&linked.namespaces, &linked.base_uri, &statements);
        let stats = GenerationStats {
            rows: rows.len(),
            statements: statements.len(),
            triples: entity_stats.iter().map(|s| s.triples).sum(),
            entities: entity_stats,
        };
        if stats.statements == 0 {
            log_warning("No statements generated");
        }
        log_success(format!(
            "Generated {} statements ({} triples)",
            stats.statements, stats.triples
        ));

        self.stage = GenerationStage::Done;
        Ok(Generation {
            turtle,
            config: linked,
            stats,
        })
    }
}

/// Statements of every entity, in configuration then row order.
///
/// Uses a fresh resource registry. Incomplete entities are skipped.
pub fn emit_statements(config: &Config, rows: &[Row]) -> (Vec<Statement>, Vec<EntityStats>) {
    let mut registry = ResourceRegistry::new();
    let mut statements = Vec::new();
    let mut stats = Vec::with_capacity(config.entities.len());

    for entity in &config.entities {
        let (mut emitted, entity_stats) = process_entity(entity, rows, &mut registry);
        statements.append(&mut emitted);
        stats.push(entity_stats);
    }
    debug_assert_eq!(registry.len(), stats.iter().map(|s| s.resources).sum::<usize>());

    (statements, stats)
}

/// Generate Turtle for `rows` with the default entity columns.
pub fn generate(config: &Config, rows: &[Row]) -> GenerateResult<Generation> {
    Generator::new(config).run(rows)
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ParseResult> for CsvInfo {
    fn from(parsed: &ParseResult) -> Self {
        Self {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.headers.clone(),
            row_count: parsed.rows.len(),
        }
    }
}

/// Generation from raw CSV, with what was detected while reading it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvGeneration {
    pub csv_info: CsvInfo,
    pub generation: Generation,
}

/// Decode and parse CSV bytes, then generate.
///
/// `delimiter` overrides detection.
pub fn generate_from_csv(
    bytes: &[u8],
    delimiter: Option<char>,
    config: &Config,
) -> GenerateResult<CsvGeneration> {
    let parsed = parse_bytes_auto(bytes, delimiter)?;
    generate_parsed(parsed, config)
}

/// Same as [`generate_from_csv`] for a file on disk.
pub fn generate_from_csv_file(path: &Path, config: &Config) -> GenerateResult<CsvGeneration> {
    let bytes = std::fs::read(path)?;
    generate_from_csv(&bytes, None, config)
}

fn generate_parsed(parsed: ParseResult, config: &Config) -> GenerateResult<CsvGeneration> {
    log_info("📖 Reading CSV...");
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parsed.delimiter)));
    log_success(format!("Read {} rows", parsed.rows.len()));

    let csv_info = CsvInfo::from(&parsed);
    let generation = generate(config, &parsed.rows)?;

    Ok(CsvGeneration {
        csv_info,
        generation,
    })
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CsvError;
    use crate::models::{EntityConfig, MappingKind, PropertyMapping, XSD_STRING};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn publication_config() -> Config {
        Config::default().with_entity(
            EntityConfig::new("Pub", "id", "ex:Publication")
                .with_property(PropertyMapping::literal("title", ["dc:title"], XSD_STRING)),
        )
    }

    fn library_config() -> Config {
        Config::default()
            .with_entity(
                EntityConfig::new("Book", "isbn", "bibo:Book")
                    .with_property(PropertyMapping::literal("title", ["dc:title"], XSD_STRING))
                    .with_property(
                        PropertyMapping::literal("authors", ["dc:creator"], XSD_STRING).multi_value(";"),
                    )
                    .with_property(PropertyMapping::literal("year", ["dcterms:issued"], "xsd:gYear")),
            )
            .with_entity(
                EntityConfig::new("Author", "authors", "foaf:Person").with_property(
                    PropertyMapping::literal("authors", ["foaf:name"], XSD_STRING).multi_value(";"),
                ),
            )
    }

    fn library_rows() -> Vec<Row> {
        vec![
            row(&[("isbn", "111"), ("title", "First"), ("authors", "Ann Lee; Bob Roe"), ("year", "1999")]),
            row(&[("isbn", ""), ("title", ""), ("authors", ""), ("year", "")]),
            row(&[("isbn", "222"), ("title", "Second"), ("authors", "Ann Lee"), ("year", "2001")]),
        ]
    }

    #[test]
    fn test_publication_scenario() {
        let rows = vec![row(&[("id", "42"), ("title", "O'Brien's Tale")])];
        let generation = generate(&publication_config(), &rows).unwrap();

        assert!(generation
            .turtle
            .contains("<pub/42> a ex:Publication ;\n    dc:title \"O'Brien's Tale\" ."));
        assert!(generation
            .turtle
            .contains("@base <http://universidad.edu.ec/recurso/> .\n\n<pub/42>"));
        assert_eq!(generation.stats.statements, 1);
        assert_eq!(generation.stats.triples, 2);
    }

    #[test]
    fn test_output_is_deterministic() {
        let config = library_config();
        let first = generate(&config, &library_rows()).unwrap().turtle;
        for _ in 0..5 {
            assert_eq!(generate(&config, &library_rows()).unwrap().turtle, first);
        }
    }

    #[test]
    fn test_empty_input_rejected_before_validation() {
        let config = Config::default().with_entity(EntityConfig::new("", "", ""));
        let mut generator = Generator::new(&config);

        assert!(matches!(generator.run(&[]), Err(GenerateError::EmptyInput)));
        let blank = vec![row(&[("id", " "), ("title", "")])];
        assert!(matches!(generator.run(&blank), Err(GenerateError::EmptyInput)));
        assert_eq!(generator.stage(), GenerationStage::Idle);
    }

    #[test]
    fn test_invalid_config_rejected_with_all_errors() {
        let config = Config::default()
            .with_entity(EntityConfig::new("Pub", "id", ""))
            .with_entity(EntityConfig::new("", "author", "foaf:Person"));
        let mut generator = Generator::new(&config);

        let err = generator.run(&[row(&[("id", "1")])]).unwrap_err();
        assert_eq!(generator.stage(), GenerationStage::Rejected);
        assert_eq!(
            err.validation_errors().unwrap(),
            &["Entity Pub: RDF class is required".to_string(), "Entity 2: name is required".to_string()]
        );
    }

    #[test]
    fn test_stage_done_after_run() {
        let config = publication_config();
        let mut generator = Generator::new(&config);
        assert_eq!(generator.stage(), GenerationStage::Idle);
        generator.run(&[row(&[("id", "1")])]).unwrap();
        assert_eq!(generator.stage(), GenerationStage::Done);
    }

    #[test]
    fn test_main_entity_linked_to_derived() {
        let config = library_config();
        let generation = generate(&config, &library_rows()).unwrap();
        let ttl = &generation.turtle;

        assert!(ttl.contains(
            "<book/111> a bibo:Book ;\n    dc:title \"First\" ;\n    dc:creator <author/ann-lee> ;\n    \
             dc:creator <author/bob-roe> ;\n    dcterms:issued \"1999\"^^xsd:gYear ."
        ));
        assert!(ttl.contains("<author/ann-lee> a foaf:Person ;\n    foaf:name \"Ann Lee\" ;\n    foaf:name \"Bob Roe\" ."));
        // Ann Lee appears in two rows but is declared once.
        assert_eq!(ttl.matches("<author/ann-lee> a foaf:Person").count(), 1);

        let authors = &generation.stats.entities[1];
        assert_eq!(authors.resources, 2);
        assert_eq!(authors.duplicates, 1);
        assert_eq!(generation.stats.rows, 2);

        // The effective config carries the link, the input does not.
        assert!(generation.config.entities[0].properties[1].is_resource());
        assert!(!config.entities[0].properties[1].is_resource());
    }

    #[test]
    fn test_explicit_entity_columns() {
        let config = library_config();
        let generation = Generator::new(&config)
            .with_entity_columns(Vec::new())
            .run(&library_rows())
            .unwrap();
        assert!(generation.turtle.contains("dc:creator \"Ann Lee\""));
        assert!(!generation.config.entities[0].properties[1].is_resource());
    }

    #[test]
    fn test_statements_follow_config_then_row_order() {
        let config = library_config();
        let (statements, _) = emit_statements(&config, &library_rows());
        let subjects: Vec<&str> = statements.iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(subjects, vec!["book/111", "book/222", "author/ann-lee", "author/bob-roe"]);
    }

    #[test]
    fn test_emit_skips_incomplete_entities() {
        let config = publication_config().with_entity(EntityConfig::new("Author", "author", ""));
        let rows = vec![row(&[("id", "1"), ("author", "Ann")])];
        let (statements, stats) = emit_statements(&config, &rows);
        assert_eq!(statements.len(), 1);
        assert_eq!(stats[1].resources, 0);
    }

    #[test]
    fn test_fresh_registry_per_run() {
        let config = publication_config();
        let rows = vec![row(&[("id", "1")])];
        assert_eq!(generate(&config, &rows).unwrap().stats.statements, 1);
        assert_eq!(generate(&config, &rows).unwrap().stats.statements, 1);
    }

    #[test]
    fn test_generate_from_csv() {
        let csv = "id;title\n42;O'Brien's Tale\n;\n43;\"Semi; colon\"\n";
        let result = generate_from_csv(csv.as_bytes(), None, &publication_config()).unwrap();

        assert_eq!(result.csv_info.delimiter, ';');
        assert_eq!(result.csv_info.headers, vec!["id", "title"]);
        assert!(result.generation.turtle.contains("<pub/43> a ex:Publication ;\n    dc:title \"Semi; colon\" ."));
        assert_eq!(result.generation.stats.rows, 2);
    }

    #[test]
    fn test_generate_from_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pubs.csv");
        std::fs::write(&path, "id,title\n7,Seven\n").unwrap();

        let result = generate_from_csv_file(&path, &publication_config()).unwrap();
        assert!(result.generation.turtle.contains("<pub/7> a ex:Publication ;\n    dc:title \"Seven\" ."));
    }

    #[test]
    fn test_generate_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate_from_csv_file(&dir.path().join("missing.csv"), &publication_config())
            .unwrap_err();
        assert!(matches!(err, GenerateError::Io(_)));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let err = generate_from_csv("id§title\n1§One, Two\n".as_bytes(), Some('§'), &publication_config())
            .unwrap_err();
        assert!(matches!(err, GenerateError::Csv(CsvError::InvalidDelimiter('§'))));
    }

    #[test]
    fn test_entity_name_whitespace_ignored_in_iris() {
        let config = Config::default()
            .with_entity(
                EntityConfig::new("Book", "isbn", "bibo:Book")
                    .with_property(PropertyMapping::literal("author", ["dc:creator"], XSD_STRING)),
            )
            .with_entity(EntityConfig::new("Author ", "author", "foaf:Person"));

        let generation = generate(&config, &[row(&[("isbn", "1"), ("author", "Ann")])]).unwrap();
        let turtle = &generation.turtle;
        assert!(turtle.contains("<book/1> a bibo:Book ;\n    dc:creator <author/ann> ."));
        assert!(turtle.contains("<author/ann> a foaf:Person ."));
        assert!(!turtle.contains("<author /"));
        assert_eq!(generation.stats.statements, 2);
    }

    #[test]
    fn test_canonical_config_of_generation() {
        let config = library_config();
        let generation = generate(&config, &library_rows()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&generation.canonical_config_json().unwrap()).unwrap();
        assert_eq!(json["entities"][0]["properties"][1]["type"], "resource");
        assert_eq!(json["entities"][0]["properties"][1]["related_entity_type"], "Author");
        assert_eq!(json["entities"][0]["properties"][1]["datatype"], XSD_STRING);
    }

    #[test]
    fn test_resource_kind_without_link_stays_inert() {
        let mut config = publication_config();
        config.entities[0].properties[0].kind = MappingKind::Resource {
            related_entity_type: None,
            relationship_property: None,
        };
        let generation = generate(&config, &[row(&[("id", "1"), ("title", "x")])]).unwrap();
        assert!(generation.turtle.ends_with("<pub/1> a ex:Publication .\n\n"));
    }

    #[test]
    fn test_format_delimiter() {
        assert_eq!(format_delimiter('\t'), "TAB");
        assert_eq!(format_delimiter(';'), ";");
    }
}
