//! Entity processing: rows in, one statement per new resource out.

use serde::Serialize;

use crate::models::{EntityConfig, Row};

use super::canonical::canonicalize;
use super::registry::ResourceRegistry;
use super::resolver::{cell, resolve_property, split_values};
use super::turtle::Statement;

/// What happened to the rows of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStats {
    pub entity: String,
    /// Resources emitted.
    pub resources: usize,
    /// Identifier values already claimed by an earlier row.
    pub duplicates: usize,
    /// Rows whose identifier cell was blank.
    pub skipped_rows: usize,
    /// Identifier values that canonicalized to nothing.
    pub skipped_values: usize,
    /// Triples emitted, type declarations included.
    pub triples: usize,
}

/// Emit the statements of `entity` over `rows`, in row order.
///
/// A multi-valued identifier column yields one resource per value, each
/// carrying every property of the row. Identifiers already claimed in
/// `registry` are skipped. Incomplete entities produce nothing.
pub fn process_entity(
    entity: &EntityConfig,
    rows: &[Row],
    registry: &mut ResourceRegistry,
) -> (Vec<Statement>, EntityStats) {
    let mut stats = EntityStats {
        entity: entity.name.clone(),
        ..EntityStats::default()
    };
    let mut statements = Vec::new();

    if !entity.is_complete() {
        return (statements, stats);
    }

    let segment = entity.uri_segment();
    let delimiter = entity.identifier_delimiter();

    for row in rows {
        let raw = match cell(row, &entity.csv_identifier_column) {
            Some(raw) => raw,
            None => {
                stats.skipped_rows += 1;
                continue;
            }
        };

        for value in split_values(raw, delimiter) {
            let id = canonicalize(value);
            if id.is_empty() {
                stats.skipped_values += 1;
                continue;
            }
            if !registry.try_claim(entity.name.trim(), &id) {
                stats.duplicates += 1;
                continue;
            }

            let fragments = entity
                .properties
                .iter()
                .flat_map(|mapping| resolve_property(row, mapping))
                .collect();

            let statement = Statement {
                subject: format!("{}/{}", segment, id),
                class: entity.rdf_class.trim().to_string(),
                fragments,
            };
            stats.resources += 1;
            stats.triples += statement.triple_count();
            statements.push(statement);
        }
    }

    (statements, stats)
}
