//! Relationship linking between the main entity and derived entities.
//!
//! A main-entity column that identifies a derived entity would otherwise be
//! copied as a literal. Linking turns its mapping into a resource mapping
//! pointing into the derived entity's URI space, so the column becomes a
//! graph edge.

use crate::models::{Config, MappingKind};

/// Predicate used when a linked mapping has no predicate of its own.
pub fn fallback_relationship_property(entity_name: &str) -> String {
    format!("ex:relatedTo{}", entity_name)
}

/// Copy of `config` with the main entity's entity-column mappings linked.
///
/// `entity_columns` lists the columns selected as identifiers of derived
/// entities. Only the main entity is rewritten; the input is left untouched.
pub fn link_relationships(config: &Config, entity_columns: &[String]) -> Config {
    let mut linked = config.clone();

    let derived: Vec<(String, String)> = config
        .derived_entities()
        .iter()
        .map(|e| (e.csv_identifier_column.clone(), e.name.trim().to_string()))
        .collect();

    let main = match linked.entities.first_mut() {
        Some(main) => main,
        None => return linked,
    };

    for mapping in &mut main.properties {
        if !entity_columns.contains(&mapping.csv_column) {
            continue;
        }
        let related = match derived.iter().find(|(column, _)| *column == mapping.csv_column) {
            Some((_, name)) => name,
            None => continue,
        };

        let relationship_property = mapping
            .predicates()
            .first()
            .map(|p| p.to_string())
            .unwrap_or_else(|| fallback_relationship_property(related));

        mapping.kind = MappingKind::Resource {
            related_entity_type: Some(related.clone()),
            relationship_property: Some(relationship_property),
        };
    }

    linked
}
