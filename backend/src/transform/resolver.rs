//! Property resolution: one row, one mapping, zero or more predicate-object pairs.

use crate::models::{MappingKind, PropertyMapping, Row};

use super::canonical::canonicalize;
use super::literal::Literal;
use super::turtle::{Fragment, Object};

/// Values of a cell.
///
/// Without a delimiter the raw value is the only value, untouched. With one,
/// the cell is split, each part trimmed and empty parts dropped. Duplicate
/// parts are kept.
pub fn split_values<'a>(raw: &'a str, delimiter: Option<&str>) -> Vec<&'a str> {
    match delimiter {
        Some(delimiter) => raw
            .split(delimiter)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect(),
        None => vec![raw],
    }
}

/// Non-blank raw value of `column` in `row`.
pub fn cell<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
}

/// Fragments produced by `mapping` for `row`, in emission order.
///
/// Literal mappings emit one fragment per predicate and value, predicates
/// outermost. Resource mappings only use their relationship predicate (the
/// explicit `relationship_property`, else the first predicate), once per
/// value whose canonical form is non-empty. A mapping without any
/// non-blank predicate emits nothing.
pub fn resolve_property(row: &Row, mapping: &PropertyMapping) -> Vec<Fragment> {
    let predicates = mapping.predicates();
    if predicates.is_empty() {
        return Vec::new();
    }

    let raw = match cell(row, &mapping.csv_column) {
        Some(raw) => raw,
        None => return Vec::new(),
    };
    let values = split_values(raw, mapping.delimiter());

    match &mapping.kind {
        MappingKind::Literal => predicates
            .iter()
            .flat_map(|predicate| {
                values.iter().map(move |value| {
                    let literal = Literal::new(value, &mapping.datatype);
                    Fragment::new(predicate, Object::Literal(literal))
                })
            })
            .collect(),

        MappingKind::Resource {
            related_entity_type,
            relationship_property,
        } => {
            let related = match related_entity_type.as_deref().map(str::trim) {
                Some(related) if !related.is_empty() => related.to_lowercase(),
                _ => return Vec::new(),
            };
            let predicate = relationship_property
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or(predicates[0]);

            values
                .iter()
                .map(|value| canonicalize(value))
                .filter(|id| !id.is_empty())
                .map(|id| Fragment::new(predicate, Object::Resource(format!("{}/{}", related, id))))
                .collect()
        }
    }
}
