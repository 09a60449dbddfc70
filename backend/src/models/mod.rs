//! Domain models for the csv2ttl generation pipeline.
//!
//! This module contains the mapping configuration consumed by the engine:
//!
//! - [`Config`] - Base URI, namespace table and ordered entity list
//! - [`Namespaces`] - Prefix table with insertion order and reserved prefixes
//! - [`EntityConfig`] - One RDF entity type extracted from the rows
//! - [`PropertyMapping`] - How one CSV column becomes triples
//! - [`MappingKind`] - Literal or resource mapping
//! - [`Row`] - One parsed CSV record
//!
//! The first entity of a [`Config`] is the *main* entity. Every other entity
//! is *derived*: its identifier column is a column of the main dataset.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::error::{ConfigError, ConfigResult};
use crate::parser::infer_datatype;

/// One CSV record: column name to raw cell value.
pub type Row = HashMap<String, String>;

/// Datatype for which literals are written without a `^^` suffix.
pub const XSD_STRING: &str = "xsd:string";

/// Base URI used when a configuration does not set one.
pub const DEFAULT_BASE_URI: &str = "http://universidad.edu.ec/recurso/";

/// Prefixes that every namespace table carries.
pub const RESERVED_PREFIXES: [&str; 3] = ["rdf", "rdfs", "xsd"];

/// Name given to the main entity of a scaffolded configuration.
pub const MAIN_ENTITY_NAME: &str = "MainEntity";

/// Delimiter proposed for multi-valued cells.
pub const DEFAULT_SPLIT_DELIMITER: &str = ";";

const DEFAULT_NAMESPACES: [(&str, &str); 9] = [
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("schema", "http://schema.org/"),
    ("bibo", "http://purl.org/ontology/bibo/"),
    ("ex", "http://example.org/ontology/"),
];

fn default_base_uri() -> String {
    DEFAULT_BASE_URI.to_string()
}

fn default_datatype() -> String {
    XSD_STRING.to_string()
}

// =============================================================================
// Namespaces
// =============================================================================

/// Namespace prefix table.
///
/// Serialized as a JSON object. Entries keep insertion order, which is the
/// order of the `@prefix` lines in the generated Turtle. `rdf`, `rdfs` and
/// `xsd` are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct Namespaces {
    entries: Vec<(String, String)>,
}

impl Namespaces {
    /// A table holding only the reserved prefixes.
    pub fn reserved() -> Self {
        let entries = DEFAULT_NAMESPACES
            .iter()
            .filter(|(prefix, _)| RESERVED_PREFIXES.contains(prefix))
            .map(|(p, iri)| (p.to_string(), iri.to_string()))
            .collect();
        Self { entries }
    }

    /// Build a table from ordered entries, restoring any missing reserved prefix.
    pub fn from_entries(entries: Vec<(String, String)>) -> Self {
        let mut namespaces = Self { entries };
        namespaces.ensure_reserved();
        namespaces
    }

    /// Insert a prefix, or update its IRI in place if it already exists.
    pub fn insert(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        let prefix = prefix.into();
        let iri = iri.into();
        match self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = iri,
            None => self.entries.push((prefix, iri)),
        }
    }

    /// Remove a prefix. Reserved prefixes are refused.
    pub fn remove(&mut self, prefix: &str) -> ConfigResult<()> {
        if RESERVED_PREFIXES.contains(&prefix) {
            return Err(ConfigError::ReservedPrefix(prefix.to_string()));
        }
        self.entries.retain(|(p, _)| p != prefix);
        Ok(())
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, iri)| iri.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, iri)| (p.as_str(), iri.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-insert missing reserved prefixes at the front, in reserved order.
    fn ensure_reserved(&mut self) {
        let missing: Vec<(String, String)> = Self::reserved()
            .entries
            .into_iter()
            .filter(|(prefix, _)| self.get(prefix).is_none())
            .collect();
        if !missing.is_empty() {
            self.entries.splice(0..0, missing);
        }
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        let entries = DEFAULT_NAMESPACES
            .iter()
            .map(|(p, iri)| (p.to_string(), iri.to_string()))
            .collect();
        Self { entries }
    }
}

impl Serialize for Namespaces {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (prefix, iri) in &self.entries {
            map.serialize_entry(prefix, iri)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Namespaces {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NamespacesVisitor;

        impl<'de> Visitor<'de> for NamespacesVisitor {
            type Value = Namespaces;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping prefixes to namespace IRIs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Namespaces, A::Error> {
                let mut entries: Vec<(String, String)> = Vec::new();
                while let Some((prefix, iri)) = access.next_entry::<String, String>()? {
                    match entries.iter_mut().find(|(p, _)| *p == prefix) {
                        Some(entry) => entry.1 = iri,
                        None => entries.push((prefix, iri)),
                    }
                }
                Ok(Namespaces::from_entries(entries))
            }
        }

        deserializer.deserialize_map(NamespacesVisitor)
    }
}

// =============================================================================
// Property Mapping
// =============================================================================

/// Whether a column becomes a literal or a reference to another resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MappingKind {
    /// Typed literal. `xsd:string` literals carry no datatype suffix.
    Literal,

    /// Reference into the URI space of another entity.
    Resource {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        related_entity_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        relationship_property: Option<String>,
    },
}

impl Default for MappingKind {
    fn default() -> Self {
        MappingKind::Literal
    }
}

/// Mapping of one CSV column onto one or more predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMapping {
    /// Source column name.
    pub csv_column: String,

    /// Predicates (prefixed names or IRIs). Blank entries are ignored.
    #[serde(default)]
    pub rdf_properties: Vec<String>,

    /// Literal or resource mapping.
    #[serde(flatten)]
    pub kind: MappingKind,

    /// Literal datatype. Kept on resource mappings too, so a mapping turned
    /// back into a literal recovers it.
    #[serde(default = "default_datatype")]
    pub datatype: String,

    /// When set, the cell is split on this delimiter into several values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_delimiter: Option<String>,
}

impl PropertyMapping {
    /// Literal mapping of `column` onto `predicates`.
    pub fn literal<I, S>(column: &str, predicates: I, datatype: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            csv_column: column.to_string(),
            rdf_properties: predicates.into_iter().map(Into::into).collect(),
            kind: MappingKind::Literal,
            datatype: datatype.to_string(),
            split_delimiter: None,
        }
    }

    /// Resource mapping of `column` into the URI space of `related_entity`.
    pub fn resource<I, S>(column: &str, predicates: I, related_entity: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            csv_column: column.to_string(),
            rdf_properties: predicates.into_iter().map(Into::into).collect(),
            kind: MappingKind::Resource {
                related_entity_type: Some(related_entity.to_string()),
                relationship_property: None,
            },
            datatype: default_datatype(),
            split_delimiter: None,
        }
    }

    /// Unconfigured literal mapping, as proposed for a freshly parsed column.
    pub fn draft(column: &str, datatype: &str) -> Self {
        Self::literal(column, [""], datatype)
    }

    /// Split cells of this column on `delimiter`.
    pub fn multi_value(mut self, delimiter: &str) -> Self {
        self.split_delimiter = Some(delimiter.to_string());
        self
    }

    /// Predicates with blank entries removed, trimmed.
    pub fn predicates(&self) -> Vec<&str> {
        self.rdf_properties
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// A mapping without any non-blank predicate emits nothing.
    pub fn is_inert(&self) -> bool {
        self.predicates().is_empty()
    }

    /// Delimiter for multi-valued cells, if enabled.
    pub fn delimiter(&self) -> Option<&str> {
        self.split_delimiter.as_deref().filter(|d| !d.is_empty())
    }

    pub fn is_multi_value(&self) -> bool {
        self.delimiter().is_some()
    }

    pub fn is_resource(&self) -> bool {
        matches!(self.kind, MappingKind::Resource { .. })
    }

    /// Copy suitable for the canonical export: blank predicates dropped.
    fn canonical(&self) -> Self {
        Self {
            rdf_properties: self.predicates().into_iter().map(String::from).collect(),
            ..self.clone()
        }
    }
}

// =============================================================================
// Entity Config
// =============================================================================

/// One entity type: its URI space, class and property mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Entity name. Lowercased, it is the first URI path segment of its resources.
    pub name: String,

    /// Column whose canonicalized value identifies an instance.
    pub csv_identifier_column: String,

    /// Object of the `a` triple.
    pub rdf_class: String,

    #[serde(default)]
    pub properties: Vec<PropertyMapping>,

    /// Columns holding identifiers of other configured entities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_columns: Vec<String>,
}

impl EntityConfig {
    pub fn new(name: &str, identifier_column: &str, rdf_class: &str) -> Self {
        Self {
            name: name.to_string(),
            csv_identifier_column: identifier_column.to_string(),
            rdf_class: rdf_class.to_string(),
            properties: Vec::new(),
            related_columns: Vec::new(),
        }
    }

    pub fn with_property(mut self, mapping: PropertyMapping) -> Self {
        self.properties.push(mapping);
        self
    }

    /// Name, class and identifier column are all set.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.rdf_class.trim().is_empty()
            && !self.csv_identifier_column.is_empty()
    }

    /// URI path segment of this entity's resources.
    pub fn uri_segment(&self) -> String {
        self.name.trim().to_lowercase()
    }

    /// First mapping reading `column`.
    pub fn property_for(&self, column: &str) -> Option<&PropertyMapping> {
        self.properties.iter().find(|p| p.csv_column == column)
    }

    /// Delimiter of the identifier column when its mapping is multi-valued.
    ///
    /// Each value of such a cell becomes its own resource.
    pub fn identifier_delimiter(&self) -> Option<&str> {
        self.properties
            .iter()
            .filter(|p| p.csv_column == self.csv_identifier_column)
            .find_map(|p| p.delimiter())
    }

    /// Mark `column` as related, adding a draft literal mapping for it if absent.
    pub fn add_related_column(&mut self, column: &str, samples: &[&str]) {
        if !self.related_columns.iter().any(|c| c == column) {
            self.related_columns.push(column.to_string());
        }
        if self.property_for(column).is_none() {
            self.properties
                .push(PropertyMapping::draft(column, infer_datatype(samples)));
        }
    }

    /// Unmark `column` and drop its mappings.
    pub fn remove_related_column(&mut self, column: &str) {
        self.related_columns.retain(|c| c != column);
        self.properties.retain(|p| p.csv_column != column);
    }
}

// =============================================================================
// Config
// =============================================================================

/// Column picked as the identifier of a derived entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySelection {
    pub column: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl EntitySelection {
    pub fn new(column: &str, name: Option<&str>) -> Self {
        Self {
            column: column.to_string(),
            name: name.map(String::from),
        }
    }

    /// Given name, or the column with non-alphanumeric characters stripped.
    pub fn entity_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .column
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect(),
        }
    }
}

/// Complete mapping configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_uri")]
    pub base_uri: String,

    #[serde(default)]
    pub namespaces: Namespaces,

    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl Config {
    /// Empty configuration with the default namespace table.
    pub fn new(base_uri: &str) -> Self {
        Self {
            base_uri: base_uri.to_string(),
            namespaces: Namespaces::default(),
            entities: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: EntityConfig) -> Self {
        self.entities.push(entity);
        self
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse a configuration from a JSON value.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    /// Serialize the full configuration, drafts included.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The configuration as exported for reuse.
    ///
    /// Incomplete entities and inert mappings are dropped, blank predicates
    /// are filtered and related-column bookkeeping is left out.
    pub fn canonical(&self) -> Config {
        let entities = self
            .entities
            .iter()
            .filter(|e| e.is_complete())
            .map(|e| EntityConfig {
                properties: e
                    .properties
                    .iter()
                    .filter(|p| !p.is_inert())
                    .map(PropertyMapping::canonical)
                    .collect(),
                related_columns: Vec::new(),
                ..e.clone()
            })
            .collect();

        Config {
            base_uri: self.base_uri.clone(),
            namespaces: self.namespaces.clone(),
            entities,
        }
    }

    /// Pretty JSON of [`Config::canonical`].
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.canonical())
    }

    /// The entity whose rows are the primary dataset.
    pub fn main_entity(&self) -> Option<&EntityConfig> {
        self.entities.first()
    }

    /// Entities identified by a column of the main dataset.
    pub fn derived_entities(&self) -> &[EntityConfig] {
        self.entities.get(1..).unwrap_or(&[])
    }

    pub fn entity(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Identifier columns of the derived entities, in configuration order.
    pub fn entity_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for entity in self.derived_entities() {
            let column = &entity.csv_identifier_column;
            if !column.is_empty() && !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        columns
    }

    /// All CSV columns read by this configuration, sorted and deduplicated.
    pub fn source_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .entities
            .iter()
            .flat_map(|e| {
                std::iter::once(e.csv_identifier_column.clone())
                    .chain(e.properties.iter().map(|p| p.csv_column.clone()))
            })
            .filter(|c| !c.is_empty())
            .collect();
        columns.sort();
        columns.dedup();
        columns
    }

    /// Draft configuration for freshly parsed data.
    ///
    /// One main entity, unnamed class and identifier, with a literal mapping
    /// per column whose datatype is inferred from the first rows.
    pub fn scaffold(headers: &[String], rows: &[Row]) -> Config {
        let properties = headers
            .iter()
            .map(|column| {
                let samples: Vec<&str> = rows
                    .iter()
                    .take(3)
                    .filter_map(|row| row.get(column))
                    .map(String::as_str)
                    .filter(|v| !v.trim().is_empty())
                    .collect();
                PropertyMapping::draft(column, infer_datatype(&samples))
            })
            .collect();

        let main = EntityConfig {
            properties,
            ..EntityConfig::new(MAIN_ENTITY_NAME, "", "")
        };

        Config::new(DEFAULT_BASE_URI).with_entity(main)
    }

    /// Replace the derived entities with one entity per selected column.
    ///
    /// Columns must be read by the main entity.
    pub fn add_derived_entities(&mut self, selections: &[EntitySelection]) -> ConfigResult<()> {
        let main = self
            .entities
            .first()
            .cloned()
            .unwrap_or_else(|| EntityConfig::new(MAIN_ENTITY_NAME, "", ""));

        let mut entities = vec![main];
        for selection in selections {
            if entities[0].property_for(&selection.column).is_none() {
                return Err(ConfigError::UnknownColumn(selection.column.clone()));
            }
            let entity = EntityConfig::new(&selection.entity_name(), &selection.column, "")
                .with_property(PropertyMapping::draft(&selection.column, infer_datatype(&[])));
            entities.push(entity);
        }

        self.entities = entities;
        Ok(())
    }

    /// Split every mapping of `column` on `delimiter`, in every entity.
    ///
    /// Applies to the identifier mapping too, so a derived entity fans out
    /// one resource per value.
    pub fn set_multi_value(&mut self, column: &str, delimiter: &str) -> ConfigResult<()> {
        let mut found = false;
        for mapping in self
            .entities
            .iter_mut()
            .flat_map(|e| e.properties.iter_mut())
            .filter(|p| p.csv_column == column)
        {
            mapping.split_delimiter = Some(delimiter.to_string());
            found = true;
        }
        if found {
            Ok(())
        } else {
            Err(ConfigError::UnknownColumn(column.to_string()))
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URI)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_config_from_json() {
        let value = json!({
            "base_uri": "http://example.org/",
            "namespaces": { "ex": "http://example.org/ns#", "dc": "http://purl.org/dc/elements/1.1/" },
            "entities": [{
                "name": "Pub",
                "csv_identifier_column": "id",
                "rdf_class": "ex:Publication",
                "properties": [
                    { "csv_column": "title", "rdf_properties": ["dc:title"], "type": "literal", "datatype": "xsd:string" },
                    { "csv_column": "author", "rdf_properties": ["dc:creator"], "type": "resource",
                      "datatype": "xsd:string", "split_delimiter": ";",
                      "related_entity_type": "Author", "relationship_property": "dc:creator" }
                ]
            }]
        });

        let config = Config::from_value(&value).unwrap();
        let entity = &config.entities[0];
        assert_eq!(entity.properties.len(), 2);
        assert_eq!(entity.properties[0].kind, MappingKind::Literal);
        assert_eq!(entity.properties[0].datatype, "xsd:string");
        assert!(entity.properties[1].is_resource());
        assert_eq!(entity.properties[1].delimiter(), Some(";"));
    }

    #[test]
    fn test_namespaces_keep_document_order_and_reserved() {
        let value = json!({ "zz": "http://z.org/", "ex": "http://example.org/" });
        let namespaces: Namespaces = serde_json::from_value(value).unwrap();

        let prefixes: Vec<&str> = namespaces.iter().map(|(p, _)| p).collect();
        assert_eq!(prefixes, vec!["rdf", "rdfs", "xsd", "zz", "ex"]);
    }

    #[test]
    fn test_reserved_prefix_cannot_be_removed() {
        let mut namespaces = Namespaces::default();
        assert!(matches!(
            namespaces.remove("rdfs"),
            Err(ConfigError::ReservedPrefix(_))
        ));
        assert!(namespaces.remove("foaf").is_ok());
        assert!(namespaces.get("foaf").is_none());
        assert!(namespaces.get("rdfs").is_some());
    }

    #[test]
    fn test_namespace_insert_updates_in_place() {
        let mut namespaces = Namespaces::reserved();
        namespaces.insert("ex", "http://a.org/");
        namespaces.insert("rdf", "http://override.org/");
        namespaces.insert("ex", "http://b.org/");

        let entries: Vec<(&str, &str)> = namespaces.iter().collect();
        assert_eq!(entries[0], ("rdf", "http://override.org/"));
        assert_eq!(entries[3], ("ex", "http://b.org/"));
        assert_eq!(namespaces.len(), 4);
    }

    #[test]
    fn test_blank_predicates_filtered() {
        let mapping = PropertyMapping::literal("title", ["", "  ", "dc:title "], XSD_STRING);
        assert_eq!(mapping.predicates(), vec!["dc:title"]);
        assert!(!mapping.is_inert());

        let inert = PropertyMapping::literal("title", ["", " "], XSD_STRING);
        assert!(inert.is_inert());
    }

    #[test]
    fn test_canonical_export() {
        let config = Config::new("http://example.org/")
            .with_entity(
                EntityConfig::new("Pub", "id", "ex:Publication")
                    .with_property(PropertyMapping::literal("title", ["dc:title", ""], XSD_STRING))
                    .with_property(PropertyMapping::draft("year", "xsd:gYear")),
            )
            .with_entity(EntityConfig::new("Author", "author", ""));

        let canonical: serde_json::Value =
            serde_json::from_str(&config.to_canonical_json().unwrap()).unwrap();

        let entities = canonical["entities"].as_array().unwrap();
        assert_eq!(entities.len(), 1);
        let properties = entities[0]["properties"].as_array().unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0]["rdf_properties"], json!(["dc:title"]));
        assert_eq!(properties[0]["type"], "literal");
        assert!(properties[0].get("split_delimiter").is_none());
        assert!(properties[0].get("related_entity_type").is_none());
    }

    #[test]
    fn test_canonical_json_roundtrips() {
        let config = Config::default().with_entity(
            EntityConfig::new("Pub", "id", "ex:Publication").with_property(
                PropertyMapping::resource("author", ["dc:creator"], "Author").multi_value(";"),
            ),
        );
        let parsed = Config::from_json(&config.to_canonical_json().unwrap()).unwrap();
        assert_eq!(parsed, config.canonical());
    }

    #[test]
    fn test_resource_mapping_keeps_datatype() {
        let value = json!({
            "entities": [{
                "name": "Pub",
                "csv_identifier_column": "id",
                "rdf_class": "ex:Publication",
                "properties": [
                    { "csv_column": "year", "rdf_properties": ["dc:date"], "type": "resource",
                      "datatype": "xsd:gYear", "related_entity_type": "Year" },
                    { "csv_column": "author", "rdf_properties": ["dc:creator"], "type": "resource" }
                ]
            }]
        });

        let config = Config::from_value(&value).unwrap();
        let properties = &config.entities[0].properties;
        assert_eq!(properties[0].datatype, "xsd:gYear");
        assert_eq!(properties[1].datatype, XSD_STRING);

        let exported: Value = serde_json::from_str(&config.to_canonical_json().unwrap()).unwrap();
        let exported = &exported["entities"][0]["properties"];
        assert_eq!(exported[0]["type"], "resource");
        assert_eq!(exported[0]["datatype"], "xsd:gYear");
        assert_eq!(exported[1]["datatype"], XSD_STRING);
        assert_eq!(Config::from_value(&json!({ "entities": [{
            "name": "Pub", "csv_identifier_column": "id", "rdf_class": "ex:Publication",
            "properties": exported,
        }] })).unwrap().entities[0].properties, *properties);
    }

    #[test]
    fn test_uri_segment_trims_name() {
        assert_eq!(EntityConfig::new("Author ", "author", "foaf:Person").uri_segment(), "author");
        assert_eq!(EntityConfig::new(" Pub", "id", "ex:Publication").uri_segment(), "pub");
    }

    #[test]
    fn test_scaffold_infers_datatypes() {
        let headers = vec!["id".to_string(), "title".to_string(), "year".to_string()];
        let rows = vec![
            row(&[("id", "1"), ("title", "A"), ("year", "")]),
            row(&[("id", "2"), ("title", "B"), ("year", "2024-01-01")]),
        ];

        let config = Config::scaffold(&headers, &rows);
        let main = config.main_entity().unwrap();
        assert_eq!(main.name, MAIN_ENTITY_NAME);
        assert!(!main.is_complete());
        assert_eq!(main.properties.len(), 3);
        assert_eq!(main.properties[0].kind, MappingKind::Literal);
        assert_eq!(main.properties[0].datatype, "xsd:integer");
        assert_eq!(main.properties[2].datatype, "xsd:date");
        assert!(main.properties.iter().all(|p| p.is_inert()));
    }

    #[test]
    fn test_add_derived_entities() {
        let headers = vec!["id".to_string(), "Author Name".to_string()];
        let mut config = Config::scaffold(&headers, &[]);

        config
            .add_derived_entities(&[EntitySelection::new("Author Name", None)])
            .unwrap();
        assert_eq!(config.entities.len(), 2);
        assert_eq!(config.entities[1].name, "AuthorName");
        assert_eq!(config.entity_columns(), vec!["Author Name".to_string()]);

        let err = config.add_derived_entities(&[EntitySelection::new("missing", None)]);
        assert!(matches!(err, Err(ConfigError::UnknownColumn(_))));
    }

    #[test]
    fn test_set_multi_value_reaches_derived_entities() {
        let headers = vec!["id".to_string(), "keywords".to_string()];
        let mut config = Config::scaffold(&headers, &[]);
        config
            .add_derived_entities(&[EntitySelection::new("keywords", Some("Keyword"))])
            .unwrap();

        config.set_multi_value("keywords", DEFAULT_SPLIT_DELIMITER).unwrap();
        assert_eq!(config.entities[0].properties[1].delimiter(), Some(";"));
        assert_eq!(config.entities[1].identifier_delimiter(), Some(";"));
        assert!(!config.entities[0].properties[0].is_multi_value());

        assert!(matches!(
            config.set_multi_value("nope", ";"),
            Err(ConfigError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_related_column_toggle() {
        let mut entity = EntityConfig::new("Author", "author", "foaf:Person");
        entity.add_related_column("affiliation", &["ACME"]);
        entity.add_related_column("affiliation", &["ACME"]);
        assert_eq!(entity.related_columns, vec!["affiliation".to_string()]);
        assert_eq!(entity.properties.len(), 1);

        entity.remove_related_column("affiliation");
        assert!(entity.related_columns.is_empty());
        assert!(entity.properties.is_empty());
    }

    #[test]
    fn test_identifier_delimiter() {
        let entity = EntityConfig::new("Keyword", "keywords", "ex:Keyword")
            .with_property(PropertyMapping::literal("keywords", ["ex:label"], XSD_STRING).multi_value("|"));
        assert_eq!(entity.identifier_delimiter(), Some("|"));

        let single = EntityConfig::new("Keyword", "keywords", "ex:Keyword");
        assert_eq!(single.identifier_delimiter(), None);
    }
}
