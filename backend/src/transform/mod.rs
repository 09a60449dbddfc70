//! Transformation module.
//!
//! This module handles rows to Turtle generation:
//! - Canonical: identifier cleanup for URI paths
//! - Literal: string escaping and typed literals
//! - Registry: per-run resource deduplication
//! - Resolver: one mapping over one row
//! - Entity: one entity over all rows
//! - Linker: main entity columns turned into graph edges
//! - Turtle: statement and document serialization
//! - Pipeline: the staged generation run

pub mod canonical;
pub mod entity;
pub mod linker;
pub mod literal;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod turtle;

pub use canonical::canonicalize;
pub use entity::{process_entity, EntityStats};
pub use linker::{fallback_relationship_property, link_relationships};
pub use literal::{escape_literal, unescape_literal, Literal};
pub use pipeline::*;
pub use registry::ResourceRegistry;
pub use resolver::resolve_property;
pub use turtle::{serialize_turtle, Fragment, Object, Statement, TurtleDocument};
