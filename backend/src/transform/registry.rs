//! Per-run record of emitted resources.
//!
//! A fresh [`ResourceRegistry`] is created for every generation run and
//! dropped with it; nothing is remembered across runs.

use std::collections::{HashMap, HashSet};

/// Canonical identifiers already emitted, per entity name.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    claimed: HashMap<String, HashSet<String>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `(entity, canonical_id)`.
    ///
    /// `true` the first time the pair is seen, `false` on every later call:
    /// the caller must then not emit the resource again.
    pub fn try_claim(&mut self, entity: &str, canonical_id: &str) -> bool {
        match self.claimed.get_mut(entity) {
            Some(ids) => ids.insert(canonical_id.to_string()),
            None => {
                let ids = HashSet::from([canonical_id.to_string()]);
                self.claimed.insert(entity.to_string(), ids);
                true
            }
        }
    }

    /// Number of resources claimed across all entities.
    pub fn len(&self) -> usize {
        self.claimed.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
