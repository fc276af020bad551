//! Attribute index: `(predicate, object) → subjects`.
//!
//! Maintained incrementally on every triple insertion so that dedup lookups
//! are a hash probe instead of a scan over the whole graph. Subject sets are
//! ordered, which makes "first candidate" the lowest allocated identifier.

use std::collections::{BTreeSet, HashMap};

use super::{EntityId, Object, Predicate, Triple};

/// Live multi-attribute index over a triple set.
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    subjects: HashMap<Predicate, HashMap<Object, BTreeSet<EntityId>>>,
}

impl AttributeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a triple. Returns `false` if the subject was already indexed
    /// under this `(predicate, object)` pair.
    pub fn insert(&mut self, triple: &Triple) -> bool {
        self.subjects
            .entry(triple.predicate)
            .or_default()
            .entry(triple.object.clone())
            .or_default()
            .insert(triple.subject)
    }

    /// Every subject holding `(subject, predicate, object)`.
    pub fn subjects_with(&self, predicate: Predicate, object: &Object) -> Option<&BTreeSet<EntityId>> {
        self.subjects.get(&predicate)?.get(object)
    }

    #[cfg(test)]
    fn cardinality(&self, predicate: Predicate, object: &Object) -> usize {
        self.subjects_with(predicate, object).map_or(0, BTreeSet::len)
    }

    /// Number of distinct `(predicate, object)` keys.
    pub fn key_count(&self) -> usize {
        self.subjects.values().map(HashMap::len).sum()
    }
}
