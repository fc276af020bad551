//! Per-family identifier allocation.
//!
//! Each identifier family (see [`EntityClass::family`]) owns a dense,
//! monotonically increasing counter starting at zero. The counter is bumped
//! exactly once per entity creation, independent of which attributes the
//! entity ends up holding.

use std::collections::BTreeMap;

use crate::ontology::EntityClass;

use super::EntityId;

/// Sequential suffix allocator keyed by identifier family.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: BTreeMap<EntityClass, u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next suffix for `class`'s family and consume it.
    pub fn next_suffix(&mut self, class: EntityClass) -> u64 {
        let counter = self.next.entry(class.family()).or_insert(0);
        let suffix = *counter;
        *counter += 1;
        suffix
    }

    /// Allocate a fresh identifier for an entity of `class`.
    pub fn allocate(&mut self, class: EntityClass) -> EntityId {
        let suffix = self.next_suffix(class);
        EntityId::new(class.family(), suffix)
    }

    /// The suffix the next allocation for `class`'s family would receive,
    /// which is also the number of identifiers issued so far.
    pub fn count(&self, class: EntityClass) -> u64 {
        self.next.get(&class.family()).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes_are_dense_per_family() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.next_suffix(EntityClass::Person), 0);
        assert_eq!(alloc.next_suffix(EntityClass::Person), 1);
        assert_eq!(alloc.next_suffix(EntityClass::Location), 0);
        assert_eq!(alloc.next_suffix(EntityClass::Person), 2);
        assert_eq!(alloc.count(EntityClass::Person), 3);
        assert_eq!(alloc.count(EntityClass::Charge), 0);
    }

    #[test]
    fn report_subclasses_share_a_counter() {
        let mut alloc = IdAllocator::new();
        let a = alloc.allocate(EntityClass::ArrestReport);
        let b = alloc.allocate(EntityClass::CrimeReport);
        let c = alloc.allocate(EntityClass::ArrestReport);
        assert_eq!(a.to_string(), "Report#0");
        assert_eq!(b.to_string(), "Report#1");
        assert_eq!(c.to_string(), "Report#2");
        assert_eq!(alloc.count(EntityClass::Report), 3);
    }
}
