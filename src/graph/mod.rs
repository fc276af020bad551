//! Incident graph: an exclusively-owned, append-only triple set.
//!
//! The graph stores triples `(subject, predicate, object)` where the subject
//! is always an entity, the predicate is `rdf:type` or an ontology property,
//! and the object is a literal, another entity, or a class.
//!
//! - **Attribute index** ([`index::AttributeIndex`]): `(predicate, object) → subjects`
//! - **Identifier allocation** ([`allocator::IdAllocator`]): dense per-family counters
//! - **Entity resolution** ([`resolve`]): get-or-create over defining attributes

pub mod allocator;
pub mod index;
pub mod resolve;

use std::collections::{BTreeMap, BTreeSet};

use crate::error::GraphError;
use crate::ontology::{EntityClass, Property, ValueType};
use crate::value::Value;

use self::allocator::IdAllocator;
use self::index::AttributeIndex;

pub use self::resolve::Resolution;

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Identifier of an entity: an identifier family plus a dense suffix.
///
/// Arrest and crime reports share the `Report` family, so `Report#3` is
/// unique across every dataset ingested into one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    family: EntityClass,
    suffix: u64,
}

impl EntityId {
    pub(crate) fn new(family: EntityClass, suffix: u64) -> Self {
        Self { family, suffix }
    }

    /// The counter class this identifier was drawn from.
    pub fn family(self) -> EntityClass {
        self.family
    }

    /// Sequence number within the family.
    pub fn suffix(self) -> u64 {
        self.suffix
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.family, self.suffix)
    }
}

/// Predicate position of a triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Predicate {
    /// `rdf:type`.
    Type,
    /// An ontology property.
    Attr(Property),
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Type => f.write_str("rdf:type"),
            Predicate::Attr(p) => write!(f, "{p}"),
        }
    }
}

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Object {
    Literal(Value),
    Entity(EntityId),
    Class(EntityClass),
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Literal(v) => write!(f, "{v}"),
            Object::Entity(id) => write!(f, "{id}"),
            Object::Class(c) => write!(f, "{c}"),
        }
    }
}

/// A triple (subject, predicate, object) in the incident graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: EntityId,
    pub predicate: Predicate,
    pub object: Object,
}

impl Triple {
    pub fn new(subject: EntityId, predicate: Predicate, object: Object) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// In-memory incident graph.
///
/// Owned by exactly one ingestion run and passed `&mut` to ingesters.
/// Triples are never removed; inserting an existing triple is a no-op.
#[derive(Debug, Clone, Default)]
pub struct IncidentGraph {
    /// Triples in insertion order.
    triples: Vec<Triple>,
    /// Doubles as the set-membership check for `triples`.
    index: AttributeIndex,
    allocator: IdAllocator,
    /// Concrete class of every entity, as recorded by its type triple.
    classes: BTreeMap<EntityId, EntityClass>,
    /// Resolutions that matched more than one existing entity.
    ambiguous_resolutions: usize,
}

impl IncidentGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw triple. Returns `false` if it was already present.
    ///
    /// Callers outside the graph go through [`create_entity`](Self::create_entity),
    /// [`set_attribute`](Self::set_attribute) and [`link`](Self::link), which
    /// enforce the ontology.
    pub(crate) fn insert(&mut self, triple: Triple) -> bool {
        if !self.index.insert(&triple) {
            return false;
        }
        self.triples.push(triple);
        true
    }

    /// Allocate a new entity of a concrete class and write its type triple.
    pub fn create_entity(&mut self, class: EntityClass) -> GraphResult<EntityId> {
        if class.is_abstract() {
            return Err(GraphError::AbstractClass { class });
        }
        let id = self.allocator.allocate(class);
        self.classes.insert(id, class);
        self.insert(Triple::new(id, Predicate::Type, Object::Class(class)));
        tracing::trace!(%id, %class, "entity created");
        Ok(id)
    }

    /// Attach a literal attribute to an existing entity.
    pub fn set_attribute(
        &mut self,
        subject: EntityId,
        property: Property,
        value: Value,
    ) -> GraphResult<bool> {
        let class = self.require_class(subject)?;
        check_attribute(class, property, &value)?;
        Ok(self.insert(Triple::new(
            subject,
            Predicate::Attr(property),
            Object::Literal(value),
        )))
    }

    /// Link `subject` to `target` through a relationship property.
    pub fn link(
        &mut self,
        subject: EntityId,
        property: Property,
        target: EntityId,
    ) -> GraphResult<bool> {
        let class = self.require_class(subject)?;
        if !property.applies_to(class) {
            return Err(GraphError::OntologyMismatch { class, property });
        }
        let target_class = self.require_class(target)?;
        match property.value_type() {
            ValueType::Entity(range) if target_class.is_a(range) => {}
            expected => {
                return Err(GraphError::TypeMismatch {
                    property,
                    expected,
                    actual: format!("{target_class} reference"),
                });
            }
        }
        Ok(self.insert(Triple::new(
            subject,
            Predicate::Attr(property),
            Object::Entity(target),
        )))
    }

    fn require_class(&self, id: EntityId) -> GraphResult<EntityClass> {
        self.classes
            .get(&id)
            .copied()
            .ok_or(GraphError::UnknownEntity { id })
    }

    /// Concrete class of an entity.
    pub fn class_of(&self, id: EntityId) -> Option<EntityClass> {
        self.classes.get(&id).copied()
    }

    /// Every subject currently holding `(subject, property, value)`.
    pub fn subjects_with(&self, property: Property, value: &Value) -> BTreeSet<EntityId> {
        self.index
            .subjects_with(Predicate::Attr(property), &Object::Literal(value.clone()))
            .cloned()
            .unwrap_or_default()
    }

    /// Every subject linked to `target` through `property`.
    pub fn subjects_linked_to(&self, property: Property, target: EntityId) -> BTreeSet<EntityId> {
        self.index
            .subjects_with(Predicate::Attr(property), &Object::Entity(target))
            .cloned()
            .unwrap_or_default()
    }

    /// Entities whose type triple names exactly `class`.
    pub fn subjects_of_class(&self, class: EntityClass) -> BTreeSet<EntityId> {
        self.index
            .subjects_with(Predicate::Type, &Object::Class(class))
            .cloned()
            .unwrap_or_default()
    }

    /// Entities whose class is `class` or a subclass of it, in identifier order.
    pub fn entities_of(&self, class: EntityClass) -> Vec<EntityId> {
        self.classes
            .iter()
            .filter(|(_, c)| c.is_a(class))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of entities whose class is `class` or a subclass of it.
    pub fn entity_count(&self, class: EntityClass) -> usize {
        self.classes.values().filter(|c| c.is_a(class)).count()
    }

    /// Number of identifiers issued so far in `class`'s family.
    pub fn issued(&self, class: EntityClass) -> u64 {
        self.allocator.count(class)
    }

    /// All triples in insertion order.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Triples whose subject is `subject`. This scans the whole graph.
    pub fn triples_from(&self, subject: EntityId) -> impl Iterator<Item = &Triple> {
        self.triples.iter().filter(move |t| t.subject == subject)
    }

    /// Objects of `(subject, property, ?)`.
    pub fn objects_of(&self, subject: EntityId, property: Property) -> Vec<&Object> {
        self.triples_from(subject)
            .filter(|t| t.predicate == Predicate::Attr(property))
            .map(|t| &t.object)
            .collect()
    }

    /// The single entity `subject` links to through `property`, if any.
    pub fn linked(&self, subject: EntityId, property: Property) -> Option<EntityId> {
        self.objects_of(subject, property).into_iter().find_map(|o| match o {
            Object::Entity(id) => Some(*id),
            _ => None,
        })
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the graph holds no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// The attribute index backing dedup lookups.
    pub fn index(&self) -> &AttributeIndex {
        &self.index
    }

    /// Resolutions so far that matched more than one existing entity.
    pub fn ambiguous_resolutions(&self) -> usize {
        self.ambiguous_resolutions
    }

    /// Summary counts.
    pub fn stats(&self) -> GraphStats {
        let mut entities = BTreeMap::new();
        for class in self.classes.values() {
            *entities.entry(*class).or_insert(0) += 1;
        }
        GraphStats {
            triple_count: self.triples.len(),
            entity_count: self.classes.len(),
            entities,
            index_keys: self.index.key_count(),
            ambiguous_resolutions: self.ambiguous_resolutions,
        }
    }
}

/// Validate a literal attribute against the ontology.
pub(crate) fn check_attribute(
    class: EntityClass,
    property: Property,
    value: &Value,
) -> GraphResult<()> {
    if !property.applies_to(class) {
        return Err(GraphError::OntologyMismatch { class, property });
    }
    let expected = property.value_type();
    if !value.conforms_to(expected) {
        return Err(GraphError::TypeMismatch {
            property,
            expected,
            actual: value
                .value_type()
                .map_or_else(|| "empty".to_string(), |t| t.to_string()),
        });
    }
    Ok(())
}

/// Summary counts for an [`IncidentGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub triple_count: usize,
    pub entity_count: usize,
    /// Entities per concrete class.
    pub entities: BTreeMap<EntityClass, usize>,
    /// Distinct `(predicate, object)` keys in the attribute index.
    pub index_keys: usize,
    pub ambiguous_resolutions: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Triples:   {}", self.triple_count)?;
        writeln!(f, "Entities:  {}", self.entity_count)?;
        for (class, count) in &self.entities {
            writeln!(f, "  {class:<14}{count}")?;
        }
        writeln!(f, "Index keys: {}", self.index_keys)?;
        write!(f, "Ambiguous resolutions: {}", self.ambiguous_resolutions)
    }
}
