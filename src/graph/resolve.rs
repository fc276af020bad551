//! Entity resolution: get-or-create over defining attributes.
//!
//! A sub-entity (person, location, charge, ...) is identified purely by its
//! defining `(property, value)` tuple. Resolution probes the attribute index
//! once per pair, intersects the subject sets starting from the smallest,
//! and either reuses the lowest matching identifier or materializes a new
//! entity carrying exactly the defining attributes.

use crate::error::GraphError;
use crate::ontology::{EntityClass, Property};
use crate::value::Value;

use super::{check_attribute, EntityId, GraphResult, IncidentGraph, Object, Predicate, Triple};

/// Outcome of [`IncidentGraph::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The reused or newly created entity.
    pub id: EntityId,
    /// Whether the entity was created by this call.
    pub created: bool,
    /// How many existing entities matched every defining attribute.
    pub candidates: usize,
}

impl IncidentGraph {
    /// Return an existing entity of `class` holding every defining pair, or
    /// create one.
    ///
    /// The lookup path does not touch the graph. When several entities match,
    /// the lowest identifier wins and the event is counted in
    /// [`ambiguous_resolutions`](IncidentGraph::ambiguous_resolutions).
    pub fn resolve(
        &mut self,
        class: EntityClass,
        defining: &[(Property, Value)],
    ) -> GraphResult<Resolution> {
        if class.is_abstract() {
            return Err(GraphError::AbstractClass { class });
        }
        if class.family() == EntityClass::Report {
            return Err(GraphError::ReportDeduplication { class });
        }
        if defining.is_empty() {
            return Err(GraphError::NoDefiningAttributes { class });
        }
        for (property, value) in defining {
            check_attribute(class, *property, value)?;
        }

        if let Some((id, candidates)) = self.lookup(class, defining) {
            if candidates > 1 {
                self.ambiguous_resolutions += 1;
                tracing::warn!(
                    %class,
                    %id,
                    candidates,
                    "several entities share the same defining attributes; reusing the lowest"
                );
            }
            return Ok(Resolution {
                id,
                created: false,
                candidates,
            });
        }

        let id = self.create_entity(class)?;
        for (property, value) in defining {
            self.insert(Triple::new(
                id,
                Predicate::Attr(*property),
                Object::Literal(value.clone()),
            ));
        }
        tracing::debug!(%id, attributes = defining.len(), "new entity");
        Ok(Resolution {
            id,
            created: true,
            candidates: 0,
        })
    }

    /// Find entities of `class` holding every defining pair.
    ///
    /// Returns the lowest matching identifier and the number of matches.
    pub fn lookup(
        &self,
        class: EntityClass,
        defining: &[(Property, Value)],
    ) -> Option<(EntityId, usize)> {
        let index = self.index();
        let mut sets = Vec::with_capacity(defining.len() + 1);
        sets.push(index.subjects_with(Predicate::Type, &Object::Class(class))?);
        for (property, value) in defining {
            sets.push(index.subjects_with(
                Predicate::Attr(*property),
                &Object::Literal(value.clone()),
            )?);
        }
        sets.sort_by_key(|s| s.len());

        let (smallest, rest) = sets.split_first()?;
        let mut matches = smallest
            .iter()
            .copied()
            .filter(|id| rest.iter().all(|s| s.contains(id)));
        let first = matches.next()?;
        Some((first, 1 + matches.count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(age: i64, sex: &str, descent: &str) -> Vec<(Property, Value)> {
        vec![
            (Property::Age, Value::Integer(age)),
            (Property::Sex, Value::from(sex)),
            (Property::Descent, Value::from(descent)),
        ]
    }

    #[test]
    fn creates_then_reuses() {
        let mut graph = IncidentGraph::new();
        let first = graph.resolve(EntityClass::Person, &person(34, "M", "O")).unwrap();
        assert!(first.created);
        assert_eq!(first.id.to_string(), "Person#0");
        assert_eq!(graph.len(), 4);

        let before = graph.len();
        let second = graph.resolve(EntityClass::Person, &person(34, "M", "O")).unwrap();
        assert!(!second.created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.candidates, 1);
        assert_eq!(graph.len(), before, "lookup path must not write");
    }

    #[test]
    fn one_differing_attribute_creates_new_entity() {
        let mut graph = IncidentGraph::new();
        let a = graph.resolve(EntityClass::Person, &person(34, "M", "O")).unwrap();
        let b = graph.resolve(EntityClass::Person, &person(34, "F", "O")).unwrap();
        let c = graph.resolve(EntityClass::Person, &person(35, "M", "O")).unwrap();
        assert!(b.created && c.created);
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_eq!(c.id.suffix(), 2);
        assert_eq!(graph.entity_count(EntityClass::Person), 3);
    }

    #[test]
    fn partial_overlap_is_not_a_match() {
        let mut graph = IncidentGraph::new();
        graph.resolve(EntityClass::Person, &person(34, "M", "O")).unwrap();
        graph.resolve(EntityClass::Person, &person(20, "F", "H")).unwrap();
        // Age from the first, sex and descent from the second.
        let mixed = graph.resolve(EntityClass::Person, &person(34, "F", "H")).unwrap();
        assert!(mixed.created);
    }

    #[test]
    fn empty_cells_match_each_other() {
        let mut graph = IncidentGraph::new();
        let weapon = vec![
            (Property::WeaponCode, Value::Empty),
            (Property::WeaponDescription, Value::Empty),
        ];
        let a = graph.resolve(EntityClass::Weapon, &weapon).unwrap();
        let b = graph.resolve(EntityClass::Weapon, &weapon).unwrap();
        assert_eq!(a.id, b.id);

        let armed = vec![
            (Property::WeaponCode, Value::Integer(400)),
            (Property::WeaponDescription, Value::Empty),
        ];
        assert!(graph.resolve(EntityClass::Weapon, &armed).unwrap().created);
    }

    #[test]
    fn ambiguous_candidates_pick_lowest_and_are_counted() {
        let mut graph = IncidentGraph::new();
        // Two persons with identical attributes, built by hand.
        for _ in 0..2 {
            let id = graph.create_entity(EntityClass::Person).unwrap();
            for (p, v) in person(40, "F", "B") {
                graph.set_attribute(id, p, v).unwrap();
            }
        }
        let r = graph.resolve(EntityClass::Person, &person(40, "F", "B")).unwrap();
        assert!(!r.created);
        assert_eq!(r.candidates, 2);
        assert_eq!(r.id.suffix(), 0);
        assert_eq!(graph.ambiguous_resolutions(), 1);
    }

    #[test]
    fn lookup_is_scoped_to_class() {
        let mut graph = IncidentGraph::new();
        let premise = vec![(Property::PremiseCode, Value::Integer(101))];
        graph.resolve(EntityClass::Premise, &premise).unwrap();
        assert!(graph.lookup(EntityClass::Premise, &premise).is_some());
        assert!(graph.lookup(EntityClass::Weapon, &premise).is_none());
    }

    #[test]
    fn reports_are_never_resolved() {
        let mut graph = IncidentGraph::new();
        let err = graph
            .resolve(EntityClass::ArrestReport, &[(Property::Id, Value::Integer(1))])
            .unwrap_err();
        assert!(matches!(err, GraphError::ReportDeduplication { .. }));
    }

    #[test]
    fn defects_surface_before_any_write() {
        let mut graph = IncidentGraph::new();
        let err = graph
            .resolve(
                EntityClass::Person,
                &[(Property::Age, Value::Integer(30)), (Property::AreaId, Value::Integer(1))],
            )
            .unwrap_err();
        assert!(matches!(err, GraphError::OntologyMismatch { .. }));

        let err = graph
            .resolve(EntityClass::Person, &[(Property::Age, Value::from("30"))])
            .unwrap_err();
        assert!(matches!(err, GraphError::TypeMismatch { .. }));

        let err = graph.resolve(EntityClass::Person, &[]).unwrap_err();
        assert!(matches!(err, GraphError::NoDefiningAttributes { .. }));

        assert!(graph.is_empty());
        assert_eq!(graph.issued(EntityClass::Person), 0);
    }
}
