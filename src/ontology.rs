//! The fixed incident ontology: entity classes and property descriptors.
//!
//! Everything here is static data. Classes form a shallow hierarchy
//! (`ArrestReport` and `CrimeReport` are both `Report`s); every property
//! declares the class that owns it and the type of value it carries.

use serde::{Deserialize, Serialize};

/// An entity class of the incident ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityClass {
    Report,
    ArrestReport,
    CrimeReport,
    Person,
    Location,
    Booking,
    Charge,
    Premise,
    Weapon,
    Status,
    Crime,
}

impl EntityClass {
    /// Every class, parents before children.
    pub const ALL: &'static [EntityClass] = &[
        EntityClass::Report,
        EntityClass::ArrestReport,
        EntityClass::CrimeReport,
        EntityClass::Person,
        EntityClass::Location,
        EntityClass::Booking,
        EntityClass::Charge,
        EntityClass::Premise,
        EntityClass::Weapon,
        EntityClass::Status,
        EntityClass::Crime,
    ];

    /// Local name used in IRIs and display.
    pub fn name(self) -> &'static str {
        match self {
            EntityClass::Report => "Report",
            EntityClass::ArrestReport => "ArrestReport",
            EntityClass::CrimeReport => "CrimeReport",
            EntityClass::Person => "Person",
            EntityClass::Location => "Location",
            EntityClass::Booking => "Booking",
            EntityClass::Charge => "Charge",
            EntityClass::Premise => "Premise",
            EntityClass::Weapon => "Weapon",
            EntityClass::Status => "Status",
            EntityClass::Crime => "Crime",
        }
    }

    /// Direct superclass, if any.
    pub fn parent(self) -> Option<EntityClass> {
        match self {
            EntityClass::ArrestReport | EntityClass::CrimeReport => Some(EntityClass::Report),
            _ => None,
        }
    }

    /// Whether `self` is `other` or one of its subclasses.
    pub fn is_a(self, other: EntityClass) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == other {
                return true;
            }
            current = class.parent();
        }
        false
    }

    /// Abstract classes have no instances of their own.
    pub fn is_abstract(self) -> bool {
        self == EntityClass::Report
    }

    /// The class whose identifier counter this class draws from.
    ///
    /// All reports share one sequence so that arrest and crime reports
    /// ingested into the same graph never collide.
    pub fn family(self) -> EntityClass {
        self.parent().unwrap_or(self)
    }

    /// Properties declared directly on this class (inherited ones excluded).
    pub fn declared_properties(self) -> impl Iterator<Item = Property> {
        Property::ALL.iter().copied().filter(move |p| p.domain() == self)
    }
}

impl std::fmt::Display for EntityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// Declared type of a property's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Integer,
    String,
    Date,
    Time,
    Double,
    /// A link to an entity of the given class.
    Entity(EntityClass),
}

impl ValueType {
    /// Whether values of this type are literals (as opposed to entity links).
    pub fn is_literal(self) -> bool {
        !matches!(self, ValueType::Entity(_))
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Integer => f.write_str("integer"),
            ValueType::String => f.write_str("string"),
            ValueType::Date => f.write_str("date"),
            ValueType::Time => f.write_str("time"),
            ValueType::Double => f.write_str("double"),
            ValueType::Entity(class) => write!(f, "{class} reference"),
        }
    }
}

/// A property (attribute or relationship) of the incident ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Property {
    // Report
    Id,
    Date,
    Time,
    HasPerson,
    HasLocation,
    // ArrestReport
    ReportType,
    ArrestType,
    DispositionDescription,
    HasBooking,
    HasCharge,
    // CrimeReport
    DateReported,
    Mocodes,
    PartClassification,
    HasPremise,
    HasWeapon,
    HasStatus,
    HasCrime,
    // Person
    Age,
    Sex,
    Descent,
    // Location
    ReportingDistrict,
    AreaId,
    AreaName,
    Address,
    CrossStreet,
    Latitude,
    Longitude,
    // Booking
    BookingDate,
    BookingTime,
    BookingLocation,
    BookingCode,
    // Charge
    ChargeGroupCode,
    ChargeGroupDescription,
    ChargeCode,
    ChargeDescription,
    // Premise
    PremiseCode,
    PremiseDescription,
    // Weapon
    WeaponCode,
    WeaponDescription,
    // Status
    StatusCode,
    StatusDescription,
    // Crime
    CrimeCode,
    CrimeDescription,
    CrimeCode1,
    CrimeCode2,
    CrimeCode3,
    CrimeCode4,
}

impl Property {
    pub const ALL: &'static [Property] = &[
        Property::Id,
        Property::Date,
        Property::Time,
        Property::HasPerson,
        Property::HasLocation,
        Property::ReportType,
        Property::ArrestType,
        Property::DispositionDescription,
        Property::HasBooking,
        Property::HasCharge,
        Property::DateReported,
        Property::Mocodes,
        Property::PartClassification,
        Property::HasPremise,
        Property::HasWeapon,
        Property::HasStatus,
        Property::HasCrime,
        Property::Age,
        Property::Sex,
        Property::Descent,
        Property::ReportingDistrict,
        Property::AreaId,
        Property::AreaName,
        Property::Address,
        Property::CrossStreet,
        Property::Latitude,
        Property::Longitude,
        Property::BookingDate,
        Property::BookingTime,
        Property::BookingLocation,
        Property::BookingCode,
        Property::ChargeGroupCode,
        Property::ChargeGroupDescription,
        Property::ChargeCode,
        Property::ChargeDescription,
        Property::PremiseCode,
        Property::PremiseDescription,
        Property::WeaponCode,
        Property::WeaponDescription,
        Property::StatusCode,
        Property::StatusDescription,
        Property::CrimeCode,
        Property::CrimeDescription,
        Property::CrimeCode1,
        Property::CrimeCode2,
        Property::CrimeCode3,
        Property::CrimeCode4,
    ];

    /// Local name used in IRIs.
    pub fn local_name(self) -> &'static str {
        match self {
            Property::Id => "hasID",
            Property::Date => "hasDate",
            Property::Time => "hasTime",
            Property::HasPerson => "hasPerson",
            Property::HasLocation => "hasLocation",
            Property::ReportType => "hasReportType",
            Property::ArrestType => "hasArrestType",
            Property::DispositionDescription => "hasDispositionDescription",
            Property::HasBooking => "hasBooking",
            Property::HasCharge => "hasCharge",
            Property::DateReported => "hasDateReported",
            Property::Mocodes => "hasMocodes",
            Property::PartClassification => "hasPartClassification",
            Property::HasPremise => "hasPremise",
            Property::HasWeapon => "hasWeapon",
            Property::HasStatus => "hasStatus",
            Property::HasCrime => "hasCrime",
            Property::Age => "hasAge",
            Property::Sex => "hasSex",
            Property::Descent => "hasDescent",
            Property::ReportingDistrict => "hasReportingDistrictNumber",
            Property::AreaId => "hasAreaID",
            Property::AreaName => "hasAreaName",
            Property::Address => "hasAddress",
            Property::CrossStreet => "hasCrossStreet",
            Property::Latitude => "hasLatitude",
            Property::Longitude => "hasLongitude",
            Property::BookingDate => "hasBookingDate",
            Property::BookingTime => "hasBookingTime",
            Property::BookingLocation => "hasBookingLocation",
            Property::BookingCode => "hasBookingCode",
            Property::ChargeGroupCode => "hasChargeGroupCode",
            Property::ChargeGroupDescription => "hasChargeGroupDescription",
            Property::ChargeCode => "hasChargeCode",
            Property::ChargeDescription => "hasChargeDescription",
            Property::PremiseCode => "hasPremiseCode",
            Property::PremiseDescription => "hasPremiseDescription",
            Property::WeaponCode => "hasWeaponCode",
            Property::WeaponDescription => "hasWeaponDescription",
            Property::StatusCode => "hasStatusCode",
            Property::StatusDescription => "hasStatusDescription",
            Property::CrimeCode => "hasCrimeCode",
            Property::CrimeDescription => "hasCrimeDescription",
            Property::CrimeCode1 => "hasCrimeCode1",
            Property::CrimeCode2 => "hasCrimeCode2",
            Property::CrimeCode3 => "hasCrimeCode3",
            Property::CrimeCode4 => "hasCrimeCode4",
        }
    }

    /// The class this property belongs to.
    pub fn domain(self) -> EntityClass {
        use EntityClass as C;
        match self {
            Property::Id | Property::Date | Property::Time => C::Report,
            Property::HasPerson | Property::HasLocation => C::Report,
            Property::ReportType
            | Property::ArrestType
            | Property::DispositionDescription
            | Property::HasBooking
            | Property::HasCharge => C::ArrestReport,
            Property::DateReported
            | Property::Mocodes
            | Property::PartClassification
            | Property::HasPremise
            | Property::HasWeapon
            | Property::HasStatus
            | Property::HasCrime => C::CrimeReport,
            Property::Age | Property::Sex | Property::Descent => C::Person,
            Property::ReportingDistrict
            | Property::AreaId
            | Property::AreaName
            | Property::Address
            | Property::CrossStreet
            | Property::Latitude
            | Property::Longitude => C::Location,
            Property::BookingDate
            | Property::BookingTime
            | Property::BookingLocation
            | Property::BookingCode => C::Booking,
            Property::ChargeGroupCode
            | Property::ChargeGroupDescription
            | Property::ChargeCode
            | Property::ChargeDescription => C::Charge,
            Property::PremiseCode | Property::PremiseDescription => C::Premise,
            Property::WeaponCode | Property::WeaponDescription => C::Weapon,
            Property::StatusCode | Property::StatusDescription => C::Status,
            Property::CrimeCode
            | Property::CrimeDescription
            | Property::CrimeCode1
            | Property::CrimeCode2
            | Property::CrimeCode3
            | Property::CrimeCode4 => C::Crime,
        }
    }

    /// Declared value type.
    pub fn value_type(self) -> ValueType {
        use ValueType as T;
        match self {
            Property::HasPerson => T::Entity(EntityClass::Person),
            Property::HasLocation => T::Entity(EntityClass::Location),
            Property::HasBooking => T::Entity(EntityClass::Booking),
            Property::HasCharge => T::Entity(EntityClass::Charge),
            Property::HasPremise => T::Entity(EntityClass::Premise),
            Property::HasWeapon => T::Entity(EntityClass::Weapon),
            Property::HasStatus => T::Entity(EntityClass::Status),
            Property::HasCrime => T::Entity(EntityClass::Crime),

            Property::Id
            | Property::PartClassification
            | Property::Age
            | Property::ReportingDistrict
            | Property::AreaId
            | Property::BookingCode
            | Property::ChargeGroupCode
            | Property::PremiseCode
            | Property::WeaponCode
            | Property::CrimeCode
            | Property::CrimeCode1
            | Property::CrimeCode2
            | Property::CrimeCode3
            | Property::CrimeCode4 => T::Integer,

            Property::Date
            | Property::DateReported
            | Property::BookingDate => T::Date,

            Property::Time | Property::BookingTime => T::Time,

            Property::Latitude | Property::Longitude => T::Double,

            Property::ReportType
            | Property::ArrestType
            | Property::DispositionDescription
            | Property::Mocodes
            | Property::Sex
            | Property::Descent
            | Property::AreaName
            | Property::Address
            | Property::CrossStreet
            | Property::BookingLocation
            | Property::ChargeGroupDescription
            | Property::ChargeCode
            | Property::ChargeDescription
            | Property::PremiseDescription
            | Property::WeaponDescription
            | Property::StatusCode
            | Property::StatusDescription
            | Property::CrimeDescription => T::String,
        }
    }

    /// Whether this property links two entities.
    pub fn is_relationship(self) -> bool {
        !self.value_type().is_literal()
    }

    /// Whether `class` may carry this property (directly or by inheritance).
    pub fn applies_to(self, class: EntityClass) -> bool {
        class.is_a(self.domain())
    }

    #[cfg(test)]
    fn from_local_name(name: &str) -> Option<Property> {
        Property::ALL.iter().copied().find(|p| p.local_name() == name)
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.local_name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn report_subclasses_share_family() {
        assert_eq!(EntityClass::ArrestReport.family(), EntityClass::Report);
        assert_eq!(EntityClass::CrimeReport.family(), EntityClass::Report);
        assert_eq!(EntityClass::Person.family(), EntityClass::Person);
    }

    #[test]
    fn hierarchy() {
        assert!(EntityClass::ArrestReport.is_a(EntityClass::Report));
        assert!(EntityClass::CrimeReport.is_a(EntityClass::CrimeReport));
        assert!(!EntityClass::Report.is_a(EntityClass::ArrestReport));
        assert!(!EntityClass::Person.is_a(EntityClass::Report));
        assert!(EntityClass::Report.is_abstract());
        assert!(!EntityClass::CrimeReport.is_abstract());
    }

    #[test]
    fn local_names_are_unique_and_round_trip() {
        let names: HashSet<_> = Property::ALL.iter().map(|p| p.local_name()).collect();
        assert_eq!(names.len(), Property::ALL.len());
        for p in Property::ALL {
            assert_eq!(Property::from_local_name(p.local_name()), Some(*p));
        }
        assert_eq!(Property::from_local_name("hasNothing"), None);
    }

    #[test]
    fn inherited_properties_apply() {
        assert!(Property::Id.applies_to(EntityClass::ArrestReport));
        assert!(Property::HasPerson.applies_to(EntityClass::CrimeReport));
        assert!(!Property::HasBooking.applies_to(EntityClass::CrimeReport));
        assert!(!Property::Age.applies_to(EntityClass::Location));
    }

    #[test]
    fn relationships_point_at_sub_entities() {
        for p in Property::ALL.iter().filter(|p| p.is_relationship()) {
            let ValueType::Entity(range) = p.value_type() else {
                unreachable!()
            };
            assert!(p.domain().is_a(EntityClass::Report), "{p} should hang off a report");
            assert_ne!(range.family(), EntityClass::Report);
        }
    }

    #[test]
    fn every_class_declares_properties() {
        for class in EntityClass::ALL {
            assert!(class.declared_properties().count() > 0, "{class} has no properties");
        }
    }

    #[test]
    fn charge_codes_are_strings() {
        // LA charge codes carry statute suffixes like "11377(A)HS".
        assert_eq!(Property::ChargeCode.value_type(), ValueType::String);
        assert_eq!(Property::BookingCode.value_type(), ValueType::Integer);
    }
}
