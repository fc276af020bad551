//! Arrest reports (LA open data `amvf-fr72`).

use crate::dataset::DatasetShape;
use crate::ontology::{EntityClass, Property};

use super::schema::Column;
use super::{RecordIngester, SubEntityGroup};

/// Columns of the arrest dataset, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrestColumn {
    ReportId,
    ReportType,
    ArrestDate,
    Time,
    Area,
    AreaDescription,
    ReportingDistrict,
    Age,
    Sex,
    Descent,
    ChargeGroupCode,
    ChargeGroupDescription,
    ArrestType,
    Charge,
    ChargeDescription,
    DispositionDescription,
    Address,
    CrossStreet,
    Latitude,
    Longitude,
    /// Combined point column; latitude and longitude already carry it.
    GeoLocation,
    BookingDate,
    BookingTime,
    BookingLocation,
    BookingLocationCode,
}

impl Column for ArrestColumn {
    const ALL: &'static [Self] = &[
        Self::ReportId,
        Self::ReportType,
        Self::ArrestDate,
        Self::Time,
        Self::Area,
        Self::AreaDescription,
        Self::ReportingDistrict,
        Self::Age,
        Self::Sex,
        Self::Descent,
        Self::ChargeGroupCode,
        Self::ChargeGroupDescription,
        Self::ArrestType,
        Self::Charge,
        Self::ChargeDescription,
        Self::DispositionDescription,
        Self::Address,
        Self::CrossStreet,
        Self::Latitude,
        Self::Longitude,
        Self::GeoLocation,
        Self::BookingDate,
        Self::BookingTime,
        Self::BookingLocation,
        Self::BookingLocationCode,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::ReportId => "rpt_id",
            Self::ReportType => "report_type",
            Self::ArrestDate => "arst_date",
            Self::Time => "time",
            Self::Area => "area",
            Self::AreaDescription => "area_desc",
            Self::ReportingDistrict => "rd",
            Self::Age => "age",
            Self::Sex => "sex_cd",
            Self::Descent => "descent_cd",
            Self::ChargeGroupCode => "chrg_grp_cd",
            Self::ChargeGroupDescription => "grp_description",
            Self::ArrestType => "arst_typ_cd",
            Self::Charge => "charge",
            Self::ChargeDescription => "chrg_desc",
            Self::DispositionDescription => "dispo_desc",
            Self::Address => "location",
            Self::CrossStreet => "crsst",
            Self::Latitude => "lat",
            Self::Longitude => "lon",
            Self::GeoLocation => "location_1",
            Self::BookingDate => "bkg_date",
            Self::BookingTime => "bkg_time",
            Self::BookingLocation => "bkg_location",
            Self::BookingLocationCode => "bkg_loc_cd",
        }
    }

    fn property(self) -> Option<Property> {
        Some(match self {
            Self::ReportId => Property::Id,
            Self::ReportType => Property::ReportType,
            Self::ArrestDate => Property::Date,
            Self::Time => Property::Time,
            Self::Area => Property::AreaId,
            Self::AreaDescription => Property::AreaName,
            Self::ReportingDistrict => Property::ReportingDistrict,
            Self::Age => Property::Age,
            Self::Sex => Property::Sex,
            Self::Descent => Property::Descent,
            Self::ChargeGroupCode => Property::ChargeGroupCode,
            Self::ChargeGroupDescription => Property::ChargeGroupDescription,
            Self::ArrestType => Property::ArrestType,
            Self::Charge => Property::ChargeCode,
            Self::ChargeDescription => Property::ChargeDescription,
            Self::DispositionDescription => Property::DispositionDescription,
            Self::Address => Property::Address,
            Self::CrossStreet => Property::CrossStreet,
            Self::Latitude => Property::Latitude,
            Self::Longitude => Property::Longitude,
            Self::GeoLocation => return None,
            Self::BookingDate => Property::BookingDate,
            Self::BookingTime => Property::BookingTime,
            Self::BookingLocation => Property::BookingLocation,
            Self::BookingLocationCode => Property::BookingCode,
        })
    }

    fn ordinal(self) -> usize {
        self as usize
    }
}

/// Ingests arrest rows as `ArrestReport`s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrestIngester;

impl RecordIngester for ArrestIngester {
    type Column = ArrestColumn;

    const SHAPE: DatasetShape = DatasetShape::Arrest;
    const REPORT_CLASS: EntityClass = EntityClass::ArrestReport;

    const REPORT_COLUMNS: &'static [ArrestColumn] = &[
        ArrestColumn::ReportId,
        ArrestColumn::ReportType,
        ArrestColumn::ArrestDate,
        ArrestColumn::Time,
        ArrestColumn::ArrestType,
        ArrestColumn::DispositionDescription,
    ];

    const GROUPS: &'static [SubEntityGroup<ArrestColumn>] = &[
        SubEntityGroup {
            class: EntityClass::Person,
            link: Property::HasPerson,
            columns: &[ArrestColumn::Age, ArrestColumn::Sex, ArrestColumn::Descent],
        },
        SubEntityGroup {
            class: EntityClass::Location,
            link: Property::HasLocation,
            columns: &[
                ArrestColumn::ReportingDistrict,
                ArrestColumn::Area,
                ArrestColumn::AreaDescription,
                ArrestColumn::Address,
                ArrestColumn::CrossStreet,
                ArrestColumn::Latitude,
                ArrestColumn::Longitude,
            ],
        },
        SubEntityGroup {
            class: EntityClass::Booking,
            link: Property::HasBooking,
            columns: &[
                ArrestColumn::BookingDate,
                ArrestColumn::BookingTime,
                ArrestColumn::BookingLocation,
                ArrestColumn::BookingLocationCode,
            ],
        },
        SubEntityGroup {
            class: EntityClass::Charge,
            link: Property::HasCharge,
            columns: &[
                ArrestColumn::ChargeGroupCode,
                ArrestColumn::ChargeGroupDescription,
                ArrestColumn::Charge,
                ArrestColumn::ChargeDescription,
            ],
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::graph::IncidentGraph;
    use crate::ingest::{ingest, ColumnLayout, MalformedPolicy};
    use crate::value::Value;

    #[test]
    fn ordinals_follow_declaration_order() {
        assert_eq!(ArrestColumn::ALL.len(), 25);
        for (i, column) in ArrestColumn::ALL.iter().enumerate() {
            assert_eq!(column.ordinal(), i);
        }
        assert_eq!(ArrestColumn::GeoLocation.ordinal(), 20);
    }

    #[test]
    fn every_mapped_column_is_used_once() {
        let mut used: Vec<ArrestColumn> = ArrestIngester::REPORT_COLUMNS.to_vec();
        for group in ArrestIngester::GROUPS {
            used.extend_from_slice(group.columns);
        }
        let mapped = ArrestColumn::ALL.iter().filter(|c| c.property().is_some()).count();
        assert_eq!(used.len(), mapped);
        for column in ArrestColumn::ALL {
            if column.property().is_some() {
                assert_eq!(used.iter().filter(|c| *c == column).count(), 1, "{column:?}");
            }
        }
    }

    #[test]
    fn columns_feed_properties_of_their_entity() {
        for column in ArrestIngester::REPORT_COLUMNS {
            let property = column.property().unwrap();
            assert!(property.applies_to(EntityClass::ArrestReport), "{property}");
        }
        for group in ArrestIngester::GROUPS {
            assert!(group.link.applies_to(EntityClass::ArrestReport));
            for column in group.columns {
                assert!(column.property().unwrap().applies_to(group.class));
            }
        }
    }

    #[test]
    fn positional_rows_without_api_header() {
        // Human-readable headers don't match the API names; positions still do.
        let header = [
            "Report ID", "Report Type", "Arrest Date", "Time", "Area ID", "Area Name",
            "Reporting District", "Age", "Sex Code", "Descent Code", "Charge Group Code",
            "Charge Group Description", "Arrest Type Code", "Charge", "Charge Description",
            "Disposition Description", "Address", "Cross Street", "LAT", "LON", "Location",
            "Booking Date", "Booking Time", "Booking Location", "Booking Location Code",
        ];
        let row = [
            "5568617", "RFC", "03/09/2019 12:00:00 AM", "2015", "06", "Hollywood", "0646",
            "29", "M", "O", "", "", "M", "653.22 PC", "SEXUAL BATTERY", "MISDEMEANOR COMPLAINT FILED",
            "7000 HAWTHORN AV", "", "34.0985", "-118.3445", "", "", "", "", "",
        ];
        let ds = Dataset::from_str_rows(DatasetShape::Arrest, "human", &[&header[..], &row[..]]).unwrap();
        assert!(!ColumnLayout::<ArrestColumn>::from_header(ds.header()).by_name());

        let mut graph = IncidentGraph::new();
        let report = ingest(&ds, &mut graph, MalformedPolicy::Abort).unwrap();
        assert_eq!(report.rows_processed, 1, "{:?}", report.failures);

        let id = report.first_report.unwrap();
        let location = graph.linked(id, Property::HasLocation).unwrap();
        assert!(graph
            .subjects_with(Property::AreaId, &Value::Integer(6))
            .contains(&location));
        assert!(graph
            .subjects_with(Property::ReportingDistrict, &Value::Integer(646))
            .contains(&location));

        // Blank booking cells still resolve to one (empty) booking.
        let booking = graph.linked(id, Property::HasBooking).unwrap();
        assert!(graph
            .subjects_with(Property::BookingCode, &Value::Empty)
            .contains(&booking));
    }
}
