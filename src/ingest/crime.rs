//! Crime reports (LA open data `2nrs-mtv8`).

use crate::dataset::DatasetShape;
use crate::ontology::{EntityClass, Property};

use super::schema::Column;
use super::{RecordIngester, SubEntityGroup};

/// Columns of the crime dataset, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrimeColumn {
    ReportId,
    DateReported,
    DateOccurred,
    TimeOccurred,
    Area,
    AreaName,
    ReportingDistrict,
    Part,
    CrimeCode,
    CrimeDescription,
    Mocodes,
    VictimAge,
    VictimSex,
    VictimDescent,
    PremiseCode,
    PremiseDescription,
    WeaponCode,
    WeaponDescription,
    Status,
    StatusDescription,
    CrimeCode1,
    CrimeCode2,
    CrimeCode3,
    CrimeCode4,
    Address,
    CrossStreet,
    Latitude,
    Longitude,
}

impl Column for CrimeColumn {
    const ALL: &'static [Self] = &[
        Self::ReportId,
        Self::DateReported,
        Self::DateOccurred,
        Self::TimeOccurred,
        Self::Area,
        Self::AreaName,
        Self::ReportingDistrict,
        Self::Part,
        Self::CrimeCode,
        Self::CrimeDescription,
        Self::Mocodes,
        Self::VictimAge,
        Self::VictimSex,
        Self::VictimDescent,
        Self::PremiseCode,
        Self::PremiseDescription,
        Self::WeaponCode,
        Self::WeaponDescription,
        Self::Status,
        Self::StatusDescription,
        Self::CrimeCode1,
        Self::CrimeCode2,
        Self::CrimeCode3,
        Self::CrimeCode4,
        Self::Address,
        Self::CrossStreet,
        Self::Latitude,
        Self::Longitude,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::ReportId => "dr_no",
            Self::DateReported => "date_rptd",
            Self::DateOccurred => "date_occ",
            Self::TimeOccurred => "time_occ",
            Self::Area => "area",
            Self::AreaName => "area_name",
            Self::ReportingDistrict => "rpt_dist_no",
            Self::Part => "part_1_2",
            Self::CrimeCode => "crm_cd",
            Self::CrimeDescription => "crm_cd_desc",
            Self::Mocodes => "mocodes",
            Self::VictimAge => "vict_age",
            Self::VictimSex => "vict_sex",
            Self::VictimDescent => "vict_descent",
            Self::PremiseCode => "premis_cd",
            Self::PremiseDescription => "premis_desc",
            Self::WeaponCode => "weapon_used_cd",
            Self::WeaponDescription => "weapon_desc",
            Self::Status => "status",
            Self::StatusDescription => "status_desc",
            Self::CrimeCode1 => "crm_cd_1",
            Self::CrimeCode2 => "crm_cd_2",
            Self::CrimeCode3 => "crm_cd_3",
            Self::CrimeCode4 => "crm_cd_4",
            Self::Address => "location",
            Self::CrossStreet => "cross_street",
            Self::Latitude => "lat",
            Self::Longitude => "lon",
        }
    }

    fn property(self) -> Option<Property> {
        Some(match self {
            Self::ReportId => Property::Id,
            Self::DateReported => Property::DateReported,
            Self::DateOccurred => Property::Date,
            Self::TimeOccurred => Property::Time,
            Self::Area => Property::AreaId,
            Self::AreaName => Property::AreaName,
            Self::ReportingDistrict => Property::ReportingDistrict,
            Self::Part => Property::PartClassification,
            Self::CrimeCode => Property::CrimeCode,
            Self::CrimeDescription => Property::CrimeDescription,
            Self::Mocodes => Property::Mocodes,
            Self::VictimAge => Property::Age,
            Self::VictimSex => Property::Sex,
            Self::VictimDescent => Property::Descent,
            Self::PremiseCode => Property::PremiseCode,
            Self::PremiseDescription => Property::PremiseDescription,
            Self::WeaponCode => Property::WeaponCode,
            Self::WeaponDescription => Property::WeaponDescription,
            Self::Status => Property::StatusCode,
            Self::StatusDescription => Property::StatusDescription,
            Self::CrimeCode1 => Property::CrimeCode1,
            Self::CrimeCode2 => Property::CrimeCode2,
            Self::CrimeCode3 => Property::CrimeCode3,
            Self::CrimeCode4 => Property::CrimeCode4,
            Self::Address => Property::Address,
            Self::CrossStreet => Property::CrossStreet,
            Self::Latitude => Property::Latitude,
            Self::Longitude => Property::Longitude,
        })
    }

    fn ordinal(self) -> usize {
        self as usize
    }
}

/// Ingests crime rows as `CrimeReport`s.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrimeIngester;

impl RecordIngester for CrimeIngester {
    type Column = CrimeColumn;

    const SHAPE: DatasetShape = DatasetShape::Crime;
    const REPORT_CLASS: EntityClass = EntityClass::CrimeReport;

    const REPORT_COLUMNS: &'static [CrimeColumn] = &[
        CrimeColumn::ReportId,
        CrimeColumn::DateReported,
        CrimeColumn::DateOccurred,
        CrimeColumn::TimeOccurred,
        CrimeColumn::Part,
        CrimeColumn::Mocodes,
    ];

    const GROUPS: &'static [SubEntityGroup<CrimeColumn>] = &[
        SubEntityGroup {
            class: EntityClass::Person,
            link: Property::HasPerson,
            columns: &[
                CrimeColumn::VictimAge,
                CrimeColumn::VictimSex,
                CrimeColumn::VictimDescent,
            ],
        },
        SubEntityGroup {
            class: EntityClass::Location,
            link: Property::HasLocation,
            columns: &[
                CrimeColumn::ReportingDistrict,
                CrimeColumn::Area,
                CrimeColumn::AreaName,
                CrimeColumn::Address,
                CrimeColumn::CrossStreet,
                CrimeColumn::Latitude,
                CrimeColumn::Longitude,
            ],
        },
        SubEntityGroup {
            class: EntityClass::Premise,
            link: Property::HasPremise,
            columns: &[CrimeColumn::PremiseCode, CrimeColumn::PremiseDescription],
        },
        SubEntityGroup {
            class: EntityClass::Weapon,
            link: Property::HasWeapon,
            columns: &[CrimeColumn::WeaponCode, CrimeColumn::WeaponDescription],
        },
        SubEntityGroup {
            class: EntityClass::Status,
            link: Property::HasStatus,
            columns: &[CrimeColumn::Status, CrimeColumn::StatusDescription],
        },
        SubEntityGroup {
            class: EntityClass::Crime,
            link: Property::HasCrime,
            columns: &[
                CrimeColumn::CrimeCode,
                CrimeColumn::CrimeDescription,
                CrimeColumn::CrimeCode1,
                CrimeColumn::CrimeCode2,
                CrimeColumn::CrimeCode3,
                CrimeColumn::CrimeCode4,
            ],
        },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::graph::IncidentGraph;
    use crate::ingest::{ingest, ArrestColumn, ColumnLayout, MalformedPolicy};
    use crate::value::Value;

    const HUMAN_HEADER: [&str; 28] = [
        "DR_NO", "Date Rptd", "DATE OCC", "TIME OCC", "AREA", "AREA NAME", "Rpt Dist No",
        "Part 1-2", "Crm Cd", "Crm Cd Desc", "Mocodes", "Vict Age", "Vict Sex", "Vict Descent",
        "Premis Cd", "Premis Desc", "Weapon Used Cd", "Weapon Desc", "Status", "Status Desc",
        "Crm Cd 1", "Crm Cd 2", "Crm Cd 3", "Crm Cd 4", "LOCATION", "Cross Street", "LAT", "LON",
    ];

    fn crime_row(dr_no: &'static str, weapon: &'static str) -> [&'static str; 28] {
        [
            dr_no, "03/01/2020 12:00:00 AM", "03/01/2020 12:00:00 AM", "2130", "07", "Wilshire",
            "0784", "1", "510", "VEHICLE - STOLEN", "", "0", "M", "O", "101", "STREET", weapon,
            "", "AA", "Adult Arrest", "510", "998", "", "", "1900 S LONGWOOD AV", "", "34.0375",
            "-118.3506",
        ]
    }

    #[test]
    fn ordinals_follow_declaration_order() {
        assert_eq!(CrimeColumn::ALL.len(), 28);
        for (i, column) in CrimeColumn::ALL.iter().enumerate() {
            assert_eq!(column.ordinal(), i);
        }
    }

    #[test]
    fn every_column_is_used_once() {
        let mut used: Vec<CrimeColumn> = CrimeIngester::REPORT_COLUMNS.to_vec();
        for group in CrimeIngester::GROUPS {
            used.extend_from_slice(group.columns);
        }
        assert_eq!(used.len(), CrimeColumn::ALL.len());
        for column in CrimeColumn::ALL {
            assert!(used.contains(column), "{column:?}");
        }
    }

    #[test]
    fn columns_feed_properties_of_their_entity() {
        for column in CrimeIngester::REPORT_COLUMNS {
            assert!(column.property().unwrap().applies_to(EntityClass::CrimeReport));
        }
        for group in CrimeIngester::GROUPS {
            assert!(group.link.applies_to(EntityClass::CrimeReport));
            for column in group.columns {
                assert!(column.property().unwrap().applies_to(group.class));
            }
        }
    }

    #[test]
    fn portal_headers_match_by_name() {
        let header: Vec<String> = HUMAN_HEADER.iter().map(|h| h.to_string()).collect();
        let layout = ColumnLayout::<CrimeColumn>::from_header(&header);
        assert!(layout.by_name());
        assert_eq!(layout.position(CrimeColumn::Part), 7);
        assert_eq!(layout.position(CrimeColumn::Longitude), 27);
    }

    #[test]
    fn weapon_and_premise_are_deduplicated() {
        let ds = Dataset::from_str_rows(
            DatasetShape::Crime,
            "crimes",
            &[&HUMAN_HEADER[..], &crime_row("1", "")[..], &crime_row("2", "")[..], &crime_row("3", "400")[..]],
        )
        .unwrap();
        let mut graph = IncidentGraph::new();
        let report = ingest(&ds, &mut graph, MalformedPolicy::Abort).unwrap();

        assert_eq!(report.rows_processed, 3, "{:?}", report.failures);
        assert_eq!(graph.entity_count(EntityClass::CrimeReport), 3);
        assert_eq!(graph.entity_count(EntityClass::Premise), 1);
        assert_eq!(graph.entity_count(EntityClass::Weapon), 2);
        assert_eq!(graph.entity_count(EntityClass::Crime), 1);
        assert_eq!(graph.entity_count(EntityClass::Status), 1);

        let first = report.first_report.unwrap();
        let crime = graph.linked(first, Property::HasCrime).unwrap();
        assert!(graph
            .subjects_with(Property::CrimeCode2, &Value::Integer(998))
            .contains(&crime));
        assert!(graph
            .subjects_with(Property::PartClassification, &Value::Integer(1))
            .contains(&first));
    }

    #[test]
    fn crime_reports_continue_arrest_numbering() {
        let arrest_header: Vec<&str> = ArrestColumn::ALL.iter().map(|c| c.name()).collect();
        let mut arrest_row = vec![""; 25];
        arrest_row[0] = "99";
        let arrests =
            Dataset::from_str_rows(DatasetShape::Arrest, "arrests", &[&arrest_header[..], &arrest_row[..]])
                .unwrap();
        let crimes = Dataset::from_str_rows(
            DatasetShape::Crime,
            "crimes",
            &[&HUMAN_HEADER[..], &crime_row("1", "")[..]],
        )
        .unwrap();

        let mut graph = IncidentGraph::new();
        ingest(&arrests, &mut graph, MalformedPolicy::Skip).unwrap();
        let report = ingest(&crimes, &mut graph, MalformedPolicy::Skip).unwrap();
        assert_eq!(report.first_report.unwrap().to_string(), "Report#1");
        assert_eq!(graph.class_of(report.first_report.unwrap()), Some(EntityClass::CrimeReport));

        // A victim with age 0 and an arrestee with blank age are different people.
        assert_eq!(graph.entity_count(EntityClass::Person), 2);
    }
}
