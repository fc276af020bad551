//! Record ingestion: turning dataset rows into reports and resolved sub-entities.
//!
//! Each dataset shape has an ingester that declares its column schema, the
//! report attributes it copies verbatim, and the sub-entity groups it
//! resolves. The ingestion loop is shared:
//!
//! 1. resolve the column layout once from the header row;
//! 2. coerce the whole row (a malformed row never touches the graph);
//! 3. create a fresh report entity and attach its scalar attributes;
//! 4. resolve every sub-entity group and link the report to it.

pub mod arrest;
pub mod crime;
pub mod schema;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, DatasetShape};
use crate::error::RecordError;
use crate::graph::{EntityId, GraphResult, IncidentGraph};
use crate::ontology::{EntityClass, Property};

pub use self::arrest::{ArrestColumn, ArrestIngester};
pub use self::crime::{CrimeColumn, CrimeIngester};
pub use self::schema::{Column, ColumnLayout, TypedRow};

/// What to do with a row that cannot be coerced.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Record the failure and continue with the next row.
    #[default]
    Skip,
    /// Record the failure and stop ingesting this dataset.
    Abort,
}

/// A sub-entity resolved once per row and linked from the report.
#[derive(Debug, Clone, Copy)]
pub struct SubEntityGroup<C: 'static> {
    pub class: EntityClass,
    /// Relationship property from the report to the sub-entity.
    pub link: Property,
    /// Columns whose values form the defining tuple.
    pub columns: &'static [C],
}

/// A per-shape record ingester.
pub trait RecordIngester {
    type Column: Column;

    const SHAPE: DatasetShape;

    /// Concrete report class created for every row.
    const REPORT_CLASS: EntityClass;

    /// Columns copied onto the report entity itself.
    const REPORT_COLUMNS: &'static [Self::Column];

    /// Sub-entity groups, resolved in this order.
    const GROUPS: &'static [SubEntityGroup<Self::Column>];

    /// Materialize one coerced row: a new report plus its linked sub-entities.
    fn materialize(
        graph: &mut IncidentGraph,
        row: &TypedRow<Self::Column>,
        report: &mut IngestReport,
    ) -> GraphResult<EntityId> {
        let id = graph.create_entity(Self::REPORT_CLASS)?;
        report.note_created(Self::REPORT_CLASS);
        for (property, value) in row.pairs(Self::REPORT_COLUMNS) {
            graph.set_attribute(id, property, value)?;
        }
        for group in Self::GROUPS {
            let resolution = graph.resolve(group.class, &row.pairs(group.columns))?;
            if resolution.created {
                report.note_created(group.class);
            } else {
                report.reused += 1;
            }
            graph.link(id, group.link, resolution.id)?;
        }
        Ok(id)
    }
}

/// Outcome of ingesting one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub shape: DatasetShape,
    pub origin: String,
    /// Whether columns were located by header name rather than position.
    pub layout_by_name: bool,
    /// Rows turned into reports.
    pub rows_processed: usize,
    /// Malformed rows, in input order.
    pub failures: Vec<RecordError>,
    /// Ingestion stopped at the first malformed row.
    pub halted: bool,
    /// Entities created, per concrete class.
    pub created: BTreeMap<EntityClass, usize>,
    /// Sub-entity resolutions that reused an existing entity.
    pub reused: usize,
    pub first_report: Option<EntityId>,
    pub last_report: Option<EntityId>,
}

impl IngestReport {
    fn new(dataset: &Dataset, layout_by_name: bool) -> Self {
        Self {
            shape: dataset.shape(),
            origin: dataset.origin().to_string(),
            layout_by_name,
            rows_processed: 0,
            failures: Vec::new(),
            halted: false,
            created: BTreeMap::new(),
            reused: 0,
            first_report: None,
            last_report: None,
        }
    }

    fn note_created(&mut self, class: EntityClass) {
        *self.created.entry(class).or_insert(0) += 1;
    }

    pub fn rows_failed(&self) -> usize {
        self.failures.len()
    }

    /// Total entities created, reports included.
    pub fn created_total(&self) -> usize {
        self.created.values().sum()
    }
}

impl std::fmt::Display for IngestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): {} rows ingested, {} malformed",
            self.origin,
            self.shape,
            self.rows_processed,
            self.rows_failed()
        )?;
        if self.halted {
            f.write_str(" (halted)")?;
        }
        if let (Some(first), Some(last)) = (self.first_report, self.last_report) {
            write!(f, ", reports {first}..={last}")?;
        }
        write!(
            f,
            ", {} entities created, {} reused",
            self.created_total(),
            self.reused
        )
    }
}

/// Ingest `dataset` with the ingester for its shape.
pub fn ingest(
    dataset: &Dataset,
    graph: &mut IncidentGraph,
    policy: MalformedPolicy,
) -> GraphResult<IngestReport> {
    match dataset.shape() {
        DatasetShape::Arrest => ingest_with::<ArrestIngester>(dataset, graph, policy),
        DatasetShape::Crime => ingest_with::<CrimeIngester>(dataset, graph, policy),
    }
}

/// Ingest `dataset` with a specific ingester.
///
/// Report numbering continues from whatever the graph already holds, so
/// ingesting arrests then crimes into one graph yields one dense `Report`
/// sequence. Malformed rows are handled per `policy`; ontology defects
/// abort with an error and leave already-ingested rows in place.
pub fn ingest_with<I: RecordIngester>(
    dataset: &Dataset,
    graph: &mut IncidentGraph,
    policy: MalformedPolicy,
) -> GraphResult<IngestReport> {
    let layout = ColumnLayout::<I::Column>::from_header(dataset.header());
    let mut report = IngestReport::new(dataset, layout.by_name());
    tracing::info!(
        origin = dataset.origin(),
        shape = %I::SHAPE,
        rows = dataset.len(),
        by_name = layout.by_name(),
        next_report = graph.issued(EntityClass::Report),
        "ingesting dataset"
    );

    for (index, cells) in dataset.rows().iter().enumerate() {
        let row_number = index + 1;
        let row = match layout.extract(row_number, cells) {
            Ok(row) => row,
            Err(err) => {
                tracing::warn!(row = row_number, error = %err, "malformed record");
                report.failures.push(err);
                match policy {
                    MalformedPolicy::Skip => continue,
                    MalformedPolicy::Abort => {
                        report.halted = true;
                        break;
                    }
                }
            }
        };
        let id = I::materialize(graph, &row, &mut report)?;
        if report.first_report.is_none() {
            report.first_report = Some(id);
        }
        report.last_report = Some(id);
        report.rows_processed += 1;
    }

    tracing::info!(
        origin = dataset.origin(),
        processed = report.rows_processed,
        failed = report.rows_failed(),
        halted = report.halted,
        reused = report.reused,
        triples = graph.len(),
        "dataset ingested"
    );
    Ok(report)
}
