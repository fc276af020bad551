//! Rich diagnostic error types for the civic-graph builder.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Malformed records are ordinary data
//! problems and are counted by the ingestion report; graph errors are
//! ontology defects and always propagate.

use miette::Diagnostic;
use thiserror::Error;

use crate::graph::EntityId;
use crate::ontology::{EntityClass, Property, ValueType};

/// Top-level error type for the civic-graph builder.
#[derive(Debug, Error, Diagnostic)]
pub enum CivicError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience result alias for the whole crate.
pub type CivicResult<T> = std::result::Result<T, CivicError>;

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("property {property} is not declared for class {class}")]
    #[diagnostic(
        code(civic::graph::ontology_mismatch),
        help(
            "Every defining attribute must belong to the target class or one of its \
             ancestors. This is a mapping defect in the caller, not bad input data."
        )
    )]
    OntologyMismatch { class: EntityClass, property: Property },

    #[error("property {property} expects {expected} but was given {actual}")]
    #[diagnostic(
        code(civic::graph::type_mismatch),
        help(
            "A property's declared value type is fixed by the ontology. Coerce cells \
             with `Value::coerce` against the property's type before inserting."
        )
    )]
    TypeMismatch {
        property: Property,
        expected: ValueType,
        actual: String,
    },

    #[error("class {class} is abstract and cannot be instantiated")]
    #[diagnostic(
        code(civic::graph::abstract_class),
        help("Instantiate one of its concrete subclasses (ArrestReport or CrimeReport).")
    )]
    AbstractClass { class: EntityClass },

    #[error("class {class} belongs to the Report family and is never deduplicated")]
    #[diagnostic(
        code(civic::graph::report_dedup),
        help("Create reports with `IncidentGraph::create_entity`; only sub-entities are resolved.")
    )]
    ReportDeduplication { class: EntityClass },

    #[error("no defining attributes supplied for class {class}")]
    #[diagnostic(
        code(civic::graph::no_defining_attributes),
        help("Resolution needs at least one (property, value) pair to match on.")
    )]
    NoDefiningAttributes { class: EntityClass },

    #[error("entity {id} does not exist in this graph")]
    #[diagnostic(
        code(civic::graph::unknown_entity),
        help("Identifiers are only valid within the graph that allocated them.")
    )]
    UnknownEntity { id: EntityId },
}

// ---------------------------------------------------------------------------
// Record (malformed row) errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum RecordError {
    #[error("row {row}: expected at least {required} columns, found {found}")]
    #[diagnostic(
        code(civic::record::missing_columns),
        help(
            "The row is shorter than the column layout for this dataset shape. \
             Check the delimiter and that the file matches the selected shape."
        )
    )]
    MissingColumns {
        row: usize,
        required: usize,
        found: usize,
    },

    #[error("row {row}, column \"{column}\": cannot read {cell:?} as {expected} for {property}")]
    #[diagnostic(
        code(civic::record::invalid_cell),
        help(
            "The cell does not parse as the property's declared type. Integers and \
             doubles must be plain numbers, dates YYYY-MM-DD or MM/DD/YYYY, times \
             HH:MM[:SS] or military HHMM."
        )
    )]
    InvalidCell {
        row: usize,
        column: &'static str,
        property: Property,
        expected: ValueType,
        cell: String,
    },
}

impl RecordError {
    /// Data row number the error refers to (1-based, header excluded).
    pub fn row(&self) -> usize {
        match self {
            RecordError::MissingColumns { row, .. } | RecordError::InvalidCell { row, .. } => *row,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DatasetError {
    #[error("failed to read CSV from {path}: {message}")]
    #[diagnostic(
        code(civic::dataset::csv_read),
        help("Check that the file exists, is UTF-8 encoded and comma-delimited.")
    )]
    CsvRead { path: String, message: String },

    #[error("failed to write CSV to {path}: {message}")]
    #[diagnostic(
        code(civic::dataset::csv_write),
        help("Check that the destination directory exists and is writable.")
    )]
    CsvWrite { path: String, message: String },

    #[error("dataset {origin} has no header row")]
    #[diagnostic(
        code(civic::dataset::empty),
        help("Row 0 of every dataset must be a header; the file appears to be empty.")
    )]
    Empty { origin: String },
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("I/O error while exporting to {path}: {source}")]
    #[diagnostic(
        code(civic::export::io),
        help("Check that the output path is writable and the disk is not full.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid IRI \"{iri}\": {message}")]
    #[diagnostic(
        code(civic::export::invalid_iri),
        help("The namespace must be an absolute IRI such as https://data.lacity.org/.")
    )]
    InvalidIri { iri: String, message: String },

    #[error("CSV export writes one file per dataset and needs an output path")]
    #[diagnostic(
        code(civic::export::csv_target),
        help("Pass an output file; datasets are written next to it as <stem>_arrest_reports.csv and so on.")
    )]
    CsvNeedsPath,

    #[error("serialization failed: {message}")]
    #[diagnostic(code(civic::export::serialize), help("The serializer rejected the graph."))]
    Serialize { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    #[diagnostic(
        code(civic::config::read),
        help("Create one with `civic-graph init` or pass the options on the command line.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(civic::config::parse),
        help("The file must be valid TOML; see `civic-graph init` for a template.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config {path}: {source}")]
    #[diagnostic(code(civic::config::write), help("Check directory permissions."))]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid namespace \"{namespace}\": {message}")]
    #[diagnostic(
        code(civic::config::namespace),
        help("Use an absolute IRI ending in '/' or '#', e.g. https://data.lacity.org/.")
    )]
    InvalidNamespace { namespace: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_error_row_accessor() {
        let err = RecordError::MissingColumns {
            row: 4,
            required: 25,
            found: 3,
        };
        assert_eq!(err.row(), 4);
        assert!(err.to_string().contains("at least 25 columns"));
    }

    #[test]
    fn graph_error_wraps_transparently() {
        let err: CivicError = GraphError::AbstractClass {
            class: EntityClass::Report,
        }
        .into();
        assert_eq!(err.to_string(), "class Report is abstract and cannot be instantiated");
    }
}
