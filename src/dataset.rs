//! Tabular datasets: a header row plus ordered rows of string cells.
//!
//! Datasets are the only input the graph builder consumes. They can be
//! built from memory (row 0 is the header) or loaded from a CSV file, and
//! written back out unchanged for the flat re-export.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Result type for dataset operations.
pub type DatasetResult<T> = std::result::Result<T, DatasetError>;

/// The record layout a dataset follows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DatasetShape {
    /// Arrest reports (LA open data `amvf-fr72`).
    Arrest,
    /// Crime reports (LA open data `2nrs-mtv8`).
    Crime,
}

impl DatasetShape {
    /// Suffix used for the CSV re-export file name.
    pub fn file_suffix(self) -> &'static str {
        match self {
            DatasetShape::Arrest => "arrest_reports",
            DatasetShape::Crime => "crime_reports",
        }
    }
}

impl std::fmt::Display for DatasetShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetShape::Arrest => f.write_str("arrest"),
            DatasetShape::Crime => f.write_str("crime"),
        }
    }
}

/// An in-memory table of string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    shape: DatasetShape,
    origin: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset from a raw table whose first row is the header.
    pub fn from_table(
        shape: DatasetShape,
        origin: impl Into<String>,
        mut table: Vec<Vec<String>>,
    ) -> DatasetResult<Self> {
        let origin = origin.into();
        if table.is_empty() {
            return Err(DatasetError::Empty { origin });
        }
        let header = table.remove(0);
        Ok(Self {
            shape,
            origin,
            header,
            rows: table,
        })
    }

    /// Build a dataset from string slices; handy for fixtures.
    pub fn from_str_rows(shape: DatasetShape, origin: &str, table: &[&[&str]]) -> DatasetResult<Self> {
        let table = table
            .iter()
            .map(|row| row.iter().map(|c| (*c).to_string()).collect())
            .collect();
        Self::from_table(shape, origin, table)
    }

    /// Load a comma-separated file. Rows may have differing widths; short
    /// rows are reported later by the ingester as malformed records.
    pub fn read_csv(shape: DatasetShape, path: &Path) -> DatasetResult<Self> {
        let csv_err = |e: csv::Error| DatasetError::CsvRead {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;

        let mut table = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            table.push(record.iter().map(str::to_string).collect());
        }
        tracing::info!(path = %path.display(), rows = table.len().saturating_sub(1), %shape, "loaded dataset");
        Self::from_table(shape, path.display().to_string(), table)
    }

    /// Write header and rows back out as CSV.
    pub fn write_csv(&self, path: &Path) -> DatasetResult<()> {
        let csv_err = |e: csv::Error| DatasetError::CsvWrite {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;
        writer.write_record(&self.header).map_err(csv_err)?;
        for row in &self.rows {
            writer.write_record(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| DatasetError::CsvWrite {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Keep at most `limit` data rows.
    pub fn truncate(&mut self, limit: usize) {
        self.rows.truncate(limit);
    }

    pub fn shape(&self) -> DatasetShape {
        self.shape
    }

    /// Where the dataset came from (file path or a caller-chosen label).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows, header excluded.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Path for a dataset's CSV re-export next to `destination`.
///
/// `out/graph.csv` becomes `out/graph_arrest_reports.csv` for the first
/// arrest dataset and `out/graph_arrest_reports_2.csv` for the second.
pub fn sibling_csv_path(destination: &Path, shape: DatasetShape, occurrence: usize) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let mut base = format!("{stem}_{}", shape.file_suffix());
    if occurrence > 0 {
        base.push_str(&format!("_{}", occurrence + 1));
    }
    let file_name = match destination.extension() {
        Some(ext) => format!("{base}.{}", ext.to_string_lossy()),
        None => base,
    };
    destination.with_file_name(file_name)
}
