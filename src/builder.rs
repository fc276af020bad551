//! Builder facade: top-level API for building and exporting an incident graph.
//!
//! The `GraphBuilder` owns the configuration, the graph, and every dataset it
//! has ingested, so that one builder corresponds to one build run with a
//! single continuous identifier space.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{BuilderConfig, DatasetSource};
use crate::dataset::{Dataset, DatasetShape, sibling_csv_path};
use crate::error::{CivicResult, ExportError};
use crate::export::{self, ExportFormat, Vocabulary};
use crate::graph::{GraphStats, IncidentGraph};
use crate::ingest::{self, IngestReport};

/// Builds one incident graph from any number of datasets.
#[derive(Debug)]
pub struct GraphBuilder {
    config: BuilderConfig,
    vocabulary: Vocabulary,
    graph: IncidentGraph,
    datasets: Vec<Dataset>,
    reports: Vec<IngestReport>,
}

impl GraphBuilder {
    /// Create a builder; fails if the configured namespace is not a usable IRI.
    pub fn new(config: BuilderConfig) -> CivicResult<Self> {
        let vocabulary = config.vocabulary()?;
        tracing::info!(
            namespace = vocabulary.namespace(),
            policy = ?config.on_malformed,
            datasets = config.datasets.len(),
            "initializing graph builder"
        );
        Ok(Self {
            config,
            vocabulary,
            graph: IncidentGraph::new(),
            datasets: Vec::new(),
            reports: Vec::new(),
        })
    }

    /// Ingest an in-memory dataset under the configured malformed-row policy.
    pub fn ingest(&mut self, dataset: Dataset) -> CivicResult<&IngestReport> {
        let report = ingest::ingest(&dataset, &mut self.graph, self.config.on_malformed)?;
        tracing::info!("{report}");
        self.datasets.push(dataset);
        self.reports.push(report);
        Ok(&self.reports[self.reports.len() - 1])
    }

    /// Load a CSV dataset, apply its row limit, and ingest it.
    pub fn load(&mut self, source: &DatasetSource) -> CivicResult<&IngestReport> {
        let mut dataset = Dataset::read_csv(source.shape, &source.path)?;
        if let Some(limit) = source.limit {
            dataset.truncate(limit);
        }
        self.ingest(dataset)
    }

    /// Load every dataset listed in the configuration, in order.
    pub fn load_configured(&mut self) -> CivicResult<()> {
        for source in self.config.datasets.clone() {
            self.load(&source)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn graph(&self) -> &IncidentGraph {
        &self.graph
    }

    /// Consume the builder, keeping only the graph.
    pub fn into_graph(self) -> IncidentGraph {
        self.graph
    }

    /// Datasets ingested so far, in order.
    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    /// One report per ingested dataset, in order.
    pub fn reports(&self) -> &[IngestReport] {
        &self.reports
    }

    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }

    /// RDF projection of the graph, preceded by the ontology schema when
    /// `include_ontology` is set.
    pub fn rdf_triples(&self) -> CivicResult<Vec<oxigraph::model::Triple>> {
        let mut triples = if self.config.export.include_ontology {
            export::ontology_triples(&self.vocabulary)?
        } else {
            Vec::new()
        };
        triples.extend(export::rdf_triples(&self.graph, &self.vocabulary)?);
        Ok(triples)
    }

    /// Write a single-document export (RDF or JSON) to `writer`.
    pub fn write<W: Write>(&self, format: ExportFormat, mut writer: W) -> CivicResult<()> {
        let triples = self.rdf_triples()?;
        match format.rdf_format() {
            Some(rdf) => {
                let mut writer = export::write_rdf(&triples, rdf, &self.vocabulary, writer)?;
                writer.flush().map_err(|e| ExportError::Serialize {
                    message: e.to_string(),
                })?;
            }
            None if format == ExportFormat::Json => export::write_json(&triples, &mut writer)?,
            None => return Err(ExportError::CsvNeedsPath.into()),
        }
        Ok(())
    }

    /// Export to `path` in `format`. Returns every file written.
    ///
    /// CSV writes one file per ingested dataset next to `path`; every other
    /// format writes `path` itself.
    pub fn export(&self, path: &Path, format: ExportFormat) -> CivicResult<Vec<PathBuf>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        if format == ExportFormat::Csv {
            let mut seen: BTreeMap<DatasetShape, usize> = BTreeMap::new();
            let mut written = Vec::with_capacity(self.datasets.len());
            for dataset in &self.datasets {
                let occurrence = seen.entry(dataset.shape()).or_insert(0);
                let target = sibling_csv_path(path, dataset.shape(), *occurrence);
                *occurrence += 1;
                dataset.write_csv(&target)?;
                written.push(target);
            }
            tracing::info!(files = written.len(), "exported datasets as CSV");
            return Ok(written);
        }

        let file = File::create(path).map_err(|e| io_err(path, e))?;
        self.write(format, BufWriter::new(file))?;
        tracing::info!(path = %path.display(), %format, triples = self.graph.len(), "exported graph");
        Ok(vec![path.to_path_buf()])
    }

    /// Export to the configured output path and format.
    pub fn export_configured(&self) -> CivicResult<Vec<PathBuf>> {
        self.export(&self.config.export.output, self.config.export.format)
    }
}

fn io_err(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CivicError;
    use crate::ingest::{ArrestColumn, Column, MalformedPolicy};
    use crate::ontology::EntityClass;

    fn arrests(ids: &[&'static str]) -> Dataset {
        let header: Vec<&str> = ArrestColumn::ALL.iter().map(|c| c.name()).collect();
        let mut table = vec![header];
        for id in ids {
            let mut row = vec![""; 25];
            row[0] = *id;
            row[7] = "34";
            table.push(row);
        }
        let table: Vec<&[&str]> = table.iter().map(Vec::as_slice).collect();
        Dataset::from_str_rows(DatasetShape::Arrest, "arrests", &table).unwrap()
    }

    #[test]
    fn rejects_bad_namespace() {
        let config = BuilderConfig {
            namespace: "nope".into(),
            ..Default::default()
        };
        assert!(matches!(
            GraphBuilder::new(config),
            Err(CivicError::Config(_))
        ));
    }

    #[test]
    fn reports_accumulate_across_datasets() {
        let mut builder = GraphBuilder::new(BuilderConfig::default()).unwrap();
        builder.ingest(arrests(&["1", "2"])).unwrap();
        let second = builder.ingest(arrests(&["3"])).unwrap();
        assert_eq!(second.first_report.unwrap().to_string(), "Report#2");
        assert_eq!(builder.reports().len(), 2);
        assert_eq!(builder.datasets().len(), 2);
        assert_eq!(builder.stats().entities[&EntityClass::Person], 1);
        assert_eq!(builder.config().on_malformed, MalformedPolicy::Skip);
    }

    #[test]
    fn ontology_is_prepended_on_request() {
        let mut config = BuilderConfig::default();
        let mut builder = GraphBuilder::new(config.clone()).unwrap();
        builder.ingest(arrests(&["1"])).unwrap();
        let plain = builder.rdf_triples().unwrap().len();

        config.export.include_ontology = true;
        let mut with_schema = GraphBuilder::new(config).unwrap();
        with_schema.ingest(arrests(&["1"])).unwrap();
        assert!(with_schema.rdf_triples().unwrap().len() > plain);
    }

    #[test]
    fn csv_needs_a_path() {
        let builder = GraphBuilder::new(BuilderConfig::default()).unwrap();
        let err = builder.write(ExportFormat::Csv, Vec::new()).unwrap_err();
        assert!(matches!(err, CivicError::Export(ExportError::CsvNeedsPath)));
    }

    #[test]
    fn csv_export_writes_one_file_per_dataset() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut builder = GraphBuilder::new(BuilderConfig::default()).unwrap();
        builder.ingest(arrests(&["1"])).unwrap();
        builder.ingest(arrests(&["2"])).unwrap();

        let written = builder
            .export(&tmp.path().join("graph.csv"), ExportFormat::Csv)
            .unwrap();
        assert_eq!(
            written,
            vec![
                tmp.path().join("graph_arrest_reports.csv"),
                tmp.path().join("graph_arrest_reports_2.csv"),
            ]
        );
        let back = Dataset::read_csv(DatasetShape::Arrest, &written[1]).unwrap();
        assert_eq!(back.rows()[0][0], "2");
    }
}
