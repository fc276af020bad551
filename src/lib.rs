// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # civic-graph
//!
//! An entity-resolving graph builder for civic incident records. Flat arrest
//! and crime report tables are ingested into a typed graph where every row
//! becomes a report node and the people, places, bookings, charges and other
//! sub-entities it mentions are deduplicated across rows and datasets.
//!
//! ## Architecture
//!
//! - **Ontology** (`ontology`): fixed class hierarchy and property catalog
//! - **Values** (`value`): typed literals and cell coercion
//! - **Graph** (`graph`): owned triple set, attribute index, per-family
//!   identifier counters, get-or-create entity resolution
//! - **Ingestion** (`ingest`): typed row schemas and per-shape ingesters
//! - **Export** (`export`): RDF via oxigraph, JSON listing, CSV re-export
//!
//! ## Library usage
//!
//! ```no_run
//! use civic_graph::builder::GraphBuilder;
//! use civic_graph::config::{BuilderConfig, DatasetSource};
//! use civic_graph::dataset::DatasetShape;
//! use civic_graph::export::ExportFormat;
//!
//! let mut builder = GraphBuilder::new(BuilderConfig::default()).unwrap();
//! builder
//!     .load(&DatasetSource {
//!         shape: DatasetShape::Arrest,
//!         path: "arrests.csv".into(),
//!         limit: Some(1000),
//!     })
//!     .unwrap();
//! builder.export("arrests.ttl".as_ref(), ExportFormat::Turtle).unwrap();
//! ```

pub mod builder;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod graph;
pub mod ingest;
pub mod ontology;
pub mod value;
