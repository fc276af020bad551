//! Export of the incident graph as linked data.
//!
//! Entities, classes and properties are minted as IRIs under one namespace
//! (`<ns>Report#3`, `<ns>Person`, `<ns>hasAge`). Literals carry their XSD
//! datatype; blank cells are omitted. RDF serialization goes through
//! oxigraph; the JSON listing is a flat array of [`TripleExport`] records.

use std::io::Write;

use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::vocab::{rdf, rdfs, xsd};
use oxigraph::model::{Literal, NamedNode, NamedNodeRef, Term};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::graph::{EntityId, IncidentGraph, Object, Predicate, Triple};
use crate::ontology::{EntityClass, Property, ValueType};
use crate::value::Value;

/// Result type for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "https://data.lacity.org/";

/// Prefix bound to the namespace in Turtle and RDF/XML output.
const PREFIX: &str = "la";

const OWL: &str = "http://www.w3.org/2002/07/owl#";

/// Output format of an export.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    RdfXml,
    Turtle,
    NTriples,
    /// Flat JSON array of triples.
    Json,
    /// The ingested rows, one CSV file per dataset.
    Csv,
}

impl ExportFormat {
    /// The oxigraph format, for the RDF variants.
    pub fn rdf_format(self) -> Option<RdfFormat> {
        match self {
            ExportFormat::RdfXml => Some(RdfFormat::RdfXml),
            ExportFormat::Turtle => Some(RdfFormat::Turtle),
            ExportFormat::NTriples => Some(RdfFormat::NTriples),
            ExportFormat::Json | ExportFormat::Csv => None,
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::RdfXml => "rdf",
            ExportFormat::Turtle => "ttl",
            ExportFormat::NTriples => "nt",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ExportFormat::RdfXml => "rdf-xml",
            ExportFormat::Turtle => "turtle",
            ExportFormat::NTriples => "n-triples",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        })
    }
}

/// IRI minting under a single namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    namespace: String,
}

impl Vocabulary {
    /// Validate `namespace` as an IRI prefix.
    pub fn new(namespace: impl Into<String>) -> ExportResult<Self> {
        let namespace = namespace.into();
        NamedNode::new(namespace.as_str()).map_err(|e| ExportError::InvalidIri {
            iri: namespace.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { namespace })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn mint(&self, local: &str) -> ExportResult<NamedNode> {
        let iri = format!("{}{local}", self.namespace);
        NamedNode::new(iri.as_str()).map_err(|e| ExportError::InvalidIri {
            iri,
            message: e.to_string(),
        })
    }

    /// `<ns><Family>#<n>`, or `<ns><Family>_<n>` when the namespace already
    /// ends in a fragment separator.
    pub fn entity(&self, id: EntityId) -> ExportResult<NamedNode> {
        if self.namespace.ends_with('#') {
            self.mint(&format!("{}_{}", id.family(), id.suffix()))
        } else {
            self.mint(&id.to_string())
        }
    }

    /// `<ns><Class>`.
    pub fn class(&self, class: EntityClass) -> ExportResult<NamedNode> {
        self.mint(class.name())
    }

    /// `<ns><localName>`.
    pub fn property(&self, property: Property) -> ExportResult<NamedNode> {
        self.mint(property.local_name())
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// XSD datatype of a literal type; `None` for entity references.
pub fn datatype(ty: ValueType) -> Option<NamedNodeRef<'static>> {
    match ty {
        ValueType::Integer => Some(xsd::INTEGER),
        ValueType::String => Some(xsd::STRING),
        ValueType::Date => Some(xsd::DATE),
        ValueType::Time => Some(xsd::TIME),
        ValueType::Double => Some(xsd::DOUBLE),
        ValueType::Entity(_) => None,
    }
}

/// The RDF literal for a value, `None` for a blank cell.
pub fn literal(value: &Value) -> Option<Literal> {
    match value {
        Value::String(s) => Some(Literal::new_simple_literal(s.as_str())),
        Value::Empty => None,
        other => {
            let ty = other.value_type().and_then(datatype)?;
            Some(Literal::new_typed_literal(other.lexical(), ty))
        }
    }
}

/// Project the graph onto RDF triples, in insertion order.
pub fn rdf_triples(
    graph: &IncidentGraph,
    vocab: &Vocabulary,
) -> ExportResult<Vec<oxigraph::model::Triple>> {
    let mut out = Vec::with_capacity(graph.len());
    for triple in graph.triples() {
        if let Some(t) = rdf_triple(triple, vocab)? {
            out.push(t);
        }
    }
    Ok(out)
}

fn rdf_triple(
    triple: &Triple,
    vocab: &Vocabulary,
) -> ExportResult<Option<oxigraph::model::Triple>> {
    let predicate = match triple.predicate {
        Predicate::Type => rdf::TYPE.into_owned(),
        Predicate::Attr(p) => vocab.property(p)?,
    };
    let object: Term = match &triple.object {
        Object::Literal(value) => match literal(value) {
            Some(l) => l.into(),
            None => return Ok(None),
        },
        Object::Entity(id) => vocab.entity(*id)?.into(),
        Object::Class(class) => vocab.class(*class)?.into(),
    };
    Ok(Some(oxigraph::model::Triple::new(
        vocab.entity(triple.subject)?,
        predicate,
        object,
    )))
}

/// Schema triples describing the ontology itself.
pub fn ontology_triples(vocab: &Vocabulary) -> ExportResult<Vec<oxigraph::model::Triple>> {
    let owl = |local: &str| NamedNode::new_unchecked(format!("{OWL}{local}"));
    let mut out = Vec::new();

    for class in EntityClass::ALL {
        let iri = vocab.class(*class)?;
        out.push(oxigraph::model::Triple::new(iri.clone(), rdf::TYPE, owl("Class")));
        if let Some(parent) = class.parent() {
            out.push(oxigraph::model::Triple::new(
                iri,
                rdfs::SUB_CLASS_OF,
                vocab.class(parent)?,
            ));
        }
    }

    for property in Property::ALL {
        let iri = vocab.property(*property)?;
        let kind = if property.is_relationship() {
            "ObjectProperty"
        } else {
            "DatatypeProperty"
        };
        out.push(oxigraph::model::Triple::new(iri.clone(), rdf::TYPE, owl(kind)));
        out.push(oxigraph::model::Triple::new(
            iri.clone(),
            rdfs::DOMAIN,
            vocab.class(property.domain())?,
        ));
        let range = match property.value_type() {
            ValueType::Entity(class) => vocab.class(class)?,
            literal_type => match datatype(literal_type) {
                Some(dt) => dt.into_owned(),
                None => continue,
            },
        };
        out.push(oxigraph::model::Triple::new(iri, rdfs::RANGE, range));
    }
    Ok(out)
}

/// Serialize triples to `writer`, returning it once the document is closed.
pub fn write_rdf<W: Write>(
    triples: &[oxigraph::model::Triple],
    format: RdfFormat,
    vocab: &Vocabulary,
    writer: W,
) -> ExportResult<W> {
    let serializer = RdfSerializer::from_format(format)
        .with_prefix(PREFIX, vocab.namespace())
        .map_err(|e| ExportError::InvalidIri {
            iri: vocab.namespace().to_string(),
            message: e.to_string(),
        })?;
    let mut serializer = serializer.for_writer(writer);
    for triple in triples {
        serializer.serialize_triple(triple).map_err(serialize_err)?;
    }
    serializer.finish().map_err(serialize_err)
}

fn serialize_err(e: std::io::Error) -> ExportError {
    ExportError::Serialize {
        message: e.to_string(),
    }
}

/// A triple in the JSON listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleExport {
    /// Subject IRI.
    pub subject: String,
    /// Predicate IRI.
    pub predicate: String,
    /// Object IRI or literal lexical form.
    pub object: String,
    /// XSD datatype IRI for literals, absent for IRIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl TripleExport {
    fn from_rdf(triple: &oxigraph::model::Triple) -> Self {
        let (object, datatype) = match &triple.object {
            Term::Literal(l) => (l.value().to_string(), Some(l.datatype().as_str().to_string())),
            Term::NamedNode(n) => (n.as_str().to_string(), None),
            other => (other.to_string(), None),
        };
        Self {
            subject: triple.subject.to_string().trim_matches(['<', '>']).to_string(),
            predicate: triple.predicate.as_str().to_string(),
            object,
            datatype,
        }
    }
}

/// Flatten triples into the JSON listing form.
pub fn triple_exports(triples: &[oxigraph::model::Triple]) -> Vec<TripleExport> {
    triples.iter().map(TripleExport::from_rdf).collect()
}

/// Write the JSON listing to `writer`.
pub fn write_json<W: Write>(triples: &[oxigraph::model::Triple], writer: W) -> ExportResult<()> {
    serde_json::to_writer_pretty(writer, &triple_exports(triples)).map_err(|e| {
        ExportError::Serialize {
            message: e.to_string(),
        }
    })
}
