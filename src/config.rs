//! Builder configuration, persisted as TOML.
//!
//! ```toml
//! namespace = "https://data.lacity.org/"
//! on_malformed = "skip"
//!
//! [export]
//! format = "turtle"
//! output = "la.ttl"
//! include_ontology = true
//!
//! [[datasets]]
//! shape = "arrest"
//! path = "arrests.csv"
//! limit = 1000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetShape;
use crate::error::ConfigError;
use crate::export::{DEFAULT_NAMESPACE, ExportFormat, Vocabulary};
use crate::ingest::MalformedPolicy;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration of a graph build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// IRI namespace for minted entities, classes and properties.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// What to do with rows that cannot be coerced.
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
    #[serde(default)]
    pub export: ExportConfig,
    /// Datasets to ingest, in order.
    #[serde(default)]
    pub datasets: Vec<DatasetSource>,
}

/// Export target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Prepend the ontology schema triples to RDF output.
    #[serde(default)]
    pub include_ontology: bool,
}

/// One dataset to ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub shape: DatasetShape,
    pub path: PathBuf,
    /// Maximum number of data rows to ingest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}

fn default_output() -> PathBuf {
    PathBuf::from("output.rdf")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            output: default_output(),
            include_ontology: false,
        }
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            on_malformed: MalformedPolicy::default(),
            export: ExportConfig::default(),
            datasets: Vec::new(),
        }
    }
}

impl BuilderConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Check that the namespace is an absolute IRI ending in `/` or `#`.
    pub fn validate(&self) -> ConfigResult<()> {
        self.vocabulary().map(|_| ())
    }

    /// The IRI vocabulary for this configuration's namespace.
    pub fn vocabulary(&self) -> ConfigResult<Vocabulary> {
        let invalid = |message: String| ConfigError::InvalidNamespace {
            namespace: self.namespace.clone(),
            message,
        };
        if !self.namespace.ends_with(['/', '#']) {
            return Err(invalid("must end with '/' or '#'".into()));
        }
        Vocabulary::new(self.namespace.as_str()).map_err(|e| invalid(e.to_string()))
    }

    /// Resolve relative dataset and output paths against `base`
    /// (normally the config file's directory).
    pub fn resolve_paths(&mut self, base: &Path) {
        for source in &mut self.datasets {
            if source.path.is_relative() {
                source.path = base.join(&source.path);
            }
        }
        if self.export.output.is_relative() {
            self.export.output = base.join(&self.export.output);
        }
    }
}
