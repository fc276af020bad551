//! civic-graph CLI: build a linked-data graph from LA arrest and crime records.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use civic_graph::builder::GraphBuilder;
use civic_graph::config::{BuilderConfig, DatasetSource};
use civic_graph::dataset::DatasetShape;
use civic_graph::export::{self, ExportFormat, Vocabulary};
use civic_graph::ingest::MalformedPolicy;

#[derive(Parser)]
#[command(
    name = "civic-graph",
    version,
    about = "Entity-resolving graph builder for civic incident records"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest datasets and export the resulting graph.
    Build {
        /// TOML config file (see `civic-graph init`).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Arrest CSV files, ingested in order. Replaces the configured datasets.
        #[arg(long)]
        arrests: Vec<PathBuf>,

        /// Crime CSV files, ingested after the arrest files.
        #[arg(long)]
        crimes: Vec<PathBuf>,

        /// Output file.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Output format.
        #[arg(long, short, value_enum)]
        format: Option<ExportFormat>,

        /// What to do with rows that cannot be read.
        #[arg(long, value_enum)]
        on_malformed: Option<MalformedPolicy>,

        /// Maximum number of rows to ingest per dataset.
        #[arg(long)]
        limit: Option<usize>,

        /// IRI namespace for the exported graph.
        #[arg(long)]
        namespace: Option<String>,

        /// Include the ontology schema in RDF output.
        #[arg(long)]
        include_ontology: bool,
    },

    /// Print the ontology schema.
    Ontology {
        #[arg(long, short, value_enum, default_value = "turtle")]
        format: ExportFormat,

        /// IRI namespace for classes and properties.
        #[arg(long, default_value = export::DEFAULT_NAMESPACE)]
        namespace: String,
    },

    /// Write a starter config file.
    Init {
        #[arg(long, default_value = "civic-graph.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            arrests,
            crimes,
            output,
            format,
            on_malformed,
            limit,
            namespace,
            include_ontology,
        } => {
            let mut cfg = match &config {
                Some(path) => {
                    let mut cfg = BuilderConfig::load(path)?;
                    if let Some(base) = path.parent() {
                        cfg.resolve_paths(base);
                    }
                    cfg
                }
                None => BuilderConfig::default(),
            };

            if !arrests.is_empty() || !crimes.is_empty() {
                let sources = arrests
                    .into_iter()
                    .map(|path| (DatasetShape::Arrest, path))
                    .chain(crimes.into_iter().map(|path| (DatasetShape::Crime, path)));
                cfg.datasets = sources
                    .map(|(shape, path)| DatasetSource {
                        shape,
                        path,
                        limit: None,
                    })
                    .collect();
            }
            if let Some(limit) = limit {
                for source in &mut cfg.datasets {
                    source.limit = Some(limit);
                }
            }
            if let Some(policy) = on_malformed {
                cfg.on_malformed = policy;
            }
            if let Some(namespace) = namespace {
                cfg.namespace = namespace;
            }
            if let Some(format) = format {
                cfg.export.format = format;
                if output.is_none() && config.is_none() {
                    cfg.export.output = PathBuf::from(format!("output.{}", format.extension()));
                }
            }
            if let Some(output) = output {
                cfg.export.output = output;
            }
            cfg.export.include_ontology |= include_ontology;

            if cfg.datasets.is_empty() {
                miette::bail!("no datasets to ingest; pass --arrests/--crimes or a config file");
            }

            let mut builder = GraphBuilder::new(cfg)?;
            builder.load_configured()?;
            let written = builder.export_configured()?;

            for report in builder.reports() {
                println!("{report}");
                for failure in report.failures.iter().take(5) {
                    println!("  {failure}");
                }
                if report.rows_failed() > 5 {
                    println!("  ... and {} more", report.rows_failed() - 5);
                }
            }
            println!("{}", builder.stats());
            for path in written {
                println!("Wrote {}", path.display());
            }
        }

        Commands::Ontology { format, namespace } => {
            let vocab = Vocabulary::new(namespace)?;
            let triples = export::ontology_triples(&vocab)?;
            let stdout = std::io::stdout().lock();
            match format.rdf_format() {
                Some(rdf) => {
                    let mut out = export::write_rdf(&triples, rdf, &vocab, stdout)?;
                    out.flush().into_diagnostic()?;
                }
                None if format == ExportFormat::Json => export::write_json(&triples, stdout)?,
                None => miette::bail!("the ontology has no CSV form; use an RDF format or json"),
            }
        }

        Commands::Init { path, force } => {
            if path.exists() && !force {
                miette::bail!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                );
            }
            let cfg = BuilderConfig {
                datasets: vec![
                    DatasetSource {
                        shape: DatasetShape::Arrest,
                        path: PathBuf::from("arrests.csv"),
                        limit: Some(1000),
                    },
                    DatasetSource {
                        shape: DatasetShape::Crime,
                        path: PathBuf::from("crimes.csv"),
                        limit: Some(1000),
                    },
                ],
                ..Default::default()
            };
            cfg.save(&path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
