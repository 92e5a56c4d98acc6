//! agraph - inspect serialized annotation graphs
//!
//! # Usage
//!
//! ```bash
//! # Layers, anchors and annotation counts
//! agraph summary sample.json
//!
//! # Words under the 1.5s mark
//! agraph at sample.json --offset 1.5 --layer word
//!
//! # Decode and re-encode (drops derived keys, fills generated ids)
//! agraph normalize sample.json --output clean.json
//!
//! # Custom root layer / id prefix
//! agraph --config agraph.yaml summary episode.json
//! ```

use agraph_core::{Graph, GraphConfig};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agraph")]
#[command(about = "Inspect and normalize serialized annotation graphs", long_about = None)]
struct Cli {
    /// Graph configuration (YAML, version 1)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the layer tree with annotation counts
    Summary {
        /// Graph document (JSON)
        file: PathBuf,
    },

    /// Print every label on a layer, in order
    Labels {
        file: PathBuf,

        #[arg(short, long)]
        layer: String,
    },

    /// Print annotations covering an offset
    At {
        file: PathBuf,

        #[arg(short, long)]
        offset: f64,

        /// Restrict to one layer
        #[arg(short, long)]
        layer: Option<String>,
    },

    /// Print anchors ordered by offset
    Anchors { file: PathBuf },

    /// Report instant mismatches, unset anchors and invalid labels
    Validate { file: PathBuf },

    /// Decode and re-encode a document
    Normalize {
        file: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Summary { file } => summary(&load_graph(&file, config)?, out),
        Commands::Labels { file, layer } => {
            let graph = load_graph(&file, config)?;
            for label in graph.labels(&layer)? {
                writeln!(out, "{}", label)?;
            }
            Ok(())
        }
        Commands::At {
            file,
            offset,
            layer,
        } => {
            let graph = load_graph(&file, config)?;
            for a in graph.annotations_at(offset, layer.as_deref())? {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}-{}",
                    a.layer_id(),
                    a.id(),
                    a.label(),
                    fmt_offset(a.start_offset()),
                    fmt_offset(a.end_offset())
                )?;
            }
            Ok(())
        }
        Commands::Anchors { file } => {
            let graph = load_graph(&file, config)?;
            for anchor in graph.ordered_anchors() {
                writeln!(out, "{}\t{}", anchor.id(), fmt_offset(anchor.offset()))?;
            }
            let unset = graph.anchors().len() - graph.ordered_anchors().len();
            if unset > 0 {
                writeln!(out, "({} unset)", unset)?;
            }
            Ok(())
        }
        Commands::Validate { file } => {
            let graph = load_graph(&file, config)?;
            let issues = graph.validate();
            for issue in &issues {
                writeln!(out, "{}", issue)?;
            }
            if !issues.is_empty() {
                bail!("{} validation issue(s) in {}", issues.len(), file.display());
            }
            writeln!(out, "ok")?;
            Ok(())
        }
        Commands::Normalize {
            file,
            output,
            compact,
        } => {
            let graph = load_graph(&file, config)?;
            let json = graph.to_json_string(!compact)?;
            match output {
                Some(path) => std::fs::write(&path, json + "\n")
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => writeln!(out, "{}", json)?,
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<GraphConfig> {
    match path {
        Some(path) => GraphConfig::from_yaml(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(GraphConfig::default()),
    }
}

fn load_graph(path: &Path, config: GraphConfig) -> Result<Graph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let graph = Graph::from_serialized_with(&value, config)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    debug!("Loaded {} ({} annotations)", path.display(), graph.len());
    Ok(graph)
}

fn summary(graph: &Graph, out: &mut impl Write) -> Result<()> {
    writeln!(out, "graph: {}", graph.id().unwrap_or("(no id)"))?;
    writeln!(out, "anchors: {}", graph.anchors().len())?;
    writeln!(out, "annotations: {}", graph.len())?;
    writeln!(out, "layers:")?;

    let schema = graph.schema();
    for handle in schema.layers_top_down() {
        let Some(layer) = schema.get(handle) else {
            continue;
        };
        let depth = schema.ancestors(handle).len();
        writeln!(
            out,
            "{}{} ({}, {})",
            "  ".repeat(depth + 1),
            layer.id(),
            layer.alignment(),
            layer.annotations().len()
        )?;
    }
    Ok(())
}

fn fmt_offset(offset: Option<f64>) -> String {
    offset.map(|o| o.to_string()).unwrap_or_else(|| "?".to_string())
}
