use crate::config::load_config;
use crate::ir::VertexCounters;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::metrics::{MetricKind, Metrics};
use crate::parser::parse_topology;
use crate::view::DagView;
use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tezdag", version, about = "Lay out a Tez DAG topology for rendering")]
pub struct Args {
    /// Topology file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file (layout gaps, vertex sizes, viewport)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Metric used for heat colouring (input, output, recordsRead, ...)
    #[arg(short = 'm', long = "metric")]
    pub metric: Option<MetricKind>,

    /// Vertex id to select and focus
    #[arg(short = 's', long = "select")]
    pub select: Option<String>,

    /// JSON object mapping vertex id to fresh counters
    #[arg(long = "counters")]
    pub counters: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Viewport height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Log layout stages to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.view.viewport_width = width;
    }
    if let Some(height) = args.height {
        config.view.viewport_height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let dag = parse_topology(&input)?;
    let mut view = DagView::new(&dag, config.layout, config.view)?;
    info!(
        vertices = view.layout().nodes.len(),
        width = view.layout().width,
        height = view.layout().height,
        "laid out topology"
    );

    if let Some(path) = args.counters.as_deref() {
        let snapshot = read_counters(path)?;
        view.update_metrics(snapshot);
    }
    if let Some(metric) = args.metric.or(config.metric) {
        view.set_metric_type(metric);
    }
    if let Some(id) = args.select.as_deref() {
        view.select_vertex(Some(id), true)?;
    }

    let dump = LayoutDump::from_view(&view);
    write_layout_dump(args.output.as_deref(), &dump)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tez_dag_layout=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading topology {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn read_counters(path: &Path) -> Result<Vec<(String, Metrics)>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading counters {}", path.display()))?;
    parse_counters(&contents)
}

fn parse_counters(contents: &str) -> Result<Vec<(String, Metrics)>> {
    let parsed: BTreeMap<String, VertexCounters> = serde_json::from_str(contents)?;
    Ok(parsed
        .into_iter()
        .map(|(id, counters)| (id, Metrics::from_counters(&counters)))
        .collect())
}
