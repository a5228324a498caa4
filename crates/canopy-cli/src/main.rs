//! Canopy CLI - lay out grouped signed values as a squarified treemap.
//!
//! Input is a JSON object of groups, each mapping item labels to a signed
//! value (for example sector -> ticker -> daily change in percent):
//!
//! ```json
//! { "semiconductors": { "NVDA": 2.1, "INTC": -0.8 },
//!   "oil-gas": { "XOM": -1.2, "CVX": 0.4 } }
//! ```

#![allow(clippy::needless_pass_by_value, clippy::uninlined_format_args)]

use anyhow::{anyhow, bail, Context, Result};
use canopy_core::{group_by_mean, NodeRef};
use canopy_layout::{
    Canvas, LayoutConfig, LayoutEngine, PlacedRectangle, Projection, View,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "Squarified treemap layout for grouped signed values")]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a level of the hierarchy and print its cells
    Layout {
        /// Input JSON file, or '-' for stdin
        input: PathBuf,

        /// TOML config with canvas, colors and projection settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Canvas width (overrides config)
        #[arg(long)]
        width: Option<f64>,

        /// Canvas height (overrides config)
        #[arg(long)]
        height: Option<f64>,

        /// Drill into the cell with this label; repeat to go deeper
        #[arg(short, long)]
        drill: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Print extruded blocks on the centered canvas instead of cells
        #[arg(long)]
        blocks: bool,
    },

    /// Check that every level of the input can be laid out
    Check {
        /// Input JSON file, or '-' for stdin
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// One cell in JSON output.
#[derive(Serialize)]
struct CellReport<'a> {
    label: &'a str,
    value: f64,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: String,
    children: usize,
}

impl<'a> From<&'a PlacedRectangle> for CellReport<'a> {
    fn from(cell: &'a PlacedRectangle) -> Self {
        Self {
            label: &cell.node.label,
            value: cell.node.signed_value(),
            x: cell.bounds.x,
            y: cell.bounds.y,
            width: cell.bounds.width,
            height: cell.bounds.height,
            color: cell.color.to_hex(),
            children: cell.node.children.len(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Layout {
            input,
            config,
            width,
            height,
            drill,
            format,
            blocks,
        } => run_layout(&input, config.as_deref(), width, height, &drill, format, blocks),
        Commands::Check { input } => run_check(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<Vec<NodeRef>> {
    let source = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    parse_input(&source)
}

/// Parse `group -> item -> number` JSON, keeping document order.
fn parse_input(source: &str) -> Result<Vec<NodeRef>> {
    let doc: Map<String, Value> =
        serde_json::from_str(source).context("input must map group -> item -> number")?;
    debug!(groups = doc.len(), "parsed input");

    let mut groups = Vec::with_capacity(doc.len());
    for (group, items) in doc {
        let Value::Object(items) = items else {
            bail!("group '{}' must map item -> number", group);
        };
        let items = items
            .into_iter()
            .map(|(item, value)| {
                value
                    .as_f64()
                    .map(|v| (item.clone(), v))
                    .ok_or_else(|| anyhow!("item '{}' in group '{}' is not a number", item, group))
            })
            .collect::<Result<Vec<_>>>()?;
        groups.push((group, items));
    }
    Ok(group_by_mean(groups))
}

/// Follow `labels` down from the current level, one label per level.
fn drill_path(engine: &mut LayoutEngine, labels: &[String]) -> Result<()> {
    for label in labels {
        let Some(cell) = engine
            .current()
            .iter()
            .find(|c| &c.node.label == label)
            .cloned()
        else {
            bail!("no cell labelled '{}' at this level", label);
        };
        if !engine.select_cell(&cell)? {
            bail!("'{}' has no children to drill into", label);
        }
        info!(label = %label, "drilled down");
    }
    Ok(())
}

fn run_layout(
    input: &Path,
    config: Option<&Path>,
    width: Option<f64>,
    height: Option<f64>,
    drill: &[String],
    format: Format,
    blocks: bool,
) -> Result<()> {
    let mut config = match config {
        Some(path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };
    config.canvas = Canvas::new(
        width.unwrap_or(config.canvas.width),
        height.unwrap_or(config.canvas.height),
    );
    config.validate()?;

    let roots = read_input(input)?;
    let mut engine = LayoutEngine::with_color_scheme(roots, config.canvas, config.colors)
        .context("cannot lay out top level")?;

    drill_path(&mut engine, drill)?;

    let cells = engine.current();
    match (format, blocks) {
        (Format::Json, false) => {
            let report: Vec<CellReport<'_>> = cells.iter().map(CellReport::from).collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        (Format::Json, true) => {
            let projected = Projection::new(config.canvas, config.projection).blocks(cells);
            println!("{}", serde_json::to_string_pretty(&projected)?);
        }
        (Format::Text, false) => print_cells(&engine),
        (Format::Text, true) => {
            for block in Projection::new(config.canvas, config.projection).blocks(cells) {
                println!(
                    "{:<24} center=({:>8.2}, {:>8.2}) size={:>7.2} x {:>7.2} height={:>6.2} {}",
                    block.label.replace('\n', " "),
                    block.center.x,
                    block.center.y,
                    block.width,
                    block.depth,
                    block.height,
                    block.color
                );
            }
        }
    }
    Ok(())
}

fn print_cells(engine: &LayoutEngine) {
    let path: Vec<&str> = engine.trail().iter().map(|n| n.label.as_str()).collect();
    match engine.view() {
        View::Root => println!("Level: root"),
        View::Drilled(_) => println!("Level: {}", path.join(" > ")),
    }
    let scheme = engine.colors().scheme();
    println!(
        "Colors: positive {} negative {} floor {}",
        scheme.positive.to_hex(),
        scheme.negative.to_hex(),
        scheme.floor
    );
    println!(
        "{:<20} {:>9} {:>7} {:>7} {:>7} {:>7}  {}",
        "LABEL", "VALUE", "X", "Y", "W", "H", "COLOR"
    );
    for cell in engine.current() {
        let marker = if cell.is_navigable() { "+" } else { " " };
        println!(
            "{:<20} {:>+9.3} {:>7.4} {:>7.4} {:>7.4} {:>7.4}  {}{}",
            cell.node.label,
            cell.node.signed_value(),
            cell.bounds.x,
            cell.bounds.y,
            cell.bounds.width,
            cell.bounds.height,
            cell.color.to_hex(),
            marker
        );
    }
}

fn run_check(input: &Path) -> Result<()> {
    let (groups, items) = check_levels(read_input(input)?)?;
    println!("✓ {} groups, {} items, every level lays out", groups, items);
    Ok(())
}

/// Lay out the root and every group below it. Returns group and item counts.
fn check_levels(roots: Vec<NodeRef>) -> Result<(usize, usize)> {
    if roots.is_empty() {
        bail!("no group has a non-zero value");
    }

    let items: usize = roots.iter().map(|g| g.children.len()).sum();
    let mut engine = LayoutEngine::new(roots, Canvas::default())?;
    for index in 0..engine.current().len() {
        let label = engine.current()[index].node.label.clone();
        engine
            .select_index(index)
            .with_context(|| format!("group '{}' cannot be laid out", label))?;
        engine.return_to_root()?;
    }
    Ok((engine.root_nodes().len(), items))
}
