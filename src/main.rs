//! Node Diagram demo CLI
//!
//! Usage:
//!   node-diagram [OPTIONS]
//!
//! Options:
//!   -a, --axis <AXIS>            Layout axis: horizontal or vertical
//!   -l, --line-type <LINE_TYPE>  Connector style: bezier, four-way or straight
//!   -c, --config <FILE>          Diagram configuration (TOML format)
//!   --print-config               Print the default configuration and exit
//!   -h, --help                   Print help

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use node_diagram::{
    layout_to_svg, Diagram, DiagramConfig, Direction, LineType, NodeId, NodeVariant,
    DEFAULT_CONFIG,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Axis {
    Horizontal,
    Vertical,
}

impl From<Axis> for Direction {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Direction::Horizontal,
            Axis::Vertical => Direction::Vertical,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Line {
    Bezier,
    FourWay,
    Straight,
}

impl From<Line> for LineType {
    fn from(line: Line) -> Self {
        match line {
            Line::Bezier => LineType::Bezier,
            Line::FourWay => LineType::FourWay,
            Line::Straight => LineType::Straight,
        }
    }
}

#[derive(Parser)]
#[command(name = "node-diagram")]
#[command(about = "Lay out a sample flowchart and print it as SVG")]
struct Cli {
    /// Axis the layout runs along
    #[arg(short, long, value_enum, default_value = "horizontal")]
    axis: Axis,

    /// Connector style, overriding the configuration
    #[arg(short, long, value_enum)]
    line_type: Option<Line>,

    /// Diagram configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", DEFAULT_CONFIG.trim());
        return;
    }

    let mut config = match &cli.config {
        Some(path) => match DiagramConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => DiagramConfig::default(),
    };
    if let Some(line) = cli.line_type {
        config = config.with_line_type(line.into());
    }

    let mut diagram = Diagram::with_config(&config);
    let nodes = build_sample(&mut diagram, cli.axis.into());
    info!(nodes, axis = ?cli.axis, line_type = %config.line_type, "built sample flowchart");

    let svg = layout_to_svg(&mut diagram, cli.axis.into(), &config.svg);
    println!("{}", svg);
}

/// A small order-handling flowchart with a retry loop and a container.
/// Returns the number of nodes added.
fn build_sample(diagram: &mut Diagram, direction: Direction) -> usize {
    let start = diagram.add_node(NodeVariant::Start);
    let receive = text(diagram, "Receive order");
    let check = diagram.add_node(NodeVariant::Condition);
    diagram.set_text(check, "In stock?");
    diagram.add_branch(check, "yes");
    diagram.add_branch(check, "no");
    let pack = text(diagram, "Pack");
    let ship = text(diagram, "Ship");
    let restock = text(diagram, "Restock");
    let end = diagram.add_node(NodeVariant::End);

    diagram.add_link(start, 0, receive);
    diagram.add_link(receive, 0, check);
    diagram.add_link(check, 0, pack);
    diagram.add_link(check, 1, restock);
    diagram.add_link(pack, 0, ship);
    diagram.add_link(ship, 0, end);
    diagram.add_link(restock, 0, check);

    let fulfilment = diagram.add_node(NodeVariant::Container);
    diagram.set_text(fulfilment, "Fulfilment");

    let ids: Vec<NodeId> = diagram.node_ids().collect();
    for id in &ids {
        diagram.set_direction(*id, direction);
    }

    // the container is placed by the layout like any node, then fitted
    diagram.add_to_container(fulfilment, pack);
    diagram.add_to_container(fulfilment, ship);
    debug!(container = %fulfilment, "grouped fulfilment steps");

    ids.len()
}

fn text(diagram: &mut Diagram, label: &str) -> NodeId {
    let id = diagram.add_node(NodeVariant::Text);
    diagram.set_text(id, label);
    id
}
