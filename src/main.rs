//! kartforge CLI
//!
//! Compiles editor scene documents into the game's binary asset formats:
//! levels (.kgl), the car (.kgc) and runtime assets (.kgr).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use kartforge_export::{dump, export_car, export_level, export_runtime_assets, TracingLog};
use kartforge_scene::{Scene, SceneGraph};

/// kartforge - scene-to-binary asset compiler for the Kart Guys runtime
#[derive(Parser)]
#[command(name = "kartforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a level (.kgl), with the graph dump and reload trigger
    Level(ExportArgs),

    /// Export the car (.kgc)
    Car(ExportArgs),

    /// Export runtime assets (.kgr)
    RuntimeAssets(ExportArgs),

    /// Print the flattened scene graph without exporting
    Graph(GraphArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the scene document (JSON)
    scene: PathBuf,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct GraphArgs {
    /// Path to the scene document (JSON)
    scene: PathBuf,
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Level(args) => cmd_level(args),
        Commands::Car(args) => cmd_car(args),
        Commands::RuntimeAssets(args) => cmd_runtime_assets(args),
        Commands::Graph(args) => cmd_graph(args),
    }
}

fn load_scene(path: &Path) -> Result<Scene> {
    info!("Loading scene document: {:?}", path);
    Scene::from_file(path).with_context(|| format!("Failed to load scene document {:?}", path))
}

fn cmd_level(args: ExportArgs) -> Result<()> {
    let scene = load_scene(&args.scene)?;

    export_level(&scene, &args.output, &TracingLog)
        .with_context(|| format!("Level export to {:?} failed", args.output))?;

    println!("Exported {:?}", args.output);
    Ok(())
}

fn cmd_car(args: ExportArgs) -> Result<()> {
    let scene = load_scene(&args.scene)?;

    export_car(&scene, &args.output, &TracingLog)
        .with_context(|| format!("Car export to {:?} failed", args.output))?;

    println!("Exported {:?}", args.output);
    Ok(())
}

fn cmd_runtime_assets(args: ExportArgs) -> Result<()> {
    let scene = load_scene(&args.scene)?;

    export_runtime_assets(&scene, &args.output, &TracingLog)
        .with_context(|| format!("Runtime assets export to {:?} failed", args.output))?;

    println!("Exported {:?}", args.output);
    Ok(())
}

fn cmd_graph(args: GraphArgs) -> Result<()> {
    let scene = load_scene(&args.scene)?;
    let graph = SceneGraph::build(&scene).context("Failed to build the scene graph")?;

    print!("{}", dump::graph_dump(&graph));
    Ok(())
}
