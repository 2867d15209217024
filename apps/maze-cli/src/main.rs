use anyhow::Context;
use clap::{Parser, Subcommand};
use maze_common::{Axis, GridMap, MazeConfig, StrategyPreference};
use maze_input::Action;
use maze_render::{InstanceOffsets, ProgramSource, RecordingGpu, Scene};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// The recording backend never compiles shaders; it only needs non-empty stages.
const HEADLESS_VERTEX: &str = "headless vertex stage";
const HEADLESS_FRAGMENT: &str = "headless fragment stage";

#[derive(Parser)]
#[command(name = "maze-cli", about = "Headless maze tool")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the maze grid and the block offsets derived from it
    Grid {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Render frames against a recording backend and report GPU traffic
    Simulate {
        /// Number of frames to render
        #[arg(short, long, default_value = "5")]
        frames: u32,
        /// Block drawing strategy: auto, instanced or per-instance
        #[arg(short, long)]
        strategy: Option<StrategyPreference>,
        /// Pretend the device cannot instance
        #[arg(long)]
        no_instancing: bool,
        /// Rotate the maze every N frames (0 = never)
        #[arg(long, default_value = "0")]
        rotate_every: u32,
    },
}

#[derive(Debug, Serialize)]
struct GridReport {
    width: usize,
    height: usize,
    walls: usize,
    cell_width: f32,
    rows: Vec<String>,
    offsets: Vec<[f32; 4]>,
}

impl GridReport {
    fn new(grid: &GridMap, cell_width: f32) -> anyhow::Result<Self> {
        let offsets = InstanceOffsets::build(grid, cell_width)?;
        Ok(Self {
            width: grid.width(),
            height: grid.height(),
            walls: grid.occupied_count(),
            cell_width,
            rows: grid.rows(),
            offsets: offsets.as_slice().iter().map(|o| o.to_array()).collect(),
        })
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<MazeConfig> {
    match path {
        Some(path) => {
            MazeConfig::load(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(MazeConfig::default()),
    }
}

fn simulate(
    mut config: MazeConfig,
    frames: u32,
    strategy: Option<StrategyPreference>,
    no_instancing: bool,
    rotate_every: u32,
) -> anyhow::Result<()> {
    if let Some(strategy) = strategy {
        config.strategy = strategy;
    }
    let gpu = RecordingGpu::new().with_instancing(!no_instancing);
    let source = ProgramSource::new(HEADLESS_VERTEX, HEADLESS_FRAGMENT);
    let mut scene = Scene::new(gpu, &config, 4.0 / 3.0, source)?;

    println!(
        "Simulating {frames} frames: {} walls, strategy {}",
        scene.blocks().instance_count(),
        scene.blocks().strategy()
    );

    let spin = Action::RotateModel {
        axis: Axis::Y,
        sign: 1.0,
    };
    for frame in 0..frames {
        if rotate_every > 0 && frame > 0 && frame % rotate_every == 0 {
            spin.apply(scene.transforms_mut(), &config.steps);
        }
        scene.gpu_mut().clear_commands();
        let stats = scene.frame()?;
        let gpu = scene.gpu();
        println!(
            "frame {frame}: mvp_uploaded={} instances={} draw_calls={} gpu_errors={}",
            stats.mvp_uploaded,
            stats.instances_drawn,
            gpu.draw_calls().count(),
            gpu.pending_errors()
        );
    }

    println!("Total MVP uploads: {}", scene.program().mvp_uploads());
    scene.teardown();
    let gpu = scene.gpu();
    println!(
        "After teardown: programs={} buffers={} vertex_arrays={}",
        gpu.live_programs(),
        gpu.live_buffers(),
        gpu.live_vertex_arrays()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_ref())?;
    tracing::debug!("config: {config:?}");

    match cli.command {
        Commands::Info => {
            println!("maze-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", maze_common::crate_info());
            println!("render: {}", maze_render::crate_info());
            println!("input: {}", maze_input::crate_info());
            println!(
                "config: cell_width={} strategy={} eye={}",
                config.cell_width, config.strategy, config.camera.eye
            );
        }
        Commands::Grid { json } => {
            let grid = config.grid_map()?;
            let report = GridReport::new(&grid, config.cell_width)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{}x{} grid, {} walls, cell width {}",
                    report.width, report.height, report.walls, report.cell_width
                );
                print!("{grid}");
                for (i, [x, y, z, w]) in report.offsets.iter().enumerate() {
                    println!("{i:>3}: ({x:>6.2}, {y:>6.2}, {z:>6.2}, {w})");
                }
            }
        }
        Commands::Simulate {
            frames,
            strategy,
            no_instancing,
            rotate_every,
        } => simulate(config, frames, strategy, no_instancing, rotate_every)?,
    }

    Ok(())
}
