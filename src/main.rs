//! # tile_mender entry point
//!
//! Loads the tiles of one style, stitches a level out of them and writes the
//! resulting VMF (plus, on request, the nav mesh console script and a JSON
//! report of the run).
//!
//! ## License
//! Licensed under the MIT License.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use tile_mender::config::GeneratorConfig;
use tile_mender::error::{GenError, Result};
use tile_mender::generator::{load_tile_set, LevelGenerator};
use tile_mender::map::navmesh_script;

#[derive(Parser, Debug)]
#[command(name = "tile_mender")]
#[command(about = "Stitch Hammer map tiles into a random level")]
struct Args {
    /// Random seed; the same seed and tiles always give the same level
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output map name (default: map-<seed>)
    #[arg(short, long)]
    name: Option<String>,

    /// Number of pool tiles to place
    #[arg(short, long)]
    tiles: Option<usize>,

    /// Number of newest doors offered to each placement (0 = all)
    #[arg(long)]
    tail: Option<usize>,

    /// Tile style, a subdirectory of the tiles root
    #[arg(long)]
    style: Option<String>,

    #[arg(long)]
    tiles_root: Option<PathBuf>,

    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// JSON file with generator settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the nav mesh generation script here
    #[arg(long)]
    navmesh_script: Option<PathBuf>,

    /// Write a JSON report of the run here
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(tiles) = self.tiles {
            config.tile_count = tiles;
        }
        if let Some(tail) = self.tail {
            config.tail_length = tail;
        }
        if let Some(style) = self.style {
            config.style = style;
        }
        if let Some(root) = self.tiles_root {
            config.tiles_root = root;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        config.output_name = self.name.or(config.output_name);
        config.navmesh_script = self.navmesh_script.or(config.navmesh_script);
        config.report = self.report.or(config.report);
        Ok(config)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| GenError::io(path, e))
}

fn run(config: &GeneratorConfig) -> Result<()> {
    let output = config.output_path();
    info!("+++++ LEVEL GENERATOR +++++");
    info!("Seed: {}", config.seed);
    info!("Tile count: {}", config.tile_count);
    info!("Max tail length: {}", config.tail_length);
    info!("Map style: {}", config.style);
    info!("Outputting to {}", output.display());

    let mut set = load_tile_set(&config.tile_dir())?;
    let mut generator = LevelGenerator::from_config(config);
    let (level, report) = generator.generate(&mut set, config.tile_count)?;

    write_file(&output, &level.document().to_vmf_string())?;
    info!("Wrote {}", output.display());

    if let Some(path) = &config.navmesh_script {
        write_file(path, &navmesh_script(level.document()))?;
        info!("Wrote nav mesh script to {}", path.display());
    }
    if let Some(path) = &config.report {
        write_file(path, &report.to_json()?)?;
        info!("Wrote report to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = Args::parse().into_config().and_then(|config| run(&config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
