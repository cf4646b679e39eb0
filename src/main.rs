//! # Smolgame Level Generator
//!
//! Generates a level from a seed or a JSON configuration and prints the coarse room
//! grid, build statistics and optionally the starting viewport.

use clap::Parser;
use log::{info, LevelFilter};
use smolgame::{
    draw_frame, AsciiRenderer, GameState, GenerationConfig, Generator, LevelGenerator,
    SmolResult, TemplateLibrary,
};
use std::path::PathBuf;
use std::str::FromStr;

/// Command line arguments for the level generator.
#[derive(Parser, Debug)]
#[command(name = "smolgame")]
#[command(about = "Procedural room-and-corridor level generator")]
#[command(version)]
struct Args {
    /// Random seed for level generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON generation config; --seed and --rooms override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding room.csv and hallway.csv to use instead of the built-in templates
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Number of rooms in the pool
    #[arg(short, long)]
    rooms: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write the generated level to this file as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Print the screen around the player spawn
    #[arg(long)]
    view: bool,
}

fn main() -> SmolResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);
    info!("Starting smolgame v{}", smolgame::VERSION);

    let config = build_config(&args)?;
    let library = match &args.templates {
        Some(dir) => TemplateLibrary::from_dir(dir)?,
        None => TemplateLibrary::builtin()?,
    };

    info!(
        "Generating level with seed {} and {} rooms",
        config.seed,
        config.room_pool.len()
    );
    let generator = LevelGenerator::new(library);
    let mut rng = smolgame::generation::utils::create_rng(&config);
    let level = generator.generate(&config, &mut rng)?;

    println!("{}", level.grid);
    println!(
        "seed {}: {} rooms, {} corridors, {} tiles, {} fallback templates",
        level.seed,
        level.grid.room_count(),
        level.grid.corridor_count(),
        level.stats.tiles_emitted,
        level.stats.unmapped_templates
    );

    if let Some(path) = &args.json {
        std::fs::write(path, serde_json::to_string_pretty(&level)?)?;
        info!("Wrote level to {}", path.display());
    }

    if args.view {
        let state = GameState::new_with_level(level);
        let mut renderer = AsciiRenderer::new();
        draw_frame(&state, &mut renderer);
        print!("{}", renderer);
    }

    Ok(())
}

/// Initializes env_logger at the requested level, falling back to info.
fn initialize_logging(log_level: &str) {
    let level = LevelFilter::from_str(log_level).unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
}

/// Loads or builds the generation config and applies command line overrides.
fn build_config(args: &Args) -> SmolResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::new(12345),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(rooms) = args.rooms {
        config.room_pool = GenerationConfig::numbered_rooms(rooms);
    }

    config.validate()?;
    Ok(config)
}
