//! Goban-Replay command line.
//!
//! ## Usage
//!
//! - `goban-replay show game.sgf --path 0,1,12` - Print the position at a path
//! - `goban-replay dump game.sgf` - Re-serialize a record
//! - `goban-replay demo --moves 40 --seed 7` - Generate a random branching game

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use goban_replay::board::Stone;
use goban_replay::config::ReplayConfig;
use goban_replay::coord::Point;
use goban_replay::engine::ReplayEngine;
use goban_replay::path::Path;
use goban_replay::render::TextRenderer;

/// Goban-Replay: replay and inspect branching Go game records
#[derive(Parser)]
#[command(name = "goban-replay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Board size for records without a usable SZ
    #[arg(long, global = true)]
    size: Option<usize>,

    /// Reject any repeated position, not only immediate ko retakes
    #[arg(long, global = true)]
    superko: bool,

    /// Log filter (overrides RUST_LOG), e.g. "debug" or "goban_replay=trace"
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a record and print a position
    Show {
        file: PathBuf,
        /// Move count, comma-separated moves, or branch indices
        #[arg(long)]
        path: Option<String>,
    },
    /// Load a record and print it back out
    Dump { file: PathBuf },
    /// Play a random branching game and print it
    Demo {
        #[arg(long, default_value_t = 30)]
        moves: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref());

    let config = load_config(&cli)?;
    let mut engine = ReplayEngine::new(config);

    match cli.command {
        Commands::Show { file, path } => {
            load_record(&mut engine, &file)?;
            if let Some(path) = path {
                let path: Path = path.parse().context("invalid --path")?;
                engine.go_to(&path);
            }
            show(&engine);
        }
        Commands::Dump { file } => {
            load_record(&mut engine, &file)?;
            println!("{}", engine.to_sgf());
        }
        Commands::Demo { moves, seed } => {
            run_demo(&mut engine, moves, seed);
            println!("{}", engine.to_sgf());
            println!();
            show(&engine);
        }
    }
    Ok(())
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<ReplayConfig> {
    let mut config = match &cli.config {
        Some(path) => ReplayConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ReplayConfig::default(),
    };
    if let Some(size) = cli.size {
        config.default_board_size = size;
    }
    config.superko |= cli.superko;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn load_record(engine: &mut ReplayEngine, file: &std::path::Path) -> Result<()> {
    let text =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    engine
        .load_sgf(&text)
        .with_context(|| format!("failed to load {}", file.display()))?;
    info!(file = %file.display(), "record loaded");
    Ok(())
}

fn show(engine: &ReplayEngine) {
    let board = engine.board();
    let mut renderer = TextRenderer::new(board.size());
    board.render(&mut renderer);

    let desc = engine.game_description();
    if !desc.is_empty() {
        println!("{desc}");
    }
    println!("{}", renderer.frame());
    println!(
        "Move {} | {} to play | captures B:{} W:{}",
        engine.move_number(),
        engine.current_color().name(),
        board.captures().black,
        board.captures().white
    );
    let path: Vec<String> = engine.path().iter().map(usize::to_string).collect();
    println!("Path: {}", path.join(","));

    let p = engine.presentation();
    for color in [Stone::Black, Stone::White] {
        let clock = p.clock(color).to_string();
        if !clock.is_empty() {
            println!("{} clock: {clock}", color.name());
        }
    }
    for a in &p.annotations {
        println!("[{a}]");
    }
    if let Some(comments) = &p.comments {
        println!("{comments}");
    }
    let vars = engine.variations();
    if vars.len() > 1 {
        let moves: Vec<String> = vars
            .iter()
            .map(|v| format!("{}:{}", v.index, v.coord.as_deref().unwrap_or("-")))
            .collect();
        println!("Variations: {}", moves.join(" "));
    }
}

/// Play random legal moves, now and then stepping back a few moves so the
/// game branches.
fn run_demo(engine: &mut ReplayEngine, moves: usize, seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let size = engine.board().size();
    let mut played = 0;
    let mut attempts = 0;
    while played < moves && attempts < moves * 100 {
        attempts += 1;
        if played > 4 && rng.u8(..100) < 10 {
            for _ in 0..rng.usize(1..4) {
                engine.back(true);
            }
            engine.refresh(false);
        }
        let pt = Point::new(rng.usize(..size), rng.usize(..size));
        if engine.user_play_or_var(pt).is_ok() {
            played += 1;
        }
    }
    engine.first();
    engine.last();
    info!(played, attempts, "demo finished");
}
