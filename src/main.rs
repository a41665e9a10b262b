use std::{
    fs::File,
    io,
    os::fd::AsRawFd,
    path::PathBuf,
    sync::Mutex,
};

use clap::{Parser, ValueEnum};
use lib_2048::Game;
use lib_brew::BrewGame;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::ArcadeConfig;
use error::ArcadeError;
use render::{RawMode, Screen};
use run::{BrewRunner, PuzzleRunner};

mod config;
mod error;
mod input;
mod render;
mod run;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GameKind {
    /// Slide and merge tiles until one reaches 2048
    #[value(name = "2048")]
    Puzzle,
    /// Match the falling notes with the selected step
    Brew,
}

#[derive(Parser, Debug)]
#[command(version, about = "Canvas arcade games played in the terminal")]
struct Args {
    #[arg(value_enum)]
    game: GameKind,
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,
    /// Write logs to this file; nothing is logged without it
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
    /// Log filter, e.g. "info" or "lib_2048=trace"
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(args: &Args) -> Result<(), ArcadeError> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };

    let file = File::create(path)?;

    tracing_subscriber::registry()
        .with(EnvFilter::new(&args.log_level))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();

    Ok(())
}

fn main() -> Result<(), ArcadeError> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = match &args.config {
        Some(path) => ArcadeConfig::from_toml(path)?,
        None => ArcadeConfig::default(),
    };

    let rng = args
        .seed
        .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);

    let stdin = io::stdin();
    let stdout = io::stdout();

    if unsafe { libc::isatty(stdin.as_raw_fd()) } == 0 {
        return Err(ArcadeError::NotATerminal);
    }

    let terminal = render::terminal_size(&stdout)?;
    info!(game = ?args.game, seed = ?args.seed, ?terminal, "starting");

    let _raw_mode = RawMode::enable(&stdin)?;
    let mut screen = Screen::enter(stdout.lock())?;
    let mut input = stdin.lock();

    match args.game {
        GameKind::Puzzle => {
            let game = Game::new(config.table.clone(), rng);
            let mut runner = PuzzleRunner::new(game, config.display.swipe_threshold);
            run::run(&mut runner, &config.display, terminal, &mut input, &mut screen)?;
        }
        GameKind::Brew => {
            let game = BrewGame::new(config.brew.clone(), rng, 0);
            let mut runner = BrewRunner::new(game);
            run::run(&mut runner, &config.display, terminal, &mut input, &mut screen)?;
        }
    }

    info!("quit");
    Ok(())
}
