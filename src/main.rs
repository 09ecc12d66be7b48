//! Tengen: a parallel MCTS Go engine.
//!
//! ## Usage
//!
//! - `tengen` - Show a demo
//! - `tengen gtp` - Start GTP server for GUI integration
//! - `tengen demo` - Search one position and print the root statistics
//! - `tengen bench` - Measure raw playout speed on an empty board

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use tengen::budget::Budget;
use tengen::config::SearchConfig;
use tengen::constants::{DEFAULT_BOARD_SIZE, N_SIMS};
use tengen::go::{self, GoBoard, HeuristicPolicy, measure_playouts};
use tengen::gtp::GtpEngine;

/// Tengen: a parallel MCTS Go engine
#[derive(Parser)]
#[command(name = "tengen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    search: SearchArgs,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// TOML file with search settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of worker threads (overrides the config file)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Playouts per move
    #[arg(long, global = true, conflicts_with = "millis")]
    playouts: Option<u64>,

    /// Thinking time per move, in milliseconds
    #[arg(long, global = true)]
    millis: Option<u64>,

    /// Board size
    #[arg(long, global = true, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,

    /// Seed for the workers' random number generators
    #[arg(long, global = true)]
    seed: Option<u64>,
}

impl SearchArgs {
    fn config(&self) -> Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::from_file(path)?,
            None => SearchConfig::default(),
        };
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config.validate()?;
        Ok(config)
    }

    fn budget(&self) -> Budget {
        match (self.playouts, self.millis) {
            (_, Some(ms)) => Budget::Time(Duration::from_millis(ms)),
            (Some(n), None) => Budget::Playouts(n),
            (None, None) => Budget::Playouts(N_SIMS),
        }
    }

    fn board(&self) -> Result<GoBoard> {
        GoBoard::try_new(self.size).with_context(|| format!("unsupported board size {}", self.size))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Run a simple demo of the engine
    Demo,
    /// Measure playouts per second on an empty board, without a tree
    Bench {
        /// Number of playouts to time
        #[arg(long, default_value_t = 10_000)]
        games: u64,
    },
}

fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    // Logs go to stderr; stdout belongs to the GTP protocol
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .write_style(env_logger::WriteStyle::Never)
    .target(env_logger::Target::Stderr)
    .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = cli.search.config().context("invalid search configuration")?;
    let budget = cli.search.budget();
    let board = cli.search.board()?;

    match cli.command {
        Some(Commands::Gtp) => {
            let mut engine = GtpEngine::with_board(config, budget, board)?;
            engine.run().context("GTP session failed")?;
        }
        Some(Commands::Bench { games }) => run_bench(&board, games, config.seed)?,
        Some(Commands::Demo) | None => run_demo(config, budget, board)?,
    }
    Ok(())
}

fn run_demo(config: SearchConfig, budget: Budget, board: GoBoard) -> Result<()> {
    println!("Tengen: parallel MCTS Go engine\n");
    println!(
        "Searching the empty {0}x{0} board with {1} threads ({2:?})...",
        board.size(),
        config.threads,
        budget
    );

    let mut player = go::new_player(config, board)?;
    let best = player.search(budget)?;
    let board = player.board();

    let mut stats = player.root_statistics();
    stats.sort_by(|a, b| b.runs.cmp(&a.runs));
    println!("{:>6} {:>7} {:>7} {:>9}", "move", "runs", "winrate", "rave");
    for s in stats.iter().take(5) {
        println!(
            "{:>6} {:>7} {:>6.1}% {:>8.1}%",
            board.str_coord(s.mv),
            s.runs,
            s.win_rate * 100.0,
            s.rave_win_rate * 100.0
        );
    }

    let pv: Vec<String> = player
        .principal_variation(8)
        .into_iter()
        .map(|mv| board.str_coord(mv))
        .collect();
    println!("\nBest move: {}", board.str_coord(best));
    println!("Principal variation: {}", pv.join(" "));
    println!("Playouts: {}", player.playouts_completed());

    player.commit_move(best)?;
    println!("\n{}", player.board());
    Ok(())
}

fn run_bench(board: &GoBoard, games: u64, seed: Option<u64>) -> Result<()> {
    let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let speed = measure_playouts(board, &mut HeuristicPolicy::new(), games, &mut rng)
        .context("playout policy produced an illegal move")?;
    println!(
        "{0}x{0}: {1} playouts in {2:.3}s",
        board.size(),
        speed.playouts,
        speed.elapsed.as_secs_f64()
    );
    println!("{:.2} kpps", speed.per_second() / 1000.0);
    println!("Black wins: {}", speed.black_wins);
    println!("White wins: {}", speed.white_wins);
    println!("No result: {}", speed.no_results);
    Ok(())
}
