//! Checkers engine command line.
//!
//! ## Usage
//!
//! - `checkers-engine` - Show a demo game
//! - `checkers-engine demo` - Alpha-beta against MCTS, board printed every move
//! - `checkers-engine play --white mcts --black alphabeta --games 10` - Run a series

use std::io;
use std::time::Duration;

use anyhow::{Result, ensure};
use clap::{Args, Parser, Subcommand, ValueEnum};

use checkers_engine::agent::{Agent, AlphaBetaAgent, HumanAgent, MctsAgent, RandomAgent};
use checkers_engine::constants::{
    EXPLORATION_WEIGHT, MAX_MOVES_WITHOUT_CAPTURE, N, N_ROLLOUTS, ROLLOUT_BUDGET_MS,
    ROWS_OF_PIECES, SEARCH_DEPTH,
};
use checkers_engine::game::{Series, play_game};
use checkers_engine::mcts::MctsConfig;
use checkers_engine::{Board, Move, Rules, Side};

/// Checkers engine with alpha-beta and MCTS players
#[derive(Parser)]
#[command(name = "checkers-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level for engine diagnostics
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a series of games between two agents
    Play(PlayArgs),
    /// Play one alpha-beta versus MCTS game, printing the board
    Demo(EngineArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> log::Level {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    Random,
    Alphabeta,
    Mcts,
    Human,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FirstMover {
    White,
    Black,
}

impl From<FirstMover> for Side {
    fn from(first: FirstMover) -> Side {
        match first {
            FirstMover::White => Side::White,
            FirstMover::Black => Side::Black,
        }
    }
}

#[derive(Args)]
struct PlayArgs {
    /// Agent playing White
    #[arg(long, value_enum)]
    white: AgentKind,

    /// Agent playing Black
    #[arg(long, value_enum)]
    black: AgentKind,

    /// Number of games
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// Side making the first move
    #[arg(long, value_enum, default_value_t = FirstMover::White)]
    first: FirstMover,

    /// Print the board after every move
    #[arg(long)]
    print: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args, Clone)]
struct EngineArgs {
    /// Alpha-beta search depth in plies
    #[arg(long, default_value_t = SEARCH_DEPTH)]
    depth: u32,

    /// MCTS rollouts per move
    #[arg(long, default_value_t = N_ROLLOUTS)]
    rollouts: usize,

    /// MCTS exploration weight
    #[arg(long, default_value_t = EXPLORATION_WEIGHT)]
    exploration: f64,

    /// Wall-clock budget of one MCTS playout, in milliseconds
    #[arg(long, default_value_t = ROLLOUT_BUDGET_MS)]
    rollout_budget_ms: u64,

    /// Rows of pieces per side at the start
    #[arg(long, default_value_t = ROWS_OF_PIECES)]
    rows: usize,

    /// Moves without a capture before a draw, 0 to disable
    #[arg(long, default_value_t = MAX_MOVES_WITHOUT_CAPTURE)]
    passive_limit: usize,
}

impl EngineArgs {
    fn rules(&self) -> Result<Rules> {
        ensure!(
            self.rows >= 1 && self.rows * 2 < N,
            "--rows must be between 1 and {} on a {N}x{N} board",
            (N - 1) / 2
        );
        Ok(Rules {
            rows_of_pieces: self.rows,
            passive_limit: self.passive_limit,
        })
    }

    fn mcts_config(&self) -> Result<MctsConfig> {
        ensure!(self.rollouts > 0, "--rollouts must be positive");
        ensure!(
            self.exploration.is_finite() && self.exploration >= 0.0,
            "--exploration must be a non-negative number"
        );
        Ok(MctsConfig {
            rollouts: self.rollouts,
            exploration_weight: self.exploration,
            rollout_budget: Duration::from_millis(self.rollout_budget_ms),
        })
    }

    fn agent(&self, kind: AgentKind, side: Side) -> Result<Box<dyn Agent>> {
        let agent: Box<dyn Agent> = match kind {
            AgentKind::Random => Box::new(RandomAgent::new(side)),
            AgentKind::Alphabeta => Box::new(AlphaBetaAgent::new(side, self.depth)),
            AgentKind::Mcts => Box::new(MctsAgent::new(side, self.rules()?, self.mcts_config()?)),
            AgentKind::Human => {
                let input = io::BufReader::new(io::stdin());
                Box::new(HumanAgent::new(side, input, io::stdout()))
            }
        };
        Ok(agent)
    }
}

impl Default for EngineArgs {
    fn default() -> Self {
        Self {
            depth: SEARCH_DEPTH,
            rollouts: N_ROLLOUTS,
            exploration: EXPLORATION_WEIGHT,
            rollout_budget_ms: ROLLOUT_BUDGET_MS,
            rows: ROWS_OF_PIECES,
            passive_limit: MAX_MOVES_WITHOUT_CAPTURE,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    simple_logger::init_with_level(cli.log_level.into())?;

    match cli.command {
        Some(Commands::Play(args)) => run_series(&args),
        Some(Commands::Demo(engine)) => run_demo(&engine),
        None => run_demo(&EngineArgs::default()),
    }
}

fn print_move(board: &Board, mv: &Move) {
    println!("{mv}\n{board}");
}

fn run_series(args: &PlayArgs) -> Result<()> {
    let rules = args.engine.rules()?;
    let mut white = args.engine.agent(args.white, Side::White)?;
    let mut black = args.engine.agent(args.black, Side::Black)?;
    let show = args.print || args.white == AgentKind::Human || args.black == AgentKind::Human;

    let mut series = Series::default();
    for game in 1..=args.games {
        if show {
            println!("=== Game {game} ===\n{}", Board::with_rules(rules));
        }
        let record = play_game(
            white.as_mut(),
            black.as_mut(),
            args.first.into(),
            rules,
            |board, mv| {
                if show {
                    print_move(board, mv);
                }
            },
        );
        series.record(record.outcome);
        println!("Game {game}: {:?} after {} plies", record.outcome, record.plies());
    }

    println!("{} (white) vs {} (black)", white.name(), black.name());
    println!("{series}");
    Ok(())
}

fn run_demo(engine: &EngineArgs) -> Result<()> {
    println!("Checkers engine: alpha-beta (white) vs MCTS (black)\n");

    let rules = engine.rules()?;
    let mut white = engine.agent(AgentKind::Alphabeta, Side::White)?;
    let mut black = engine.agent(AgentKind::Mcts, Side::Black)?;

    println!("{}", Board::with_rules(rules));
    let record = play_game(white.as_mut(), black.as_mut(), Side::White, rules, print_move);
    println!("Result: {:?} after {} plies", record.outcome, record.plies());
    Ok(())
}
