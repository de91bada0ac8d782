mod config;
mod game;
mod leaderboard;
mod logging;
mod ui;
mod wheel;

use crate::config::{Config, ConfigLoadError, project_dirs};
use crate::game::{Command, Event, Game, Outcome};
use crate::leaderboard::store::{FileStore, KeyValueStore, MemoryStore};
use crate::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::logging::LogTarget;
use crate::ui::{App, UiOptions};
use crate::wheel::spin::{SpinAnimation, SpinPoll};
use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use std::{io, io::Write, thread};
use tracing::info;

/// Spin a wheel of fortune in your terminal and keep score across sessions.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// The path to the configuration file.
    #[clap(short, long, env = "SPINWHEEL_CONFIG")]
    config_file: Option<PathBuf>,

    /// The directory the leaderboard is stored in.
    #[clap(long, env = "SPINWHEEL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Keep the leaderboard in memory only; nothing is read from or written to disk.
    #[clap(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively (the default).
    Play {
        /// Players to put on the wheel right away.
        #[clap(short, long, value_delimiter = ',')]
        players: Vec<String>,

        /// Spin duration in seconds.
        #[clap(short, long)]
        duration: Option<String>,
    },

    /// Spin once over the given players and print who the wheel picked.
    Spin {
        /// The players on the wheel, in slice order.
        #[clap(required = true)]
        players: Vec<String>,

        /// Spin duration in seconds.
        #[clap(short, long)]
        duration: Option<String>,

        /// Seed the random landing offset to get a reproducible spin.
        #[clap(long)]
        seed: Option<u64>,

        /// Show the wheel turning while it spins.
        #[clap(long)]
        animate: bool,

        /// Record the pick on the leaderboard as a win or a loss.
        #[clap(long, value_parser = parse_outcome)]
        award: Option<Outcome>,
    },

    /// Inspect or change the persisted leaderboard.
    Leaderboard {
        #[command(subcommand)]
        action: LeaderboardAction,
    },
}

#[derive(Subcommand)]
enum LeaderboardAction {
    /// Print the leaderboard.
    Show {
        /// How many entries to print.
        #[clap(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Add points to a player; negative points correct a score.
    Add {
        name: String,

        #[clap(allow_hyphen_values = true)]
        points: i64,
    },

    /// Remove every entry.
    Reset,
}

fn parse_outcome(value: &str) -> Result<Outcome, String> {
    match value.to_ascii_lowercase().as_str() {
        "win" | "won" => Ok(Outcome::Win),
        "loss" | "lost" | "lose" => Ok(Outcome::Loss),
        _ => Err(format!("expected 'win' or 'loss', got '{value}'")),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config_file {
        return Config::load(path).with_context(|| format!("failed to load config from {}", path.display()));
    }
    let Some(dirs) = project_dirs() else {
        return Ok(Config::default());
    };
    let path = dirs.config_dir().join("config.yaml");
    match Config::load(&path) {
        Ok(config) => Ok(config),
        Err(ConfigLoadError::NotFound) => Ok(Config::default()),
        Err(e) => Err(e).with_context(|| format!("failed to load config from {}", path.display())),
    }
}

fn data_dir(cli: &Cli, config: &Config) -> anyhow::Result<PathBuf> {
    if let Some(dir) = cli.data_dir.clone().or_else(|| config.leaderboard.directory.clone()) {
        return Ok(dir);
    }
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("could not find a data directory; pass --data-dir"))
}

fn open_store(cli: &Cli, config: &Config) -> anyhow::Result<Box<dyn KeyValueStore>> {
    if cli.ephemeral {
        return Ok(Box::new(MemoryStore::default()));
    }
    let store = FileStore::new(data_dir(cli, config)?);
    info!(directory = %store.root().display(), "using leaderboard store");
    Ok(Box::new(store))
}

fn new_game<S: KeyValueStore>(store: S, config: &Config, seed: Option<u64>) -> Game<S> {
    let rng = seed.map(fastrand::Rng::with_seed).unwrap_or_default();
    Game::new(Leaderboard::new(store), config.spin.settings(), config.spin.default_duration(), rng)
}

fn play(cli: &Cli, config: &Config, players: &[String], duration: Option<&str>) -> anyhow::Result<()> {
    let mut game = new_game(open_store(cli, config)?, config, None);
    if !players.is_empty() {
        game.dispatch(Command::AddPlayers(players.join("\n")))?;
    }
    if let Some(duration) = duration {
        game.dispatch(Command::SetSpinDuration(duration.to_string()))?;
    }
    let options = UiOptions {
        leaderboard_limit: config.leaderboard.display_limit,
        celebration: config.celebration.style,
        celebration_duration: Duration::from_millis(config.celebration.duration_millis),
    };
    App::new(game, options).run()
}

struct SpinRequest<'a> {
    players: &'a [String],
    duration: Option<&'a str>,
    seed: Option<u64>,
    animate: bool,
    award: Option<Outcome>,
}

fn spin_once(cli: &Cli, config: &Config, request: SpinRequest<'_>) -> anyhow::Result<()> {
    if cli.ephemeral && request.award.is_some() {
        bail!("--award records into the saved leaderboard and can't be combined with --ephemeral");
    }
    let mut game = new_game(open_store(cli, config)?, config, request.seed);
    game.dispatch(Command::AddPlayers(request.players.join("\n")))?;
    if let Some(duration) = request.duration {
        game.dispatch(Command::SetSpinDuration(duration.to_string()))?;
    }
    let plan = match game.dispatch(Command::StartSpin)? {
        Event::SpinStarted(plan) => plan,
        Event::Rejected(rejection) => bail!("can't spin: {rejection}"),
        other => bail!("unexpected result: {other:?}"),
    };

    if request.animate {
        let mut stderr = io::stderr();
        let mut animation = SpinAnimation::start(plan, Instant::now());
        let plan = animation.plan();
        info!(
            frames = plan.frames(),
            interval_millis = plan.frame_interval().as_millis() as u64,
            from = plan.start_angle(),
            "animating spin"
        );
        while animation.is_running() {
            match animation.poll(Instant::now()) {
                SpinPoll::Frame(sample) => {
                    game.dispatch(Command::SpinProgress(sample))?;
                    let under_pointer = wheel::compute_winner(sample.angle, game.state().roster.pool())
                        .map(|participant| participant.name.as_str())
                        .unwrap_or_default();
                    write!(stderr, "\r{:>6.1}°  {:<24}", sample.angle, under_pointer)?;
                    stderr.flush()?;
                }
                SpinPoll::Pending | SpinPoll::Done { .. } | SpinPoll::Idle => {}
            }
            if let Some(deadline) = animation.next_deadline() {
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
            }
        }
        writeln!(stderr)?;
    }

    let winner = match game.dispatch(Command::FinishSpin)? {
        Event::SpinFinished { winner: Some(winner) } => winner,
        other => bail!("the wheel didn't pick anyone: {other:?}"),
    };
    println!("{winner}");

    if let Some(outcome) = request.award {
        // a single spin has no earlier pick, so score this one directly
        let mut board = game.into_leaderboard();
        let entries = board.upsert_score(&winner, outcome.delta())?;
        let total = entries.iter().find(|entry| entry.name == winner).map(|entry| entry.total_score).unwrap_or_default();
        eprintln!("{winner} {outcome}, {total} point(s) overall");
    }
    Ok(())
}

fn format_entries(entries: &[LeaderboardEntry], limit: usize) -> String {
    if entries.is_empty() {
        return "No results yet. Play the first game!".into();
    }
    let name_width = entries.iter().take(limit).map(|entry| entry.name.chars().count()).max().unwrap_or(0);
    entries
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, entry)| format!("{:>3}. {:<name_width$}  {:>5}", index + 1, entry.name, entry.total_score))
        .join("\n")
}

fn leaderboard(cli: &Cli, config: &Config, action: &LeaderboardAction) -> anyhow::Result<()> {
    let mut board = Leaderboard::new(open_store(cli, config)?);
    match action {
        LeaderboardAction::Show { limit } => {
            let limit = limit.unwrap_or(config.leaderboard.display_limit);
            println!("{}", format_entries(&board.get_all(), limit));
        }
        LeaderboardAction::Add { name, points } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("player name can't be empty");
            }
            let entries = board.upsert_score(name, *points)?;
            println!("{}", format_entries(&entries, config.leaderboard.display_limit));
        }
        LeaderboardAction::Reset => {
            board.reset()?;
            println!("Leaderboard cleared");
        }
    }
    Ok(())
}

fn log_target(cli: &Cli, config: &Config) -> Option<PathBuf> {
    let interactive = matches!(cli.command, None | Some(Commands::Play { .. }));
    if !interactive {
        return None;
    }
    config.logging.path.clone().or_else(|| {
        let dir = cli.data_dir.clone().or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))?;
        Some(dir.join("spinwheel.log"))
    })
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let log_file = log_target(&cli, &config);
    let target = match &log_file {
        Some(path) => LogTarget::File(path),
        None => LogTarget::Stderr,
    };
    if let Err(e) = logging::init(&config.logging, target) {
        eprintln!("[spinwheel] logging disabled: {e}");
    }

    match &cli.command {
        None => play(&cli, &config, &[], None),
        Some(Commands::Play { players, duration }) => play(&cli, &config, players, duration.as_deref()),
        Some(Commands::Spin { players, duration, seed, animate, award }) => spin_once(
            &cli,
            &config,
            SpinRequest { players, duration: duration.as_deref(), seed: *seed, animate: *animate, award: *award },
        ),
        Some(Commands::Leaderboard { action }) => leaderboard(&cli, &config, action),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
