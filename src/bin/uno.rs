use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uno_rs::agents::{AgentTable, BotProfile, ConsoleAgent, Difficulty};
use uno_rs::cards::Color;
use uno_rs::engine::PlayObserver;
use uno_rs::game::{Game, GameEvent, PlayerId};
use uno_rs::rules::{Rules, Variant};
use uno_rs::sim::{run_game, Simulation, SimulationConfig, DEFAULT_MAX_TURNS};

/// UNO and UNO No Mercy: batch simulations and console games.
#[derive(Parser)]
#[command(name = "uno-rs", version, about, long_about = None)]
struct Cli {
    /// More logging (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run bot-only games and write per-batch statistics
    Simulate(SimulateArgs),
    /// Play at the console against bots
    Play(PlayArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Classic,
    NoMercy,
}

impl From<VariantArg> for Variant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::Classic => Variant::Classic,
            VariantArg::NoMercy => Variant::NoMercy,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl From<DifficultyArg> for Difficulty {
    fn from(d: DifficultyArg) -> Self {
        match d {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
            DifficultyArg::Expert => Difficulty::Expert,
        }
    }
}

/// Table rules shared by both subcommands.
#[derive(clap::Args)]
struct RuleArgs {
    #[arg(long, value_enum, default_value = "no-mercy")]
    variant: VariantArg,
    /// Turn off the mercy elimination rule.
    #[arg(long)]
    no_mercy_rule: bool,
    /// Turn off stacking of draw penalties.
    #[arg(long)]
    no_stacking: bool,
    /// Play 0 and 7 as plain number cards.
    #[arg(long)]
    no_seven_zero: bool,
    /// Color named for a wild when the hand holds no colored card (R/B/G/Y).
    #[arg(long)]
    default_color: Option<Color>,
}

impl RuleArgs {
    fn rules(&self, players: usize) -> Rules {
        let mut rules = Rules::for_variant(self.variant.into()).with_players(players);
        if self.no_mercy_rule {
            rules = rules.with_mercy_limit(None);
        }
        if self.no_stacking {
            rules = rules.with_stacking(false);
        }
        if self.no_seven_zero {
            rules = rules.with_seven_zero(false);
        }
        if let Some(color) = self.default_color {
            rules = rules.with_default_color(color);
        }
        rules
    }
}

#[derive(clap::Args)]
struct SimulateArgs {
    #[arg(long, default_value_t = 1_000)]
    games: usize,
    #[arg(long, default_value_t = 1_000)]
    batch_size: usize,
    #[arg(long, default_value_t = 6)]
    players: usize,
    #[arg(long, default_value_t = 7)]
    hand_size: usize,
    #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
    max_turns: u32,
    /// Master seed; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    #[command(flatten)]
    table: RuleArgs,
    #[arg(long, value_enum, default_value = "medium")]
    difficulty: DifficultyArg,
    /// Seat played by the learning agent.
    #[arg(long)]
    learner: Option<usize>,
    /// Directory for the batch JSON files; nothing is written when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(clap::Args)]
struct PlayArgs {
    /// Seats taken by humans (1-based). Defaults to seat 1.
    #[arg(long = "human", value_delimiter = ',')]
    humans: Vec<usize>,
    #[arg(long, default_value_t = 4)]
    players: usize,
    #[command(flatten)]
    table: RuleArgs,
    #[arg(long, value_enum, default_value = "medium")]
    difficulty: DifficultyArg,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
    max_turns: u32,
    /// Plain text cards.
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Play(args) => play(args),
    }
}

fn setup_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "uno_rs=debug",
        _ => "uno_rs=trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let rules = args.table.rules(args.players).with_hand_size(args.hand_size);
    let config = SimulationConfig {
        rules,
        games: args.games,
        batch_size: args.batch_size,
        max_turns: args.max_turns,
        seed: args.seed.unwrap_or_else(rand::random),
        profile: BotProfile::for_difficulty(args.difficulty.into()),
        learner: args.learner.map(PlayerId::new),
    };
    tracing::info!(seed = config.seed, games = config.games, "starting simulation");
    let mut sim = Simulation::new(config).context("invalid simulation settings")?;
    let out = args.out;
    let total = sim.run(|batch, stats| {
        if let Some(dir) = &out {
            stats.write_batch(dir, batch)?;
        }
        Ok(())
    })?;
    print!("{total}");
    Ok(())
}

/// Prints every game event as it happens.
struct Narrator;

impl PlayObserver for Narrator {
    fn on_event(&mut self, event: &GameEvent) {
        println!("  {event}");
    }
}

fn play(args: PlayArgs) -> Result<()> {
    let humans = if args.humans.is_empty() { vec![1] } else { args.humans };
    if let Some(&seat) = humans.iter().find(|&&s| s == 0 || s > args.players) {
        bail!("seat {seat} does not exist at a table of {}", args.players);
    }
    let rules = args.table.rules(args.players);
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut game = Game::new(rules, seed).context("invalid game settings")?;

    let color = !args.no_color && io::stdout().is_terminal();
    let profile = BotProfile::for_difficulty(args.difficulty.into());
    let mut agents = AgentTable::bots(args.players, &profile);
    for seat in humans {
        agents.set_agent(PlayerId::new(seat), Some(Box::new(ConsoleAgent::stdio(color))));
    }

    println!("uno-rs {} (seed {seed})", uno_rs::VERSION);
    if let Some(GameEvent::Started { players, start }) = game.history().first() {
        let start = start.map_or_else(|| "none".to_string(), |c| c.to_string());
        println!("{players} players, starting card {start}");
    }
    let summary = run_game(&mut game, &mut agents, args.max_turns, &mut Narrator)?;
    match summary.winner {
        Some(winner) => println!("{winner} wins after {} turns.", summary.turns),
        None => println!("Stopped after {} turns without a winner.", summary.turns),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_flags_reach_the_rules() {
        let cli = Cli::try_parse_from([
            "uno-rs",
            "simulate",
            "--players",
            "3",
            "--no-stacking",
            "--no-seven-zero",
            "--default-color",
            "blue",
        ])
        .unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        let rules = args.table.rules(args.players);
        assert_eq!(rules.players, 3);
        assert!(!rules.stacking && !rules.seven_zero);
        assert_eq!(rules.default_color, Color::Blue);
        assert!(rules.mercy_limit.is_some());
    }

    #[test]
    fn play_defaults_to_no_mercy_rules() {
        let cli = Cli::try_parse_from(["uno-rs", "play", "--no-mercy-rule"]).unwrap();
        let Command::Play(args) = cli.command else {
            panic!("expected play");
        };
        let rules = args.table.rules(args.players);
        assert!(rules.stacking && rules.seven_zero);
        assert_eq!(rules.mercy_limit, None);
        assert_eq!(rules.default_color, Color::Red);
    }
}
