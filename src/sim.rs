//! Batch simulation: run seeded games to termination and collect statistics.

use crate::agents::{AgentTable, BotProfile, LearningAgent, RandomPolicy};
use crate::cards::Card;
use crate::engine::{PlayObserver, TurnError};
use crate::game::{Game, GameEvent, PlayerId};
use crate::rules::{Rules, RulesError};
use crate::stats::{SimulationStats, StatsError};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Default safety cap on turns per game.
pub const DEFAULT_MAX_TURNS: u32 = 10_000;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SimError {
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
    #[error("the turn cap must be at least 1")]
    ZeroTurnCap,
    #[error("learner seat {seat} is not one of the {players} seats")]
    LearnerSeat { seat: PlayerId, players: usize },
}

/// How a single game ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub winner: Option<PlayerId>,
    pub turns: u32,
    /// Stopped by the turn cap without a winner.
    pub capped: bool,
    /// Players seated at the start.
    pub players: usize,
    pub eliminated: Vec<PlayerId>,
    pub recycles: u32,
    /// Cards the winner played, in order. Empty without a winner.
    pub winning_plays: Vec<Card>,
}

/// Play `game` until someone wins or `max_turns` turns have been played.
///
/// Agents hear about the end of the game either way; a capped game ends with
/// no winner.
///
/// ```
/// use uno_rs::agents::{AgentTable, BotProfile};
/// use uno_rs::game::Game;
/// use uno_rs::rules::Rules;
/// use uno_rs::sim::run_game;
///
/// let mut game = Game::new(Rules::no_mercy().with_players(4), 11).unwrap();
/// let mut agents = AgentTable::bots(4, &BotProfile::default());
/// let summary = run_game(&mut game, &mut agents, 5_000, &mut ()).unwrap();
/// assert_eq!(summary.turns, game.turn());
/// assert_eq!(summary.capped, summary.winner.is_none());
/// ```
pub fn run_game(
    game: &mut Game,
    agents: &mut AgentTable,
    max_turns: u32,
    observer: &mut dyn PlayObserver,
) -> Result<GameSummary, TurnError> {
    let players = game.players().len() + game.eliminated().len();
    while !game.is_over() && game.turn() < max_turns {
        game.play_turn_observed(agents, observer)?;
    }
    let capped = !game.is_over();
    if capped {
        tracing::debug!(turns = game.turn(), "game stopped at the turn cap");
        agents.notify_game_end(None);
    }
    let winner = game.winner();
    let winning_plays = match winner {
        Some(w) => game
            .history()
            .iter()
            .filter_map(|e| match e {
                GameEvent::Played { player, card } if *player == w => Some(*card),
                _ => None,
            })
            .collect(),
        None => Vec::new(),
    };
    Ok(GameSummary {
        winner,
        turns: game.turn(),
        capped,
        players,
        eliminated: game.eliminated().to_vec(),
        recycles: game.recycles(),
        winning_plays,
    })
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub rules: Rules,
    pub games: usize,
    pub batch_size: usize,
    pub max_turns: u32,
    /// Master seed; every game gets its own seed derived from it.
    pub seed: u64,
    pub profile: BotProfile,
    /// Seat played by a [`LearningAgent`] instead of a bot.
    pub learner: Option<PlayerId>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rules: Rules::no_mercy(),
            games: 1_000,
            batch_size: 1_000,
            max_turns: DEFAULT_MAX_TURNS,
            seed: 0,
            profile: BotProfile::default(),
            learner: None,
        }
    }
}

/// Runs [`SimulationConfig::games`] games in batches, with statistics reset
/// per batch and merged into a running total.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    agents: AgentTable,
    master: ChaCha8Rng,
    games_played: usize,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.rules.validate()?;
        if config.batch_size == 0 {
            return Err(SimError::ZeroBatchSize);
        }
        if config.max_turns == 0 {
            return Err(SimError::ZeroTurnCap);
        }
        let players = config.rules.players;
        let mut agents = AgentTable::bots(players, &config.profile);
        if let Some(seat) = config.learner {
            if seat.get() == 0 || seat.get() > players {
                return Err(SimError::LearnerSeat { seat, players });
            }
            agents.set_agent(seat, Some(Box::new(LearningAgent::new(RandomPolicy))));
        }
        let master = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self { config, agents, master, games_played: 0 })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn agents(&self) -> &AgentTable {
        &self.agents
    }

    pub fn games_played(&self) -> usize {
        self.games_played
    }

    /// Play one game with the next derived seed, feeding `stats`.
    pub fn play_one(&mut self, stats: &mut SimulationStats) -> Result<GameSummary, SimError> {
        let seed = self.master.next_u64();
        let mut game = Game::new(self.config.rules.clone(), seed)?;
        let summary = run_game(&mut game, &mut self.agents, self.config.max_turns, stats)?;
        stats.record_game(&summary);
        self.games_played += 1;
        tracing::debug!(
            game = self.games_played,
            seed,
            turns = summary.turns,
            winner = ?summary.winner,
            "game finished"
        );
        Ok(summary)
    }

    /// Play every configured game. `on_batch` sees each batch's statistics
    /// (1-based batch number) before they are merged into the returned total.
    pub fn run<F>(&mut self, mut on_batch: F) -> Result<SimulationStats, SimError>
    where
        F: FnMut(usize, &SimulationStats) -> Result<(), SimError>,
    {
        let mut total = SimulationStats::new();
        let mut batch_stats = SimulationStats::new();
        let mut remaining = self.config.games;
        let mut batch = 0;
        while remaining > 0 {
            batch += 1;
            let size = remaining.min(self.config.batch_size);
            batch_stats.reset();
            for _ in 0..size {
                self.play_one(&mut batch_stats)?;
            }
            remaining -= size;
            tracing::info!(
                batch,
                games = size,
                avg_turns = batch_stats.avg_turns(),
                "batch finished"
            );
            on_batch(batch, &batch_stats)?;
            total.merge(&batch_stats);
        }
        Ok(total)
    }
}
