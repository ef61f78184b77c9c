//! Simulation statistics, fed through [`PlayObserver`] and written as JSON.
//!
//! The aggregator is owned by the caller. Reset it between batches and
//! [`merge`](SimulationStats::merge) batch totals into a running total.

use crate::cards::{Card, Kind, Value};
use crate::engine::{PlayObserver, TurnReport};
use crate::game::{GameEvent, PenaltyKind, PlayerId};
use crate::sim::GameSummary;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// How many one-round games are kept as examples per batch.
pub const MAX_ONE_ROUND_EXAMPLES: usize = 5;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum StatsError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode statistics: {0}")]
    Json(#[from] serde_json::Error),
}

/// A game won before the turn order came around a second time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OneRoundExample {
    pub winner: PlayerId,
    pub turns: u32,
    /// Cards the winner played, in order.
    pub winning_plays: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub total_games: u64,
    pub total_turns: u64,
    pub capped_games: u64,
    pub turn_counts: BTreeMap<u32, u64>,
    pub card_play_counts: BTreeMap<String, u64>,
    pub special_card_counts: BTreeMap<String, u64>,
    pub total_non_numbered: u64,
    pub action_card_count: u64,
    pub wild_card_count: u64,
    /// Cards that entered hands, from any source.
    pub total_draws: u64,
    /// Voluntary draws (no card played, or chose to draw).
    pub draw_events: u64,
    pub total_cards_drawn_in_turns: u64,
    pub max_cards_drawn_in_turn: u64,
    pub total_stacking_events: u64,
    pub total_stacked_penalty: u64,
    pub total_pending_draw_resolved: u64,
    pub total_switches_on_7: u64,
    pub total_cycles_on_0: u64,
    pub declined_exchanges: u64,
    pub total_mercy_eliminations: u64,
    pub max_hand_size_ever: u64,
    pub recycles: u64,
    pub one_round_game_count: u64,
    pub one_round_examples: Vec<OneRoundExample>,
}

fn is_special(value: Value) -> bool {
    matches!(
        value,
        Value::Draw2
            | Value::Draw4
            | Value::Draw6
            | Value::Draw10
            | Value::WildDraw4
            | Value::ReverseDraw4
            | Value::ColorRoulette
    )
}

impl SimulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything, as at the start of a batch.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold one finished (or capped) game into the totals.
    pub fn record_game(&mut self, summary: &GameSummary) {
        self.total_games += 1;
        self.total_turns += u64::from(summary.turns);
        *self.turn_counts.entry(summary.turns).or_default() += 1;
        self.recycles += u64::from(summary.recycles);
        if summary.capped {
            self.capped_games += 1;
        }
        if let Some(winner) = summary.winner {
            if summary.turns as usize <= summary.players {
                self.one_round_game_count += 1;
                self.add_example(OneRoundExample {
                    winner,
                    turns: summary.turns,
                    winning_plays: summary.winning_plays.iter().map(Card::to_string).collect(),
                });
            }
        }
    }

    /// Keep a one-round example unless the batch already has enough.
    pub fn add_example(&mut self, example: OneRoundExample) {
        if self.one_round_examples.len() < MAX_ONE_ROUND_EXAMPLES {
            self.one_round_examples.push(example);
        }
    }

    /// Add `other`'s counts to these. Maxima take the larger value; examples
    /// are appended up to the per-batch cap.
    pub fn merge(&mut self, other: &SimulationStats) {
        self.total_games += other.total_games;
        self.total_turns += other.total_turns;
        self.capped_games += other.capped_games;
        for (turns, n) in &other.turn_counts {
            *self.turn_counts.entry(*turns).or_default() += n;
        }
        for (key, n) in &other.card_play_counts {
            *self.card_play_counts.entry(key.clone()).or_default() += n;
        }
        for (key, n) in &other.special_card_counts {
            *self.special_card_counts.entry(key.clone()).or_default() += n;
        }
        self.total_non_numbered += other.total_non_numbered;
        self.action_card_count += other.action_card_count;
        self.wild_card_count += other.wild_card_count;
        self.total_draws += other.total_draws;
        self.draw_events += other.draw_events;
        self.total_cards_drawn_in_turns += other.total_cards_drawn_in_turns;
        self.max_cards_drawn_in_turn =
            self.max_cards_drawn_in_turn.max(other.max_cards_drawn_in_turn);
        self.total_stacking_events += other.total_stacking_events;
        self.total_stacked_penalty += other.total_stacked_penalty;
        self.total_pending_draw_resolved += other.total_pending_draw_resolved;
        self.total_switches_on_7 += other.total_switches_on_7;
        self.total_cycles_on_0 += other.total_cycles_on_0;
        self.declined_exchanges += other.declined_exchanges;
        self.total_mercy_eliminations += other.total_mercy_eliminations;
        self.max_hand_size_ever = self.max_hand_size_ever.max(other.max_hand_size_ever);
        self.recycles += other.recycles;
        self.one_round_game_count += other.one_round_game_count;
        for example in &other.one_round_examples {
            self.add_example(example.clone());
        }
    }

    pub fn avg_turns(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.total_games as f64
        }
    }

    pub fn report(&self) -> StatsReport<'_> {
        let per_game = |n: u64| {
            if self.total_games == 0 {
                0.0
            } else {
                n as f64 / self.total_games as f64
            }
        };
        let per_turn = |n: u64| {
            if self.total_turns == 0 {
                0.0
            } else {
                n as f64 / self.total_turns as f64
            }
        };
        StatsReport {
            total_games: self.total_games,
            total_turns: self.total_turns,
            avg_turns: self.avg_turns(),
            capped_games: self.capped_games,
            card_play_counts: &self.card_play_counts,
            special_card_counts: &self.special_card_counts,
            stacking_metrics: StackingMetrics {
                total_stacking_events: self.total_stacking_events,
                total_stacked_penalty: self.total_stacked_penalty,
                avg_stacked_penalty: if self.total_stacking_events == 0 {
                    0.0
                } else {
                    self.total_stacked_penalty as f64 / self.total_stacking_events as f64
                },
                total_pending_draw_resolved: self.total_pending_draw_resolved,
            },
            draw_metrics: DrawMetrics {
                total_draws: self.total_draws,
                draw_events: self.draw_events,
                avg_cards_drawn_per_turn: per_turn(self.total_cards_drawn_in_turns),
                max_cards_drawn_in_turn: self.max_cards_drawn_in_turn,
                recycles: self.recycles,
            },
            hand_switching_metrics: HandSwitchingMetrics {
                total_switches_on_7: self.total_switches_on_7,
                total_cycles_on_0: self.total_cycles_on_0,
                declined_exchanges: self.declined_exchanges,
            },
            mercy_metrics: MercyMetrics {
                total_mercy_eliminations: self.total_mercy_eliminations,
                avg_mercy_eliminations_per_game: per_game(self.total_mercy_eliminations),
            },
            additional_metrics: AdditionalMetrics {
                total_non_numbered: self.total_non_numbered,
                action_card_count: self.action_card_count,
                wild_card_count: self.wild_card_count,
                max_hand_size_ever: self.max_hand_size_ever,
                one_round_game_count: self.one_round_game_count,
            },
            turn_counts: &self.turn_counts,
        }
    }

    pub fn to_json(&self) -> Result<String, StatsError> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }

    /// Write `uno_stats_batch_<batch>.json` into `dir`, plus
    /// `one_round_examples_batch_<batch>.json` when the batch had any.
    /// Returns the paths written.
    pub fn write_batch(&self, dir: &Path, batch: usize) -> Result<Vec<PathBuf>, StatsError> {
        fs::create_dir_all(dir)
            .map_err(|source| StatsError::Io { path: dir.to_path_buf(), source })?;
        let mut written = Vec::new();
        let path = dir.join(format!("uno_stats_batch_{batch}.json"));
        write_file(&path, &self.to_json()?)?;
        written.push(path);
        if !self.one_round_examples.is_empty() {
            let path = dir.join(format!("one_round_examples_batch_{batch}.json"));
            write_file(&path, &serde_json::to_string_pretty(&self.one_round_examples)?)?;
            written.push(path);
        }
        tracing::info!(batch, files = written.len(), dir = %dir.display(), "wrote statistics");
        Ok(written)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), StatsError> {
    fs::write(path, contents).map_err(|source| StatsError::Io { path: path.to_path_buf(), source })
}

impl PlayObserver for SimulationStats {
    fn on_card_played(&mut self, _player: PlayerId, card: Card) {
        *self.card_play_counts.entry(card.stats_key()).or_default() += 1;
        if is_special(card.value()) {
            *self.special_card_counts.entry(card.value().label()).or_default() += 1;
        }
        match card.kind() {
            Kind::Number => {}
            Kind::Action => {
                self.total_non_numbered += 1;
                self.action_card_count += 1;
            }
            Kind::Wild => {
                self.total_non_numbered += 1;
                self.wild_card_count += 1;
            }
        }
    }

    fn on_event(&mut self, event: &GameEvent) {
        self.total_draws += event.cards_drawn() as u64;
        match event {
            GameEvent::Drew { .. } => self.draw_events += 1,
            GameEvent::Stacked { card, .. } => {
                self.total_stacking_events += 1;
                let added = PenaltyKind::from_value(card.value()).map_or(0, PenaltyKind::amount);
                self.total_stacked_penalty += u64::from(added);
            }
            GameEvent::PenaltyDrawn { amount, .. } => {
                self.total_pending_draw_resolved += u64::from(*amount);
            }
            GameEvent::HandsExchanged { .. } => self.total_switches_on_7 += 1,
            GameEvent::ExchangeDeclined { .. } => self.declined_exchanges += 1,
            GameEvent::HandsRotated { .. } => self.total_cycles_on_0 += 1,
            GameEvent::Eliminated { .. } => self.total_mercy_eliminations += 1,
            _ => {}
        }
    }

    fn on_turn_end(&mut self, report: &TurnReport) {
        let drawn = report.cards_drawn as u64;
        self.total_cards_drawn_in_turns += drawn;
        self.max_cards_drawn_in_turn = self.max_cards_drawn_in_turn.max(drawn);
        self.max_hand_size_ever = self.max_hand_size_ever.max(report.largest_hand as u64);
    }
}

impl fmt::Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation summary ===")?;
        writeln!(f, "Games played: {}", self.total_games)?;
        writeln!(f, "Average turns per game: {:.2}", self.avg_turns())?;
        if self.capped_games > 0 {
            writeln!(f, "Games stopped at the turn cap: {}", self.capped_games)?;
        }
        writeln!(f, "Non-numbered cards played: {}", self.total_non_numbered)?;
        writeln!(f, "  action: {}, wild: {}", self.action_card_count, self.wild_card_count)?;
        let per_turn = if self.total_turns == 0 {
            0.0
        } else {
            self.total_cards_drawn_in_turns as f64 / self.total_turns as f64
        };
        writeln!(f, "Cards drawn per turn: {per_turn:.2} (max {})", self.max_cards_drawn_in_turn)?;
        writeln!(
            f,
            "Stacking events: {} (penalty stacked {}, resolved {})",
            self.total_stacking_events, self.total_stacked_penalty, self.total_pending_draw_resolved
        )?;
        writeln!(
            f,
            "Hand swaps on 7: {}, rotations on 0: {}",
            self.total_switches_on_7, self.total_cycles_on_0
        )?;
        writeln!(f, "Mercy eliminations: {}", self.total_mercy_eliminations)?;
        writeln!(f, "Largest hand seen: {}", self.max_hand_size_ever)?;
        writeln!(f, "One-round games: {}", self.one_round_game_count)?;
        if !self.special_card_counts.is_empty() {
            writeln!(f, "Special cards:")?;
            for (name, n) in &self.special_card_counts {
                writeln!(f, "  {name}: {n}")?;
            }
        }
        Ok(())
    }
}

/// JSON layout of one batch file.
#[derive(Debug, Serialize)]
pub struct StatsReport<'a> {
    pub total_games: u64,
    pub total_turns: u64,
    pub avg_turns: f64,
    pub capped_games: u64,
    pub card_play_counts: &'a BTreeMap<String, u64>,
    pub special_card_counts: &'a BTreeMap<String, u64>,
    pub stacking_metrics: StackingMetrics,
    pub draw_metrics: DrawMetrics,
    pub hand_switching_metrics: HandSwitchingMetrics,
    pub mercy_metrics: MercyMetrics,
    pub additional_metrics: AdditionalMetrics,
    pub turn_counts: &'a BTreeMap<u32, u64>,
}

#[derive(Debug, Serialize)]
pub struct StackingMetrics {
    pub total_stacking_events: u64,
    pub total_stacked_penalty: u64,
    pub avg_stacked_penalty: f64,
    pub total_pending_draw_resolved: u64,
}

#[derive(Debug, Serialize)]
pub struct DrawMetrics {
    pub total_draws: u64,
    pub draw_events: u64,
    pub avg_cards_drawn_per_turn: f64,
    pub max_cards_drawn_in_turn: u64,
    pub recycles: u64,
}

#[derive(Debug, Serialize)]
pub struct HandSwitchingMetrics {
    pub total_switches_on_7: u64,
    pub total_cycles_on_0: u64,
    pub declined_exchanges: u64,
}

#[derive(Debug, Serialize)]
pub struct MercyMetrics {
    pub total_mercy_eliminations: u64,
    pub avg_mercy_eliminations_per_game: f64,
}

#[derive(Debug, Serialize)]
pub struct AdditionalMetrics {
    pub total_non_numbered: u64,
    pub action_card_count: u64,
    pub wild_card_count: u64,
    pub max_hand_size_ever: u64,
    pub one_round_game_count: u64,
}
