use crate::cards::{Card, Color, Kind, Value};
use crate::game::{PenaltyKind, PlayerId};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use super::{most_common_color, AgentKind, Decision, DecisionPhase, DecisionProvider, Observation};

/// Difficulty tiers for bot play style and mistake rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

/// Configuration for a bot's play style.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct BotProfile {
    pub difficulty: Difficulty,
    /// Chance of playing a random legal card instead of the best one.
    pub mistake_rate: f64,
    /// Chance of stacking onto a pending penalty when able.
    pub stack_eagerness: f64,
    /// Chance of playing a drawn card that turned out to be playable.
    pub play_drawn_rate: f64,
    /// Whether to favor skips and penalties when the next player is close to winning.
    pub pressure: bool,
}

impl BotProfile {
    /// Create a profile with tuned defaults for a difficulty tier.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (mistake_rate, stack_eagerness, play_drawn_rate, pressure) = match difficulty {
            Difficulty::Easy => (0.3, 0.6, 0.7, false),
            Difficulty::Medium => (0.1, 0.9, 1.0, false),
            Difficulty::Hard => (0.03, 1.0, 1.0, true),
            Difficulty::Expert => (0.0, 1.0, 1.0, true),
        };
        Self { difficulty, mistake_rate, stack_eagerness, play_drawn_rate, pressure }
    }
}

impl Default for BotProfile {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Medium)
    }
}

#[derive(Debug, Clone, Copy)]
struct BotDecision {
    decision: Decision,
    reason: &'static str,
}

struct BotPolicy;

impl BotPolicy {
    fn decide(obs: &Observation, profile: &BotProfile, rng: &mut dyn RngCore) -> BotDecision {
        let legal = obs.legal_indices();
        if legal.is_empty() {
            let reason = match obs.phase {
                DecisionPhase::Play => "nothing_playable",
                DecisionPhase::Stack => "cannot_stack",
            };
            return BotDecision { decision: Decision::Draw, reason };
        }
        match obs.phase {
            DecisionPhase::Stack => decide_stack(obs, profile, &legal, rng),
            DecisionPhase::Play => decide_play(obs, profile, &legal, rng),
        }
    }
}

fn decide_stack(
    obs: &Observation,
    profile: &BotProfile,
    legal: &[usize],
    rng: &mut dyn RngCore,
) -> BotDecision {
    if rng.random::<f64>() >= profile.stack_eagerness {
        return BotDecision { decision: Decision::Draw, reason: "take_penalty" };
    }
    let penalty = |i: &usize| PenaltyKind::from_value(obs.hand[*i].value());
    let index = if profile.pressure {
        // Push the biggest penalty we hold onto the next player.
        legal.iter().copied().max_by_key(|i| penalty(i))
    } else {
        legal.first().copied()
    };
    match index {
        Some(index) => BotDecision { decision: Decision::play(index), reason: "stack" },
        None => BotDecision { decision: Decision::Draw, reason: "take_penalty" },
    }
}

fn decide_play(
    obs: &Observation,
    profile: &BotProfile,
    legal: &[usize],
    rng: &mut dyn RngCore,
) -> BotDecision {
    if profile.mistake_rate > 0.0 && rng.random::<f64>() < profile.mistake_rate {
        if let Some(&index) = legal.choose(&mut *rng) {
            return BotDecision { decision: Decision::play(index), reason: "random" };
        }
    }
    let colored_playable = legal.iter().filter(|&&i| !obs.hand[i].is_wild()).count();
    let threatened = profile.pressure && obs.next_opponent().is_some_and(|o| o.hand_size <= 2);
    let mut best: Option<(usize, f64)> = None;
    for &i in legal {
        let mut score = score_card(obs.hand[i], obs, colored_playable);
        if threatened && is_blocking(obs.hand[i].value()) {
            score += 4.0;
        }
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((i, score));
        }
    }
    match best {
        Some((index, _)) => BotDecision { decision: Decision::play(index), reason: "best_score" },
        None => BotDecision { decision: Decision::Draw, reason: "nothing_playable" },
    }
}

/// Heuristic value of playing `card` now. Higher is better.
fn score_card(card: Card, obs: &Observation, colored_playable: usize) -> f64 {
    let top_value = obs.top.map(Card::value);
    match card.kind() {
        Kind::Wild => {
            // Keep wilds while a colored card will do.
            let mut score = if colored_playable > 0 { 0.5 } else { 1.0 };
            if card.value() == Value::ColorRoulette {
                score -= 0.5;
            }
            score
        }
        kind => {
            let mut score = 0.0;
            if obs.active_color().is_some() && card.color() == obs.active_color() {
                score += 10.0;
            }
            if Some(card.value()) == top_value {
                score += 5.0;
            }
            score += match (kind, card.value()) {
                (Kind::Action, Value::Skip | Value::SkipAll) => 3.0,
                (Kind::Action, Value::Reverse | Value::DiscardColor) => 2.0,
                (Kind::Action, Value::Draw2 | Value::Draw4) => {
                    if colored_playable > 1 {
                        1.0
                    } else {
                        3.0
                    }
                }
                (Kind::Number, Value::Number(0 | 7)) => {
                    if obs.hand.len() > 5 {
                        5.0
                    } else {
                        2.0
                    }
                }
                _ => 0.0,
            };
            score
        }
    }
}

fn is_blocking(value: Value) -> bool {
    matches!(value, Value::Skip | Value::SkipAll) || PenaltyKind::from_value(value).is_some()
}

/// A heuristic computer player.
#[derive(Debug, Clone)]
pub struct BotAgent {
    profile: BotProfile,
}

impl BotAgent {
    pub fn new(profile: BotProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &BotProfile {
        &self.profile
    }
}

impl Default for BotAgent {
    fn default() -> Self {
        Self::new(BotProfile::default())
    }
}

impl DecisionProvider for BotAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Bot
    }

    fn decide(&mut self, obs: &Observation, rng: &mut dyn RngCore) -> Decision {
        let choice = BotPolicy::decide(obs, &self.profile, rng);
        tracing::trace!(
            player = %obs.player,
            reason = choice.reason,
            decision = ?choice.decision,
            "bot decision"
        );
        choice.decision
    }

    fn choose_color(&mut self, obs: &Observation, rng: &mut dyn RngCore) -> Color {
        if self.profile.mistake_rate > 0.0 && rng.random::<f64>() < self.profile.mistake_rate {
            return Color::ALL[rng.random_range(0..Color::ALL.len())];
        }
        most_common_color(&obs.hand, obs.default_color)
    }

    fn play_drawn(&mut self, _obs: &Observation, _card: Card, rng: &mut dyn RngCore) -> bool {
        self.profile.play_drawn_rate >= 1.0 || rng.random::<f64>() < self.profile.play_drawn_rate
    }

    fn accept_exchange(
        &mut self,
        obs: &Observation,
        _target: PlayerId,
        target_hand: usize,
    ) -> bool {
        target_hand < obs.hand.len()
    }
}
