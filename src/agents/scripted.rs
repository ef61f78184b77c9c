//! Replays a fixed list of decisions, for tests and recorded games.

use crate::cards::{Card, Color};
use crate::game::PlayerId;
use rand::RngCore;
use std::collections::VecDeque;

use super::{
    most_common_color, AgentKind, Decision, DecisionProvider, InvalidDecisionPolicy, Observation,
};

/// Answers requests from queues; falls back to drawing (or the default color
/// heuristic) once a queue runs out.
///
/// ```
/// use uno_rs::agents::{Decision, ScriptedAgent};
///
/// let agent = ScriptedAgent::new().then(Decision::play(0)).then(Decision::Draw);
/// assert_eq!(agent.remaining(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedAgent {
    decisions: VecDeque<Decision>,
    colors: VecDeque<Color>,
    play_drawn: bool,
    accept_exchange: bool,
    on_invalid: InvalidDecisionPolicy,
    games_seen: Vec<Option<PlayerId>>,
}

impl ScriptedAgent {
    pub fn new() -> Self {
        Self {
            decisions: VecDeque::new(),
            colors: VecDeque::new(),
            play_drawn: true,
            accept_exchange: true,
            on_invalid: InvalidDecisionPolicy::Draw,
            games_seen: Vec::new(),
        }
    }

    pub fn with_decisions(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self { decisions: decisions.into_iter().collect(), ..Self::new() }
    }

    /// Queue one more decision.
    pub fn then(mut self, decision: Decision) -> Self {
        self.decisions.push_back(decision);
        self
    }

    /// Queue a color answer for the next wild played without a color.
    pub fn then_color(mut self, color: Color) -> Self {
        self.colors.push_back(color);
        self
    }

    pub fn playing_drawn(mut self, play: bool) -> Self {
        self.play_drawn = play;
        self
    }

    pub fn accepting_exchanges(mut self, accept: bool) -> Self {
        self.accept_exchange = accept;
        self
    }

    pub fn on_invalid_policy(mut self, policy: InvalidDecisionPolicy) -> Self {
        self.on_invalid = policy;
        self
    }

    pub fn remaining(&self) -> usize {
        self.decisions.len()
    }

    /// Winners reported through `on_game_end`, oldest first.
    pub fn games_seen(&self) -> &[Option<PlayerId>] {
        &self.games_seen
    }
}

impl Default for ScriptedAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionProvider for ScriptedAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Scripted
    }

    fn decide(&mut self, _obs: &Observation, _rng: &mut dyn RngCore) -> Decision {
        self.decisions.pop_front().unwrap_or(Decision::Draw)
    }

    fn choose_color(&mut self, obs: &Observation, _rng: &mut dyn RngCore) -> Color {
        self.colors.pop_front().unwrap_or_else(|| most_common_color(&obs.hand, obs.default_color))
    }

    fn play_drawn(&mut self, _obs: &Observation, _card: Card, _rng: &mut dyn RngCore) -> bool {
        self.play_drawn
    }

    fn accept_exchange(&mut self, _obs: &Observation, _target: PlayerId, _size: usize) -> bool {
        self.accept_exchange
    }

    fn on_invalid(&self) -> InvalidDecisionPolicy {
        self.on_invalid
    }

    fn on_game_end(&mut self, _me: PlayerId, winner: Option<PlayerId>) {
        self.games_seen.push(winner);
    }
}
