//! A learning-agent seat: a pluggable [`Policy`] plus reward bookkeeping.
//!
//! The shipped [`RandomPolicy`] picks uniformly among legal moves; a trained
//! model plugs in by implementing [`Policy`].

use crate::cards::Color;
use crate::game::PlayerId;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use super::{AgentKind, Decision, DecisionProvider, Observation};

/// Reward for winning a game.
pub const WIN_REWARD: f64 = 100.0;
/// Reward for a turn that ended in a draw instead of a play.
pub const DRAW_PENALTY: f64 = -0.5;

/// Chooses moves and learns from rewards.
pub trait Policy {
    fn act(&mut self, obs: &Observation, rng: &mut dyn RngCore) -> Decision;

    /// Feedback for the previous action. `obs` is the state that followed it, if
    /// the game went on.
    fn update(&mut self, _reward: f64, _obs: Option<&Observation>, _done: bool) {}
}

/// Uniformly random legal moves; wild cards get a random color.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn act(&mut self, obs: &Observation, rng: &mut dyn RngCore) -> Decision {
        let legal = obs.legal_indices();
        let Some(&index) = legal.choose(&mut *rng) else {
            return Decision::Draw;
        };
        if obs.hand[index].is_wild() {
            Decision::play_as(index, Color::ALL[rng.random_range(0..Color::ALL.len())])
        } else {
            Decision::play(index)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LearningAgent<P: Policy = RandomPolicy> {
    policy: P,
    last: Option<Decision>,
    episode_reward: f64,
    total_reward: f64,
    episodes: u32,
    wins: u32,
}

impl<P: Policy> LearningAgent<P> {
    pub fn new(policy: P) -> Self {
        Self { policy, last: None, episode_reward: 0.0, total_reward: 0.0, episodes: 0, wins: 0 }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn episodes(&self) -> u32 {
        self.episodes
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    /// Sum of rewards over every finished game.
    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    /// Reward for the previous action, judged from the state that followed it.
    fn step_reward(last: Decision, obs: &Observation) -> f64 {
        match last {
            Decision::Draw => DRAW_PENALTY,
            Decision::Play { .. } if obs.hand.is_empty() => 1.0,
            Decision::Play { .. } => 1.0 + 1.0 / obs.hand.len() as f64,
        }
    }
}

impl<P: Policy> DecisionProvider for LearningAgent<P> {
    fn kind(&self) -> AgentKind {
        AgentKind::Learner
    }

    fn decide(&mut self, obs: &Observation, rng: &mut dyn RngCore) -> Decision {
        if let Some(last) = self.last.take() {
            let reward = Self::step_reward(last, obs);
            self.episode_reward += reward;
            self.policy.update(reward, Some(obs), false);
        }
        let decision = self.policy.act(obs, rng);
        self.last = Some(decision);
        decision
    }

    fn on_game_end(&mut self, me: PlayerId, winner: Option<PlayerId>) {
        let reward = if winner == Some(me) { WIN_REWARD } else { 0.0 };
        if winner == Some(me) {
            self.wins += 1;
        }
        self.last = None;
        self.episode_reward += reward;
        self.policy.update(reward, None, true);
        self.total_reward += self.episode_reward;
        self.episode_reward = 0.0;
        self.episodes += 1;
        tracing::debug!(player = %me, episodes = self.episodes, wins = self.wins, "episode done");
    }
}
