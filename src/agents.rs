//! Agents: pluggable players (bots, console humans, learners, scripts).
//!
//! The engine only talks to the [`DecisionProvider`] trait. It hands every
//! provider an owned [`Observation`] of the table plus the game's random source,
//! so a seed fixes every decision as well as every shuffle. [`AgentTable`] maps
//! player ids to the providers that act for them.

use crate::cards::{is_playable, Card, Color};
use crate::game::{Direction, PendingDraw, PlayerId};
use core::fmt;
use rand::RngCore;

/// Kinds of agents attached to seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AgentKind {
    Human,
    Bot,
    Learner,
    Scripted,
}

/// What an agent wants to do with its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Draw a card in normal play; decline to stack when a penalty is pending.
    Draw,
    /// Play the hand card at `index`. `color` names the color of a wild card;
    /// when absent the engine asks [`DecisionProvider::choose_color`].
    Play { index: usize, color: Option<Color> },
}

impl Decision {
    pub const fn play(index: usize) -> Self {
        Decision::Play { index, color: None }
    }

    pub const fn play_as(index: usize, color: Color) -> Self {
        Decision::Play { index, color: Some(color) }
    }
}

/// Which question a decision answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionPhase {
    /// Normal play: any playable card, or draw.
    Play,
    /// A penalty is pending: stack an escalating draw card, or take the cards.
    Stack,
}

/// How the engine treats a provider's illegal decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidDecisionPolicy {
    /// Ask again, up to a bounded number of attempts.
    Retry,
    /// Treat the decision as a draw (or a declined stack).
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpponentView {
    pub id: PlayerId,
    pub hand_size: usize,
}

/// Everything the acting player is allowed to see.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Observation {
    pub player: PlayerId,
    pub phase: DecisionPhase,
    pub hand: Vec<Card>,
    pub top: Option<Card>,
    pub pending: PendingDraw,
    /// Other alive players, starting with the next to act.
    pub opponents: Vec<OpponentView>,
    pub direction: Direction,
    pub turn: u32,
    pub deck_len: usize,
    /// Fallback color for a wild when no colored card remains in hand.
    pub default_color: Color,
}

impl Observation {
    /// Color the next card must match, if the top card has one.
    pub fn active_color(&self) -> Option<Color> {
        self.top.and_then(Card::color)
    }

    /// Whether the card at `index` answers this observation's question.
    pub fn is_legal(&self, index: usize) -> bool {
        let Some(&card) = self.hand.get(index) else {
            return false;
        };
        match self.phase {
            DecisionPhase::Play => self.top.map_or(true, |top| is_playable(card, top)),
            DecisionPhase::Stack => self.pending.accepts(card.value()),
        }
    }

    pub fn legal_indices(&self) -> Vec<usize> {
        (0..self.hand.len()).filter(|&i| self.is_legal(i)).collect()
    }

    pub fn next_opponent(&self) -> Option<OpponentView> {
        self.opponents.first().copied()
    }
}

/// Most frequent color among the colored cards of `hand`, ties in [`Color::ALL`]
/// order; `default` when the hand holds only wild cards.
///
/// ```
/// use uno_rs::agents::most_common_color;
/// use uno_rs::cards::{parse_cards, Color};
///
/// let hand = parse_cards("B1 G2 B3 Draw6").unwrap();
/// assert_eq!(most_common_color(&hand, Color::Red), Color::Blue);
/// assert_eq!(most_common_color(&parse_cards("Draw6").unwrap(), Color::Red), Color::Red);
/// ```
pub fn most_common_color(hand: &[Card], default: Color) -> Color {
    let mut counts = [0usize; 4];
    for color in hand.iter().filter(|c| !c.is_wild()).filter_map(|c| c.color()) {
        counts[color.index()] += 1;
    }
    let mut best = None;
    for color in Color::ALL {
        let n = counts[color.index()];
        if n > 0 && best.map_or(true, |(_, b)| n > b) {
            best = Some((color, n));
        }
    }
    best.map_or(default, |(color, _)| color)
}

/// A controller that chooses moves for one player.
///
/// Only [`decide`](DecisionProvider::decide) is required; every other request
/// has a sensible default.
pub trait DecisionProvider {
    /// The kind of this agent (human, bot, etc.).
    fn kind(&self) -> AgentKind {
        AgentKind::Bot
    }

    /// Choose a card to play, or to draw (decline when stacking).
    fn decide(&mut self, obs: &Observation, rng: &mut dyn RngCore) -> Decision;

    /// Name the color of a wild card about to be committed.
    fn choose_color(&mut self, obs: &Observation, _rng: &mut dyn RngCore) -> Color {
        most_common_color(&obs.hand, obs.default_color)
    }

    /// Whether to play a just-drawn card that turned out to be playable.
    fn play_drawn(&mut self, _obs: &Observation, _card: Card, _rng: &mut dyn RngCore) -> bool {
        true
    }

    /// Whether to swap hands with `target`, who holds `target_hand` cards.
    fn accept_exchange(
        &mut self,
        _obs: &Observation,
        _target: PlayerId,
        _target_hand: usize,
    ) -> bool {
        true
    }

    fn on_invalid(&self) -> InvalidDecisionPolicy {
        match self.kind() {
            AgentKind::Human => InvalidDecisionPolicy::Retry,
            _ => InvalidDecisionPolicy::Draw,
        }
    }

    /// Called once per finished game; `winner` is `None` when the game hit the turn cap.
    fn on_game_end(&mut self, _me: PlayerId, _winner: Option<PlayerId>) {}
}

pub mod bots;
pub mod console;
pub mod learner;
pub mod scripted;

pub use bots::{BotAgent, BotProfile, Difficulty};
pub use console::ConsoleAgent;
pub use learner::{LearningAgent, Policy, RandomPolicy};
pub use scripted::ScriptedAgent;

/// Holds one optional agent per player id.
pub struct AgentTable {
    seats: Vec<Option<Box<dyn DecisionProvider>>>,
}

impl fmt::Debug for AgentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: String = self
            .seats
            .iter()
            .map(|a| match a.as_deref().map(|ag| ag.kind()) {
                Some(AgentKind::Human) => 'H',
                Some(AgentKind::Bot) => 'B',
                Some(AgentKind::Learner) => 'L',
                Some(AgentKind::Scripted) => 'S',
                None => '-',
            })
            .collect();
        write!(f, "AgentTable({flags})")
    }
}

impl AgentTable {
    /// Create a table with `n` seats, all empty.
    pub fn for_seats(n: usize) -> Self {
        let mut seats = Vec::with_capacity(n);
        seats.resize_with(n, || None);
        Self { seats }
    }

    /// A full table of heuristic bots sharing one profile.
    pub fn bots(n: usize, profile: &BotProfile) -> Self {
        let mut table = Self::for_seats(n);
        for id in 1..=n {
            table.set_agent(PlayerId::new(id), Some(Box::new(BotAgent::new(profile.clone()))));
        }
        table
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Assign an agent to a player (or remove when `None`).
    pub fn set_agent(&mut self, id: PlayerId, agent: Option<Box<dyn DecisionProvider>>) {
        let Some(slot) = id.get().checked_sub(1) else {
            return;
        };
        if slot >= self.seats.len() {
            self.seats.resize_with(slot + 1, || None);
        }
        self.seats[slot] = agent;
    }

    /// Get immutable access to an agent for inspection.
    pub fn agent(&self, id: PlayerId) -> Option<&dyn DecisionProvider> {
        let slot = id.get().checked_sub(1)?;
        self.seats.get(slot).and_then(|a| a.as_deref())
    }

    pub fn agent_mut(&mut self, id: PlayerId) -> Option<&mut (dyn DecisionProvider + 'static)> {
        let slot = id.get().checked_sub(1)?;
        self.seats.get_mut(slot).and_then(|a| a.as_deref_mut())
    }

    /// Return the kind of agent for a player, if any.
    pub fn agent_kind(&self, id: PlayerId) -> Option<AgentKind> {
        self.agent(id).map(|ag| ag.kind())
    }

    pub fn has_agent(&self, id: PlayerId) -> bool {
        self.agent(id).is_some()
    }

    /// Whether any human agents are assigned.
    pub fn any_humans(&self) -> bool {
        self.seats
            .iter()
            .filter_map(|a| a.as_deref())
            .any(|ag| matches!(ag.kind(), AgentKind::Human))
    }

    /// Tell every seated agent the game is over.
    pub fn notify_game_end(&mut self, winner: Option<PlayerId>) {
        for (slot, agent) in self.seats.iter_mut().enumerate() {
            if let Some(agent) = agent {
                agent.on_game_end(PlayerId::new(slot + 1), winner);
            }
        }
    }

    /// Remove all agents.
    pub fn clear(&mut self) {
        for a in &mut self.seats {
            *a = None;
        }
    }
}
