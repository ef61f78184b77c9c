//! The turn engine: one call to [`Game::play_turn`] resolves one player's turn.
//!
//! A turn either answers a pending draw penalty (stack or take the cards) or is
//! a normal play (play a card, or draw one and maybe play it). Card effects,
//! the win check, the mercy rule and the pointer advance follow in that order.

use crate::agents::{AgentTable, Decision, DecisionPhase, DecisionProvider, InvalidDecisionPolicy};
use crate::cards::{is_playable, Card, Color};
use crate::effects::{self, Effect};
use crate::game::{ActionError, Game, GameEvent, PenaltyKind, PendingDraw, PlayerId};
use crate::mercy;

/// How many times an interactive provider may retry an illegal decision.
pub const MAX_DECISION_ATTEMPTS: usize = 8;

/// State of the turn machine before a turn is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitPendingDraw,
    NormalPlay,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Play continues with `next`.
    Continue { next: PlayerId },
    GameOver { winner: PlayerId },
}

/// Summary of a single turn.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TurnReport {
    /// Turn counter value when the turn started.
    pub turn: u32,
    pub player: PlayerId,
    pub phase: TurnPhase,
    /// Cards the actor put on the discard pile (a stack counts).
    pub played: Option<Card>,
    /// Cards drawn by anyone during the turn.
    pub cards_drawn: usize,
    pub eliminated: Option<PlayerId>,
    /// Largest hand at the table after the turn.
    pub largest_hand: usize,
    pub outcome: TurnOutcome,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TurnError {
    #[error("no agent is seated for {0}")]
    NoAgent(PlayerId),
}

/// Receives everything that happens during play. Purely observational.
pub trait PlayObserver {
    /// A card left a hand for the discard pile by being played or stacked.
    fn on_card_played(&mut self, _player: PlayerId, _card: Card) {}

    fn on_event(&mut self, _event: &GameEvent) {}

    fn on_turn_end(&mut self, _report: &TurnReport) {}
}

impl PlayObserver for () {}

impl Game {
    pub fn phase(&self) -> TurnPhase {
        if self.is_over() {
            TurnPhase::GameOver
        } else if self.pending.is_active() {
            TurnPhase::AwaitPendingDraw
        } else {
            TurnPhase::NormalPlay
        }
    }

    /// Play one turn for the current player, asking their seated agent.
    ///
    /// ```
    /// use uno_rs::agents::{AgentTable, BotProfile};
    /// use uno_rs::engine::TurnOutcome;
    /// use uno_rs::game::Game;
    /// use uno_rs::rules::Rules;
    ///
    /// let mut game = Game::new(Rules::no_mercy(), 1).unwrap();
    /// let mut agents = AgentTable::bots(4, &BotProfile::default());
    /// let report = game.play_turn(&mut agents).unwrap();
    /// assert_eq!(game.turn(), 1);
    /// assert!(matches!(report.outcome, TurnOutcome::Continue { .. }));
    /// ```
    pub fn play_turn(&mut self, agents: &mut AgentTable) -> Result<TurnReport, TurnError> {
        self.play_turn_observed(agents, &mut ())
    }

    /// [`Game::play_turn`], reporting the turn's events to `observer`.
    ///
    /// On a finished game nothing changes and the report carries
    /// [`TurnOutcome::GameOver`].
    pub fn play_turn_observed(
        &mut self,
        agents: &mut AgentTable,
        observer: &mut dyn PlayObserver,
    ) -> Result<TurnReport, TurnError> {
        let actor = self.current_player().id();
        let turn = self.turn;
        let phase = self.phase();
        if let Some(winner) = self.winner {
            return Ok(self.report(turn, actor, phase, None, 0, None, winner));
        }

        let agent = agents.agent_mut(actor).ok_or(TurnError::NoAgent(actor))?;
        let start = self.history_len();
        let played = match phase {
            TurnPhase::AwaitPendingDraw => self.resolve_pending(agent),
            _ => self.normal_play(agent),
        };
        let eliminated = self.finish_turn(actor).then_some(actor);

        let events = &self.history()[start..];
        let cards_drawn = events.iter().map(GameEvent::cards_drawn).sum();
        for event in events {
            observer.on_event(event);
            if let GameEvent::Played { player, card } = event {
                observer.on_card_played(*player, *card);
            }
        }
        let next = self.current_player().id();
        let report = self.report(turn, actor, phase, played, cards_drawn, eliminated, next);
        observer.on_turn_end(&report);
        if let Some(winner) = self.winner {
            agents.notify_game_end(Some(winner));
        }
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn report(
        &self,
        turn: u32,
        player: PlayerId,
        phase: TurnPhase,
        played: Option<Card>,
        cards_drawn: usize,
        eliminated: Option<PlayerId>,
        next: PlayerId,
    ) -> TurnReport {
        let outcome = match self.winner {
            Some(winner) => TurnOutcome::GameOver { winner },
            None => TurnOutcome::Continue { next },
        };
        TurnReport {
            turn,
            player,
            phase,
            played,
            cards_drawn,
            eliminated,
            largest_hand: self.largest_hand(),
            outcome,
        }
    }

    /// Ask for a decision until it is legal, the provider gives up, or the retry
    /// budget runs out. Illegal decisions are recorded but never applied.
    fn request_decision(
        &mut self,
        agent: &mut dyn DecisionProvider,
        phase: DecisionPhase,
    ) -> Decision {
        let player = self.current_player().id();
        for attempt in 1..=MAX_DECISION_ATTEMPTS {
            let obs = self.observe(phase);
            let decision = agent.decide(&obs, &mut self.rng);
            let index = match decision {
                Decision::Draw => return decision,
                Decision::Play { index, .. } => index,
            };
            let checked = match phase {
                DecisionPhase::Play => self.validate_play(index),
                DecisionPhase::Stack => self.validate_stack(index),
            };
            let error: ActionError = match checked {
                Ok(_) => return decision,
                Err(error) => error,
            };
            tracing::warn!(%player, attempt, %error, "invalid decision");
            self.record(GameEvent::InvalidDecision { player, error });
            if agent.on_invalid() == InvalidDecisionPolicy::Draw {
                break;
            }
        }
        Decision::Draw
    }

    /// Stack onto the pending penalty or take every card in it.
    fn resolve_pending(&mut self, agent: &mut dyn DecisionProvider) -> Option<Card> {
        let player = self.current_player().id();
        let can_stack = self.rules.stacking
            && self.current_player().hand().iter().any(|c| self.pending.accepts(c.value()));
        let decision = if can_stack {
            self.request_decision(agent, DecisionPhase::Stack)
        } else {
            Decision::Draw
        };

        if let Decision::Play { index, color } = decision {
            let card = self.commit_play(agent, index, color);
            if let Some(kind) = PenaltyKind::from_value(card.value()) {
                self.pending = self.pending.stacked(kind);
                self.record(GameEvent::Stacked { player, card, pending: self.pending });
            }
            return Some(card);
        }

        let amount = self.pending.amount();
        let drawn = self.draw_into(self.current, amount as usize);
        self.pending = PendingDraw::NONE;
        self.record(GameEvent::PenaltyDrawn { player, amount, drawn });
        None
    }

    /// Play a card, or draw one and perhaps play it, then apply card effects.
    fn normal_play(&mut self, agent: &mut dyn DecisionProvider) -> Option<Card> {
        let player = self.current_player().id();
        let card = match self.request_decision(agent, DecisionPhase::Play) {
            Decision::Play { index, color } => self.commit_play(agent, index, color),
            Decision::Draw => self.draw_and_maybe_play(agent, player)?,
        };

        let effect = Effect::of(card.value(), &self.rules);
        if effect.moves_hands() && self.current_player().hand().is_empty() {
            // Going out ends the game before hands move.
            tracing::debug!(%player, ?effect, "skipping hand effect on the winning card");
        } else {
            effects::dispatch(self, effect, card, agent);
        }
        Some(card)
    }

    fn draw_and_maybe_play(
        &mut self,
        agent: &mut dyn DecisionProvider,
        player: PlayerId,
    ) -> Option<Card> {
        let drawn = self.zones.draw_one(&mut self.rng);
        let count = usize::from(drawn.is_some());
        self.record(GameEvent::Drew { player, requested: 1, drawn: count });
        let card = drawn?;
        self.ring[self.current].hand.push(card);
        if !self.top().map_or(true, |top| is_playable(card, top)) {
            return None;
        }
        let obs = self.observe(DecisionPhase::Play);
        if !agent.play_drawn(&obs, card, &mut self.rng) {
            return None;
        }
        let index = self.current_player().hand_len() - 1;
        Some(self.commit_play(agent, index, None))
    }

    /// Move a validated card from the current hand to the discard pile, naming a
    /// color first if it is wild.
    fn commit_play(
        &mut self,
        agent: &mut dyn DecisionProvider,
        index: usize,
        color: Option<Color>,
    ) -> Card {
        let player = self.current_player().id();
        let mut card = self.ring[self.current].hand.remove(index);
        if card.is_wild() {
            let color = match color {
                Some(color) => color,
                None => {
                    let obs = self.observe(DecisionPhase::Play);
                    agent.choose_color(&obs, &mut self.rng)
                }
            };
            card = card.with_color(color);
        }
        self.zones.discard_card(card);
        self.record(GameEvent::Played { player, card });
        card
    }

    /// Win check, mercy rule and pointer advance. Returns whether the actor was
    /// eliminated.
    fn finish_turn(&mut self, actor: PlayerId) -> bool {
        self.turn += 1;
        // Effects may have moved the pointer, so look the actor up by id.
        if self.player(actor).is_some_and(|p| p.hand().is_empty()) {
            self.winner = Some(actor);
            self.record(GameEvent::Won { player: actor });
            return false;
        }
        if mercy::apply(self, actor).is_some() {
            return true;
        }
        self.current = self.offset(self.current, self.direction.step());
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ScriptedAgent;
    use crate::cards::{parse_cards, Value};
    use crate::rules::Rules;

    fn cards(s: &str) -> Vec<Card> {
        parse_cards(s).unwrap()
    }

    fn scripted(seats: Vec<ScriptedAgent>) -> AgentTable {
        let mut table = AgentTable::for_seats(seats.len());
        for (i, agent) in seats.into_iter().enumerate() {
            table.set_agent(PlayerId::new(i + 1), Some(Box::new(agent)));
        }
        table
    }

    #[test]
    fn missing_agent_is_an_error() {
        let mut game = Game::builder(Rules::no_mercy())
            .hands(vec![cards("R1"), cards("R2")])
            .discard(cards("R0"))
            .build()
            .unwrap();
        let mut agents = AgentTable::for_seats(2);
        let err = game.play_turn(&mut agents).unwrap_err();
        assert_eq!(err, TurnError::NoAgent(PlayerId::new(1)));
        assert_eq!(game.turn(), 0);
    }

    #[test]
    fn phase_tracks_pending_and_winner() {
        let mut game = Game::builder(Rules::no_mercy())
            .hands(vec![cards("R1"), cards("R2")])
            .discard(cards("R0"))
            .pending(PendingDraw::start(PenaltyKind::Draw2))
            .build()
            .unwrap();
        assert_eq!(game.phase(), TurnPhase::AwaitPendingDraw);
        game.pending = PendingDraw::NONE;
        assert_eq!(game.phase(), TurnPhase::NormalPlay);
        game.winner = Some(PlayerId::new(2));
        assert_eq!(game.phase(), TurnPhase::GameOver);
    }

    #[test]
    fn invalid_decisions_fall_back_to_drawing() {
        let mut game = Game::builder(Rules::no_mercy())
            .hands(vec![cards("B7 R9"), cards("G1")])
            .deck(cards("Y1 Y2 Y3 Y4 Y5 Y6"))
            .discard(cards("R5"))
            .build()
            .unwrap();
        let mut agents = scripted(vec![
            ScriptedAgent::new().then(Decision::play(0)).playing_drawn(false),
            ScriptedAgent::new(),
        ]);
        let report = game.play_turn(&mut agents).unwrap();
        assert_eq!(report.played, None);
        assert_eq!(report.cards_drawn, 1);
        assert_eq!(game.players()[0].hand_len(), 3);
        let rejected = game.history().iter().any(|e| {
            matches!(e, GameEvent::InvalidDecision { error: ActionError::NotPlayable { .. }, .. })
        });
        assert!(rejected);
    }

    #[test]
    fn retry_policy_asks_again() {
        let mut game = Game::builder(Rules::no_mercy())
            .hands(vec![cards("B7 R9"), cards("G1")])
            .discard(cards("R5"))
            .build()
            .unwrap();
        let agent = ScriptedAgent::new()
            .then(Decision::play(5))
            .then(Decision::play(0))
            .then(Decision::play(1))
            .on_invalid_policy(InvalidDecisionPolicy::Retry);
        let mut agents = scripted(vec![agent, ScriptedAgent::new()]);
        let report = game.play_turn(&mut agents).unwrap();
        assert_eq!(report.played, Some(Card::new(Value::Number(9), Color::Red)));
        let invalid = game
            .history()
            .iter()
            .filter(|e| matches!(e, GameEvent::InvalidDecision { .. }))
            .count();
        assert_eq!(invalid, 2);
    }

    #[test]
    fn retries_are_bounded() {
        let mut game = Game::builder(Rules::no_mercy())
            .hands(vec![cards("B7"), cards("G1")])
            .deck(cards("Y1 Y2 Y3 Y4 Y5 Y6"))
            .discard(cards("R5"))
            .build()
            .unwrap();
        let agent = ScriptedAgent::with_decisions(vec![Decision::play(0); 20])
            .on_invalid_policy(InvalidDecisionPolicy::Retry)
            .playing_drawn(false);
        let mut agents = scripted(vec![agent, ScriptedAgent::new()]);
        game.play_turn(&mut agents).unwrap();
        let invalid = game
            .history()
            .iter()
            .filter(|e| matches!(e, GameEvent::InvalidDecision { .. }))
            .count();
        assert_eq!(invalid, MAX_DECISION_ATTEMPTS);
        assert_eq!(game.players()[0].hand_len(), 2);
    }

    #[test]
    fn finished_game_is_left_alone() {
        let mut game = Game::builder(Rules::no_mercy())
            .hands(vec![cards("R9"), cards("G1")])
            .discard(cards("R5"))
            .build()
            .unwrap();
        let winner = ScriptedAgent::new().then(Decision::play(0));
        let mut agents = scripted(vec![winner, ScriptedAgent::new()]);
        let first = game.play_turn(&mut agents).unwrap();
        assert_eq!(first.outcome, TurnOutcome::GameOver { winner: PlayerId::new(1) });
        let history = game.history_len();
        let again = game.play_turn(&mut agents).unwrap();
        assert_eq!(again.outcome, TurnOutcome::GameOver { winner: PlayerId::new(1) });
        assert_eq!(again.phase, TurnPhase::GameOver);
        assert_eq!(game.history_len(), history);
        assert_eq!(game.turn(), 1);
    }
}
