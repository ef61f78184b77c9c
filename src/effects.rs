//! What a played card does to the table once it sits on the discard pile.

use crate::agents::{DecisionPhase, DecisionProvider};
use crate::cards::{Card, Value};
use crate::game::{Direction, Game, GameEvent, PenaltyKind, PendingDraw};
use crate::rules::Rules;

/// Cards drawn by the target of a ReverseDraw4.
pub const REVERSE_DRAW_PENALTY: usize = 4;

/// The rule effect of a card value under a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Effect {
    None,
    Skip,
    SkipAll,
    Reverse,
    Penalty(PenaltyKind),
    DiscardColor,
    ReverseDraw4,
    ColorRoulette,
    RotateHands,
    OfferExchange,
}

impl Effect {
    /// ```
    /// use uno_rs::cards::Value;
    /// use uno_rs::effects::Effect;
    /// use uno_rs::game::PenaltyKind;
    /// use uno_rs::rules::Rules;
    ///
    /// let rules = Rules::no_mercy();
    /// assert_eq!(Effect::of(Value::Number(0), &rules), Effect::RotateHands);
    /// assert_eq!(Effect::of(Value::Number(0), &Rules::classic()), Effect::None);
    /// assert_eq!(Effect::of(Value::WildDraw4, &rules), Effect::Penalty(PenaltyKind::Draw4));
    /// ```
    pub fn of(value: Value, rules: &Rules) -> Self {
        match value {
            Value::Number(0) if rules.seven_zero => Effect::RotateHands,
            Value::Number(7) if rules.seven_zero => Effect::OfferExchange,
            Value::Number(_) | Value::Wild => Effect::None,
            Value::Skip => Effect::Skip,
            Value::SkipAll => Effect::SkipAll,
            Value::Reverse => Effect::Reverse,
            Value::Draw2 => Effect::Penalty(PenaltyKind::Draw2),
            Value::Draw4 | Value::WildDraw4 => Effect::Penalty(PenaltyKind::Draw4),
            Value::Draw6 => Effect::Penalty(PenaltyKind::Draw6),
            Value::Draw10 => Effect::Penalty(PenaltyKind::Draw10),
            Value::DiscardColor => Effect::DiscardColor,
            Value::ReverseDraw4 => Effect::ReverseDraw4,
            Value::ColorRoulette => Effect::ColorRoulette,
        }
    }

    /// Effects that move whole hands between players.
    pub fn moves_hands(self) -> bool {
        matches!(self, Effect::RotateHands | Effect::OfferExchange)
    }
}

/// Apply the effect of `card`, just played by the current player.
///
/// Skip effects pre-adjust the turn pointer; the caller's end-of-turn advance
/// completes the move.
pub(crate) fn dispatch(
    game: &mut Game,
    effect: Effect,
    card: Card,
    agent: &mut dyn DecisionProvider,
) {
    let actor = game.current;
    let step = game.direction.step();
    match effect {
        Effect::None => {}
        Effect::Skip => {
            game.current = game.offset(actor, step);
            let skipped = game.ring[game.current].id;
            game.record(GameEvent::Skipped { player: skipped });
        }
        Effect::SkipAll => {
            game.current = game.offset(actor, -step);
            let player = game.ring[actor].id;
            game.record(GameEvent::SkippedAll { player });
        }
        Effect::Reverse => {
            reverse(game);
            if game.rules.heads_up_reverse_skips && game.ring.len() == 2 {
                game.current = game.offset(actor, game.direction.step());
                let skipped = game.ring[game.current].id;
                game.record(GameEvent::Skipped { player: skipped });
            }
        }
        Effect::Penalty(kind) => {
            if !game.pending.is_active() {
                game.pending = PendingDraw::start(kind);
                game.record(GameEvent::PenaltyStarted { pending: game.pending });
            }
        }
        Effect::DiscardColor => discard_color(game, card),
        Effect::ReverseDraw4 => {
            let target = game.offset(actor, -step);
            let drawn = game.draw_into(target, REVERSE_DRAW_PENALTY);
            let target = game.ring[target].id;
            game.record(GameEvent::ReverseDrawn { target, drawn });
            reverse(game);
        }
        Effect::ColorRoulette => color_roulette(game, card),
        Effect::RotateHands => rotate_hands(game),
        Effect::OfferExchange => offer_exchange(game, agent),
    }
}

fn reverse(game: &mut Game) {
    game.direction = game.direction.flipped();
    game.record(GameEvent::Reversed { direction: game.direction });
}

fn discard_color(game: &mut Game, card: Card) {
    let Some(color) = card.color() else {
        return;
    };
    let idx = game.current;
    let hand = std::mem::take(&mut game.ring[idx].hand);
    let (matching, kept): (Vec<Card>, Vec<Card>) =
        hand.into_iter().partition(|c| c.color() == Some(color) && !c.is_wild());
    game.ring[idx].hand = kept;
    let count = matching.len();
    game.zones.insert_under_top(matching);
    let player = game.ring[idx].id;
    game.record(GameEvent::ColorDiscarded { player, color, count });
}

/// The next player draws until they hit the chosen color or the piles run dry.
fn color_roulette(game: &mut Game, card: Card) {
    let Some(color) = card.color() else {
        return;
    };
    let target = game.offset(game.current, game.direction.step());
    let mut drawn = 0;
    while let Some(c) = game.zones.draw_one(&mut game.rng) {
        game.ring[target].hand.push(c);
        drawn += 1;
        if c.color() == Some(color) {
            break;
        }
    }
    let target = game.ring[target].id;
    game.record(GameEvent::RouletteDrawn { target, color, drawn });
}

/// Every hand moves one seat along the direction of play.
pub(crate) fn rotate_hands(game: &mut Game) {
    if game.ring.len() < 2 {
        return;
    }
    let mut hands: Vec<Vec<Card>> =
        game.ring.iter_mut().map(|p| std::mem::take(&mut p.hand)).collect();
    match game.direction {
        Direction::Clockwise => hands.rotate_right(1),
        Direction::CounterClockwise => hands.rotate_left(1),
    }
    for (player, hand) in game.ring.iter_mut().zip(hands) {
        player.hand = hand;
    }
    game.record(GameEvent::HandsRotated { direction: game.direction });
}

/// Ring index of the opponent holding strictly the fewest cards, if anyone holds
/// fewer than the current player.
///
/// Ties go to the first tied opponent in turn order from the actor, following
/// the current direction, rather than to the lowest-numbered seat.
pub(crate) fn exchange_candidate(game: &Game) -> Option<usize> {
    let actor = game.current;
    let own = game.ring[actor].hand.len();
    let step = game.direction.step();
    let mut best: Option<(usize, usize)> = None;
    for k in 1..game.ring.len() {
        let idx = game.offset(actor, step * k as isize);
        let size = game.ring[idx].hand.len();
        if size < own && best.map_or(true, |(_, b)| size < b) {
            best = Some((idx, size));
        }
    }
    best.map(|(idx, _)| idx)
}

fn offer_exchange(game: &mut Game, agent: &mut dyn DecisionProvider) {
    if game.ring.len() < 2 {
        return;
    }
    let Some(target) = exchange_candidate(game) else {
        return;
    };
    let actor = game.current;
    let player = game.ring[actor].id;
    let with = game.ring[target].id;
    let obs = game.observe(DecisionPhase::Play);
    if !agent.accept_exchange(&obs, with, game.ring[target].hand.len()) {
        game.record(GameEvent::ExchangeDeclined { player, with });
        return;
    }
    let mine = std::mem::take(&mut game.ring[actor].hand);
    let theirs = std::mem::replace(&mut game.ring[target].hand, mine);
    game.ring[actor].hand = theirs;
    game.record(GameEvent::HandsExchanged { player, with });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::scripted::ScriptedAgent;
    use crate::cards::{parse_cards, Color};
    use crate::game::PlayerId;

    fn cards(s: &str) -> Vec<Card> {
        parse_cards(s).unwrap()
    }

    fn fixture(hands: &[&str], deck: &str) -> Game {
        Game::builder(Rules::no_mercy())
            .hands(hands.iter().map(|h| cards(h)).collect())
            .deck(cards(deck))
            .discard(cards("R0"))
            .build()
            .unwrap()
    }

    fn hand_sizes(game: &Game) -> Vec<usize> {
        game.players().iter().map(|p| p.hand_len()).collect()
    }

    #[test]
    fn every_value_maps_to_an_effect() {
        let rules = Rules::no_mercy();
        assert_eq!(Effect::of(Value::Number(5), &rules), Effect::None);
        assert_eq!(Effect::of(Value::Number(7), &rules), Effect::OfferExchange);
        assert_eq!(Effect::of(Value::Skip, &rules), Effect::Skip);
        assert_eq!(Effect::of(Value::Draw10, &rules), Effect::Penalty(PenaltyKind::Draw10));
        assert!(Effect::of(Value::Number(0), &rules).moves_hands());
        assert!(!Effect::of(Value::Number(7), &Rules::classic()).moves_hands());
    }

    #[test]
    fn skip_and_skip_all_pre_adjust_the_pointer() {
        let mut agent = ScriptedAgent::new();
        let mut game = fixture(&["R1", "R2", "R3"], "");
        dispatch(&mut game, Effect::Skip, Card::new(Value::Skip, Color::Red), &mut agent);
        assert_eq!(game.current, 1);
        game.current = 0;
        dispatch(&mut game, Effect::SkipAll, Card::new(Value::SkipAll, Color::Red), &mut agent);
        assert_eq!(game.current, 2);
    }

    #[test]
    fn heads_up_reverse_skips_only_in_classic() {
        let mut agent = ScriptedAgent::new();
        let reverse = Card::new(Value::Reverse, Color::Red);
        let mut game = Game::builder(Rules::classic())
            .hands(vec![cards("R1"), cards("R2")])
            .discard(cards("R0"))
            .build()
            .unwrap();
        dispatch(&mut game, Effect::Reverse, reverse, &mut agent);
        assert_eq!(game.direction, Direction::CounterClockwise);
        assert_eq!(game.current, 1);

        let mut game = fixture(&["R1", "R2"], "");
        dispatch(&mut game, Effect::Reverse, reverse, &mut agent);
        assert_eq!(game.current, 0);
    }

    #[test]
    fn penalty_only_starts_when_none_is_pending() {
        let mut agent = ScriptedAgent::new();
        let mut game = fixture(&["R1", "R2"], "");
        let card = Card::new(Value::Draw2, Color::Red);
        dispatch(&mut game, Effect::Penalty(PenaltyKind::Draw2), card, &mut agent);
        assert_eq!(game.pending, PendingDraw::start(PenaltyKind::Draw2));
        let card = Card::wild(Value::Draw6).with_color(Color::Red);
        dispatch(&mut game, Effect::Penalty(PenaltyKind::Draw6), card, &mut agent);
        assert_eq!(game.pending.amount(), 2);
    }

    #[test]
    fn discard_color_keeps_played_card_on_top() {
        let mut agent = ScriptedAgent::new();
        let played = Card::new(Value::DiscardColor, Color::Blue);
        let mut game = fixture(&["B1 R2 B9 Draw6", "G1"], "");
        game.zones.discard_card(played);
        let before = game.total_cards();
        dispatch(&mut game, Effect::DiscardColor, played, &mut agent);
        assert_eq!(game.players()[0].hand(), cards("R2 Draw6").as_slice());
        assert_eq!(game.top(), Some(played));
        assert_eq!(game.discard().len(), 4);
        assert_eq!(game.total_cards(), before);
    }

    #[test]
    fn reverse_draw4_hits_the_previous_player_then_flips() {
        let mut agent = ScriptedAgent::new();
        let mut game = fixture(&["R1", "R2", "R3"], "B1 B2 B3 B4 B5");
        game.current = 1;
        let card = Card::wild(Value::ReverseDraw4).with_color(Color::Green);
        dispatch(&mut game, Effect::ReverseDraw4, card, &mut agent);
        assert_eq!(hand_sizes(&game), vec![5, 1, 1]);
        assert_eq!(game.direction, Direction::CounterClockwise);
    }

    #[test]
    fn color_roulette_draws_until_the_color_shows() {
        let mut agent = ScriptedAgent::new();
        // top of deck is the last card: R4, then B5, then G6
        let mut game = fixture(&["R1", "R2"], "Y1 Y2 Y3 Y4 Y5 G6 B5 R4");
        let card = Card::wild(Value::ColorRoulette).with_color(Color::Green);
        dispatch(&mut game, Effect::ColorRoulette, card, &mut agent);
        assert_eq!(game.players()[1].hand_len(), 4);
        assert!(matches!(
            game.history().last(),
            Some(GameEvent::RouletteDrawn { drawn: 3, color: Color::Green, .. })
        ));
    }

    #[test]
    fn color_roulette_stops_when_the_piles_are_empty() {
        let mut agent = ScriptedAgent::new();
        let mut game = fixture(&["R1", "R2"], "Y1 Y2");
        let card = Card::wild(Value::ColorRoulette).with_color(Color::Blue);
        dispatch(&mut game, Effect::ColorRoulette, card, &mut agent);
        assert_eq!(game.players()[1].hand_len(), 3);
        assert_eq!(game.deck_len(), 0);
    }

    #[test]
    fn rotation_follows_direction() {
        let mut game = fixture(&["R1", "R2 R2", "R3 R3 R3"], "");
        rotate_hands(&mut game);
        assert_eq!(hand_sizes(&game), vec![3, 1, 2]);
        game.direction = Direction::CounterClockwise;
        rotate_hands(&mut game);
        assert_eq!(hand_sizes(&game), vec![1, 2, 3]);
    }

    #[test]
    fn exchange_targets_strictly_smaller_hand() {
        let game = fixture(&["R1 R2 R3", "R1 R2", "R1 R2", "R9 R8 R7 R6"], "");
        assert_eq!(exchange_candidate(&game), Some(1));
        let even = fixture(&["R1 R2", "R3 R4", "R5 R6"], "");
        assert_eq!(exchange_candidate(&even), None);
    }

    #[test]
    fn exchange_ties_follow_turn_order() {
        let mut game = fixture(&["R1", "R1 R2 R3", "R2"], "");
        game.current = 1;
        assert_eq!(exchange_candidate(&game), Some(2));
        game.direction = game.direction.flipped();
        assert_eq!(exchange_candidate(&game), Some(0));
    }

    #[test]
    fn exchange_can_be_declined() {
        let card = Card::new(Value::Number(7), Color::Red);
        let mut game = fixture(&["R1 R2 R3", "G1"], "");
        let mut declines = ScriptedAgent::new().accepting_exchanges(false);
        dispatch(&mut game, Effect::OfferExchange, card, &mut declines);
        assert_eq!(hand_sizes(&game), vec![3, 1]);
        let mut accepts = ScriptedAgent::new();
        dispatch(&mut game, Effect::OfferExchange, card, &mut accepts);
        assert_eq!(hand_sizes(&game), vec![1, 3]);
        assert!(matches!(
            game.history().last(),
            Some(GameEvent::HandsExchanged { with, .. }) if *with == PlayerId::new(2)
        ));
    }
}
