use crate::agents::{DecisionPhase, Observation, OpponentView};
use crate::cards::{is_playable, Card, Color, Kind, Value};
use crate::deck::{Deck, Zones};
use crate::rules::{Rules, RulesError, Variant};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fmt;

/// Stable, 1-based player identifier. Ids are never reused after elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PlayerId(usize);

impl PlayerId {
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// Ring offset of one step: `+1` or `-1`.
    pub const fn step(self) -> isize {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Clockwise => "clockwise",
            Direction::CounterClockwise => "counter-clockwise",
        })
    }
}

/// Draw penalty families, ordered by strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PenaltyKind {
    Draw2,
    Draw4,
    Draw6,
    Draw10,
}

impl PenaltyKind {
    pub const fn amount(self) -> u32 {
        match self {
            PenaltyKind::Draw2 => 2,
            PenaltyKind::Draw4 => 4,
            PenaltyKind::Draw6 => 6,
            PenaltyKind::Draw10 => 10,
        }
    }

    /// The penalty a card value starts or stacks. `WildDraw4` counts as a Draw4.
    pub const fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Draw2 => Some(PenaltyKind::Draw2),
            Value::Draw4 | Value::WildDraw4 => Some(PenaltyKind::Draw4),
            Value::Draw6 => Some(PenaltyKind::Draw6),
            Value::Draw10 => Some(PenaltyKind::Draw10),
            _ => None,
        }
    }

    /// A draw card may be stacked onto a pending penalty of equal or lower strength.
    pub fn can_stack_onto(self, pending: PenaltyKind) -> bool {
        self >= pending
    }
}

impl fmt::Display for PenaltyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PenaltyKind::Draw2 => "Draw2",
            PenaltyKind::Draw4 => "Draw4",
            PenaltyKind::Draw6 => "Draw6",
            PenaltyKind::Draw10 => "Draw10",
        })
    }
}

/// Accumulated penalty of a stacking chain.
///
/// The amount is the sum of every card in the chain and the kind is that of the
/// most recent card; both are empty together.
///
/// ```
/// use uno_rs::cards::Value;
/// use uno_rs::game::{PenaltyKind, PendingDraw};
///
/// let pending = PendingDraw::start(PenaltyKind::Draw2).stacked(PenaltyKind::Draw4);
/// assert_eq!(pending.amount(), 6);
/// assert_eq!(pending.kind(), Some(PenaltyKind::Draw4));
/// assert!(!pending.accepts(Value::Draw2));
/// assert!(pending.accepts(Value::Draw10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PendingDraw {
    amount: u32,
    kind: Option<PenaltyKind>,
}

impl PendingDraw {
    pub const NONE: PendingDraw = PendingDraw { amount: 0, kind: None };

    pub const fn start(kind: PenaltyKind) -> Self {
        Self { amount: kind.amount(), kind: Some(kind) }
    }

    /// The chain after `kind` is stacked on top.
    pub const fn stacked(self, kind: PenaltyKind) -> Self {
        Self { amount: self.amount + kind.amount(), kind: Some(kind) }
    }

    pub const fn amount(self) -> u32 {
        self.amount
    }

    pub const fn kind(self) -> Option<PenaltyKind> {
        self.kind
    }

    pub const fn is_active(self) -> bool {
        self.amount > 0
    }

    /// Whether a card of `value` may be stacked onto this chain.
    pub fn accepts(self, value: Value) -> bool {
        match (self.kind, PenaltyKind::from_value(value)) {
            (Some(pending), Some(played)) => played.can_stack_onto(pending),
            _ => false,
        }
    }
}

impl fmt::Display for PendingDraw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "+{} ({kind})", self.amount),
            None => f.write_str("none"),
        }
    }
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) hand: Vec<Card>,
}

impl Player {
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Returns the cards currently held
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn hand_len(&self) -> usize {
        self.hand.len()
    }
}

/// Everything that happened in a game, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameEvent {
    Started { players: usize, start: Option<Card> },
    Played { player: PlayerId, card: Card },
    /// A voluntary draw; `drawn < requested` when both piles ran dry.
    Drew { player: PlayerId, requested: usize, drawn: usize },
    Stacked { player: PlayerId, card: Card, pending: PendingDraw },
    PenaltyStarted { pending: PendingDraw },
    PenaltyDrawn { player: PlayerId, amount: u32, drawn: usize },
    Skipped { player: PlayerId },
    SkippedAll { player: PlayerId },
    Reversed { direction: Direction },
    ColorDiscarded { player: PlayerId, color: Color, count: usize },
    ReverseDrawn { target: PlayerId, drawn: usize },
    RouletteDrawn { target: PlayerId, color: Color, drawn: usize },
    HandsRotated { direction: Direction },
    HandsExchanged { player: PlayerId, with: PlayerId },
    ExchangeDeclined { player: PlayerId, with: PlayerId },
    Eliminated { player: PlayerId, hand_size: usize },
    Won { player: PlayerId },
    InvalidDecision { player: PlayerId, error: ActionError },
}

impl GameEvent {
    /// Cards that entered a hand through this event.
    pub fn cards_drawn(&self) -> usize {
        match self {
            GameEvent::Drew { drawn, .. }
            | GameEvent::PenaltyDrawn { drawn, .. }
            | GameEvent::ReverseDrawn { drawn, .. }
            | GameEvent::RouletteDrawn { drawn, .. } => *drawn,
            _ => 0,
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::Started { players, start: Some(card) } => {
                write!(f, "{players} players, starting card {card}")
            }
            GameEvent::Started { players, start: None } => write!(f, "{players} players"),
            GameEvent::Played { player, card } => write!(f, "{player} plays {card}"),
            GameEvent::Drew { player, requested, drawn } if drawn < requested => {
                write!(f, "{player} draws {drawn} of {requested} (deck exhausted)")
            }
            GameEvent::Drew { player, drawn, .. } => write!(f, "{player} draws {drawn}"),
            GameEvent::Stacked { player, card, pending } => {
                write!(f, "{player} stacks {card}, pending {pending}")
            }
            GameEvent::PenaltyStarted { pending } => write!(f, "penalty {pending}"),
            GameEvent::PenaltyDrawn { player, amount, drawn } => {
                write!(f, "{player} takes the penalty and draws {drawn} of {amount}")
            }
            GameEvent::Skipped { player } => write!(f, "{player} is skipped"),
            GameEvent::SkippedAll { player } => write!(f, "{player} skips everyone"),
            GameEvent::Reversed { direction } => write!(f, "direction is now {direction}"),
            GameEvent::ColorDiscarded { player, color, count } => {
                write!(f, "{player} discards {count} more {color} card(s)")
            }
            GameEvent::ReverseDrawn { target, drawn } => {
                write!(f, "{target} draws {drawn} from a reverse")
            }
            GameEvent::RouletteDrawn { target, color, drawn } => {
                write!(f, "{target} draws {drawn} looking for {color}")
            }
            GameEvent::HandsRotated { direction } => write!(f, "hands rotate {direction}"),
            GameEvent::HandsExchanged { player, with } => {
                write!(f, "{player} swaps hands with {with}")
            }
            GameEvent::ExchangeDeclined { player, with } => {
                write!(f, "{player} keeps their hand instead of swapping with {with}")
            }
            GameEvent::Eliminated { player, hand_size } => {
                write!(f, "{player} is eliminated holding {hand_size} cards")
            }
            GameEvent::Won { player } => write!(f, "{player} wins"),
            GameEvent::InvalidDecision { player, error } => {
                write!(f, "{player} made an invalid move: {error}")
            }
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("the game is over")]
    GameOver,
    #[error("card index {index} out of range for a hand of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{card} cannot be played on {top}")]
    NotPlayable { card: Card, top: Card },
    #[error("{card} cannot be stacked onto {pending}")]
    NotStackable { card: Card, pending: PendingDraw },
    #[error("no draw penalty is pending")]
    NoPendingDraw,
    #[error("a draw penalty of {pending} must be answered first")]
    PendingDrawActive { pending: PendingDraw },
    #[error("stacking is disabled")]
    StackingDisabled,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SetupError {
    #[error("at least two hands are needed, got {0}")]
    TooFewPlayers(usize),
    #[error("the discard pile needs a top card")]
    EmptyDiscard,
    #[error("current index {current} out of range for {players} players")]
    CurrentOutOfRange { current: usize, players: usize },
}

#[derive(Debug)]
#[non_exhaustive]
pub struct Game {
    pub(crate) rules: Rules,
    pub(crate) zones: Zones,
    /// Alive players in seating order.
    pub(crate) ring: Vec<Player>,
    pub(crate) current: usize,
    pub(crate) direction: Direction,
    pub(crate) pending: PendingDraw,
    pub(crate) turn: u32,
    pub(crate) winner: Option<PlayerId>,
    pub(crate) eliminated: Vec<PlayerId>,
    pub(crate) rng: ChaCha8Rng,
    card_total: usize,
    history: Vec<GameEvent>,
}

impl Game {
    /// Shuffle, deal and open the discard pile.
    ///
    /// ```
    /// use uno_rs::game::Game;
    /// use uno_rs::rules::Rules;
    ///
    /// let game = Game::new(Rules::no_mercy().with_players(6), 7).unwrap();
    /// assert_eq!(game.players().len(), 6);
    /// assert!(game.players().iter().all(|p| p.hand_len() == 7));
    /// assert_eq!(game.total_cards(), 168);
    /// ```
    pub fn new(rules: Rules, seed: u64) -> Result<Self, RulesError> {
        rules.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut deck = Deck::for_variant(rules.variant);
        deck.shuffle_with(&mut rng);

        let ring: Vec<Player> = (1..=rules.players)
            .map(|id| Player { id: PlayerId::new(id), hand: deck.draw_n(rules.hand_size) })
            .collect();
        let start = open_discard(&mut deck, &rules);
        let zones = Zones::new(deck, start.into_iter().collect(), rules.recycle_threshold);
        tracing::debug!(players = ring.len(), ?start, seed, "new game");
        Ok(Self::assemble(rules, zones, ring, 0, Direction::Clockwise, PendingDraw::NONE, rng))
    }

    /// A builder for a game with hand-picked hands, piles and state.
    pub fn builder(rules: Rules) -> GameBuilder {
        GameBuilder::new(rules)
    }

    fn assemble(
        rules: Rules,
        zones: Zones,
        ring: Vec<Player>,
        current: usize,
        direction: Direction,
        pending: PendingDraw,
        rng: ChaCha8Rng,
    ) -> Self {
        let card_total = zones.total() + ring.iter().map(Player::hand_len).sum::<usize>();
        let mut game = Self {
            rules,
            zones,
            ring,
            current,
            direction,
            pending,
            turn: 0,
            winner: None,
            eliminated: Vec::new(),
            rng,
            card_total,
            history: Vec::new(),
        };
        let start = game.top();
        game.record(GameEvent::Started { players: game.ring.len(), start });
        game
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Returns the alive players in seating order
    pub fn players(&self) -> &[Player] {
        &self.ring
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.ring.iter().find(|p| p.id == id)
    }

    /// Returns the index of the player to act
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        &self.ring[self.current]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending(&self) -> PendingDraw {
        self.pending
    }

    /// Returns the number of turns played so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn top(&self) -> Option<Card> {
        self.zones.top()
    }

    /// Color that the next card must match, if any.
    pub fn active_color(&self) -> Option<Color> {
        self.top().and_then(Card::color)
    }

    pub fn deck_len(&self) -> usize {
        self.zones.deck().len()
    }

    pub fn discard(&self) -> &[Card] {
        self.zones.discard()
    }

    pub fn recycles(&self) -> u32 {
        self.zones.recycles()
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Returns eliminated players, earliest first
    pub fn eliminated(&self) -> &[PlayerId] {
        &self.eliminated
    }

    /// Cards in the deck, the discard pile and every hand.
    pub fn total_cards(&self) -> usize {
        self.zones.total() + self.ring.iter().map(Player::hand_len).sum::<usize>()
    }

    /// The card count at the start of the game; [`Game::total_cards`] never departs from it.
    pub fn initial_cards(&self) -> usize {
        self.card_total
    }

    pub fn largest_hand(&self) -> usize {
        self.ring.iter().map(Player::hand_len).max().unwrap_or(0)
    }

    pub fn history(&self) -> &[GameEvent] {
        &self.history
    }

    pub fn history_recent(&self, n: usize) -> Vec<GameEvent> {
        if n == 0 {
            return Vec::new();
        }
        let start = self.history.len().saturating_sub(n);
        self.history[start..].to_vec()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Check that the current player may play the card at `index` in normal play.
    pub fn validate_play(&self, index: usize) -> Result<Card, ActionError> {
        if self.is_over() {
            return Err(ActionError::GameOver);
        }
        if self.pending.is_active() {
            return Err(ActionError::PendingDrawActive { pending: self.pending });
        }
        let card = self.card_at(index)?;
        match self.top() {
            Some(top) if !is_playable(card, top) => Err(ActionError::NotPlayable { card, top }),
            _ => Ok(card),
        }
    }

    /// Check that the current player may answer the pending penalty with the card at `index`.
    pub fn validate_stack(&self, index: usize) -> Result<Card, ActionError> {
        if self.is_over() {
            return Err(ActionError::GameOver);
        }
        if !self.pending.is_active() {
            return Err(ActionError::NoPendingDraw);
        }
        if !self.rules.stacking {
            return Err(ActionError::StackingDisabled);
        }
        let card = self.card_at(index)?;
        if !self.pending.accepts(card.value()) {
            return Err(ActionError::NotStackable { card, pending: self.pending });
        }
        Ok(card)
    }

    /// Hand indices the current player could play right now.
    pub fn legal_indices(&self) -> Vec<usize> {
        let len = self.current_player().hand_len();
        if self.pending.is_active() {
            (0..len).filter(|&i| self.validate_stack(i).is_ok()).collect()
        } else {
            (0..len).filter(|&i| self.validate_play(i).is_ok()).collect()
        }
    }

    fn card_at(&self, index: usize) -> Result<Card, ActionError> {
        let hand = &self.ring[self.current].hand;
        hand.get(index).copied().ok_or(ActionError::IndexOutOfRange { index, len: hand.len() })
    }

    /// Snapshot of what the current player can see.
    pub(crate) fn observe(&self, phase: DecisionPhase) -> Observation {
        let me = &self.ring[self.current];
        let step = self.direction.step();
        let opponents = (1..self.ring.len())
            .map(|k| {
                let p = &self.ring[self.offset(self.current, step * k as isize)];
                OpponentView { id: p.id, hand_size: p.hand.len() }
            })
            .collect();
        Observation {
            player: me.id,
            phase,
            hand: me.hand.clone(),
            top: self.top(),
            pending: self.pending,
            opponents,
            direction: self.direction,
            turn: self.turn,
            deck_len: self.deck_len(),
            default_color: self.rules.default_color,
        }
    }

    /// Ring index `steps` positions away from `from`.
    pub(crate) fn offset(&self, from: usize, steps: isize) -> usize {
        let n = self.ring.len() as isize;
        (from as isize + steps).rem_euclid(n) as usize
    }

    pub(crate) fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.ring.iter().position(|p| p.id == id)
    }

    /// Draw up to `n` cards into the hand at ring index `idx`; returns how many arrived.
    pub(crate) fn draw_into(&mut self, idx: usize, n: usize) -> usize {
        let cards = self.zones.draw(n, &mut self.rng);
        let drawn = cards.len();
        self.ring[idx].hand.extend(cards);
        drawn
    }

    pub(crate) fn record(&mut self, event: GameEvent) {
        match &event {
            GameEvent::Won { .. } | GameEvent::Eliminated { .. } => {
                tracing::info!(turn = self.turn, "{event}");
            }
            _ => tracing::debug!(turn = self.turn, "{event}"),
        }
        self.history.push(event);
    }
}

/// Flip the opening discard. Classic games reject anything but a number card.
fn open_discard(deck: &mut Deck, rules: &Rules) -> Option<Card> {
    if rules.variant == Variant::Classic {
        for _ in 0..deck.len() {
            let card = deck.draw()?;
            if card.kind() == Kind::Number {
                return Some(card);
            }
            deck.push_bottom(card);
        }
    }
    deck.draw()
}

/// Builds a [`Game`] from explicit hands and piles, mostly for tests and replays.
///
/// ```
/// use uno_rs::cards::parse_cards;
/// use uno_rs::game::Game;
/// use uno_rs::rules::Rules;
///
/// let game = Game::builder(Rules::no_mercy())
///     .hands(vec![parse_cards("R9").unwrap(), parse_cards("B1 G2").unwrap()])
///     .discard(parse_cards("R5").unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(game.validate_play(0).unwrap().to_string(), "Red 9");
/// ```
#[derive(Debug, Clone)]
pub struct GameBuilder {
    rules: Rules,
    hands: Vec<Vec<Card>>,
    deck: Vec<Card>,
    discard: Vec<Card>,
    current: usize,
    direction: Direction,
    pending: PendingDraw,
    seed: u64,
}

impl GameBuilder {
    fn new(rules: Rules) -> Self {
        Self {
            rules,
            hands: Vec::new(),
            deck: Vec::new(),
            discard: Vec::new(),
            current: 0,
            direction: Direction::Clockwise,
            pending: PendingDraw::NONE,
            seed: 0,
        }
    }

    /// One hand per player; player ids follow the order given.
    pub fn hands(mut self, hands: Vec<Vec<Card>>) -> Self {
        self.hands = hands;
        self
    }

    /// Deck contents, bottom first: the last card is drawn first.
    pub fn deck(mut self, cards: Vec<Card>) -> Self {
        self.deck = cards;
        self
    }

    /// Discard pile, bottom first: the last card is the top.
    pub fn discard(mut self, cards: Vec<Card>) -> Self {
        self.discard = cards;
        self
    }

    pub fn current(mut self, index: usize) -> Self {
        self.current = index;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn pending(mut self, pending: PendingDraw) -> Self {
        self.pending = pending;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<Game, SetupError> {
        let players = self.hands.len();
        if players < 2 {
            return Err(SetupError::TooFewPlayers(players));
        }
        if self.discard.is_empty() {
            return Err(SetupError::EmptyDiscard);
        }
        if self.current >= players {
            return Err(SetupError::CurrentOutOfRange { current: self.current, players });
        }
        let mut rules = self.rules;
        rules.players = players;
        let ring = self
            .hands
            .into_iter()
            .enumerate()
            .map(|(i, hand)| Player { id: PlayerId::new(i + 1), hand })
            .collect();
        let zones = Zones::new(Deck::from(self.deck), self.discard, rules.recycle_threshold);
        Ok(Game::assemble(
            rules,
            zones,
            ring,
            self.current,
            self.direction,
            self.pending,
            ChaCha8Rng::seed_from_u64(self.seed),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn cards(s: &str) -> Vec<Card> {
        parse_cards(s).unwrap()
    }

    fn fixture(hands: &[&str], top: &str) -> Game {
        Game::builder(Rules::no_mercy())
            .hands(hands.iter().map(|h| cards(h)).collect())
            .discard(cards(top))
            .build()
            .unwrap()
    }

    #[test]
    fn escalation_table() {
        use PenaltyKind::*;
        assert!(Draw2.can_stack_onto(Draw2));
        assert!(!Draw2.can_stack_onto(Draw4));
        assert!(Draw4.can_stack_onto(Draw2));
        assert!(Draw6.can_stack_onto(Draw4));
        assert!(!Draw6.can_stack_onto(Draw10));
        assert!(Draw10.can_stack_onto(Draw10));
    }

    #[test]
    fn pending_draw_stays_consistent() {
        assert!(!PendingDraw::NONE.is_active());
        assert_eq!(PendingDraw::NONE.kind(), None);
        let p = PendingDraw::start(PenaltyKind::Draw6).stacked(PenaltyKind::Draw10);
        assert_eq!((p.amount(), p.kind()), (16, Some(PenaltyKind::Draw10)));
        assert!(!PendingDraw::NONE.accepts(Value::Draw2));
        assert!(PendingDraw::start(PenaltyKind::Draw2).accepts(Value::WildDraw4));
        assert!(!PendingDraw::start(PenaltyKind::Draw2).accepts(Value::Skip));
    }

    #[test]
    fn new_game_deals_and_opens() {
        let game = Game::new(Rules::no_mercy().with_players(6), 3).unwrap();
        assert_eq!(game.deck_len(), 168 - 6 * 7 - 1);
        assert_eq!(game.discard().len(), 1);
        assert_eq!(game.total_cards(), game.initial_cards());
        let ids: Vec<usize> = game.players().iter().map(|p| p.id().get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert!(matches!(game.history()[0], GameEvent::Started { players: 6, .. }));
    }

    #[test]
    fn classic_games_open_on_a_number() {
        for seed in 0..40 {
            let game = Game::new(Rules::classic(), seed).unwrap();
            assert_eq!(game.top().map(Card::kind), Some(Kind::Number), "seed {seed}");
            assert_eq!(game.total_cards(), 108);
        }
    }

    #[test]
    fn same_seed_same_deal() {
        let a = Game::new(Rules::no_mercy(), 11).unwrap();
        let b = Game::new(Rules::no_mercy(), 11).unwrap();
        for (pa, pb) in a.players().iter().zip(b.players()) {
            assert_eq!(pa.hand(), pb.hand());
        }
        assert_eq!(a.top(), b.top());
    }

    #[test]
    fn validate_play_checks_index_and_match() {
        let game = fixture(&["R9 B7 Draw6", "G1"], "R5");
        assert_eq!(game.validate_play(0).unwrap(), Card::new(Value::Number(9), Color::Red));
        assert!(matches!(game.validate_play(1), Err(ActionError::NotPlayable { .. })));
        assert!(game.validate_play(2).is_ok());
        assert_eq!(game.validate_play(3), Err(ActionError::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(game.legal_indices(), vec![0, 2]);
    }

    #[test]
    fn validate_stack_follows_escalation() {
        let game = Game::builder(Rules::no_mercy())
            .hands(vec![cards("BDraw4 RDraw2 Draw10 R1"), cards("G1")])
            .discard(cards("GDraw4"))
            .pending(PendingDraw::start(PenaltyKind::Draw4))
            .build()
            .unwrap();
        assert!(game.validate_stack(0).is_ok());
        assert!(matches!(game.validate_stack(1), Err(ActionError::NotStackable { .. })));
        assert!(game.validate_stack(2).is_ok());
        assert!(matches!(game.validate_play(3), Err(ActionError::PendingDrawActive { .. })));
        assert_eq!(game.legal_indices(), vec![0, 2]);
    }

    #[test]
    fn validate_stack_without_penalty_or_stacking() {
        let game = fixture(&["RDraw2", "G1"], "R5");
        assert_eq!(game.validate_stack(0), Err(ActionError::NoPendingDraw));
        let classic = Game::builder(Rules::classic())
            .hands(vec![cards("RDraw2"), cards("G1")])
            .discard(cards("BDraw2"))
            .pending(PendingDraw::start(PenaltyKind::Draw2))
            .build()
            .unwrap();
        assert_eq!(classic.validate_stack(0), Err(ActionError::StackingDisabled));
    }

    #[test]
    fn observation_lists_opponents_in_turn_order() {
        let mut game = fixture(&["R1", "R2 R3", "R4 R5 R6"], "R0");
        let obs = game.observe(DecisionPhase::Play);
        let order: Vec<usize> = obs.opponents.iter().map(|o| o.id.get()).collect();
        assert_eq!(order, vec![2, 3]);
        game.direction = Direction::CounterClockwise;
        let obs = game.observe(DecisionPhase::Play);
        let sizes: Vec<usize> = obs.opponents.iter().map(|o| o.hand_size).collect();
        assert_eq!(sizes, vec![3, 2]);
    }

    #[test]
    fn builder_rejects_bad_fixtures() {
        let one = Game::builder(Rules::no_mercy()).hands(vec![cards("R1")]).discard(cards("R2"));
        assert_eq!(one.build().unwrap_err(), SetupError::TooFewPlayers(1));
        let no_top = Game::builder(Rules::no_mercy()).hands(vec![cards("R1"), cards("R2")]);
        assert_eq!(no_top.build().unwrap_err(), SetupError::EmptyDiscard);
    }

    #[test]
    fn offset_wraps_both_ways() {
        let game = fixture(&["R1", "R2", "R3", "R4"], "R0");
        assert_eq!(game.offset(0, -1), 3);
        assert_eq!(game.offset(3, 1), 0);
        assert_eq!(game.offset(1, -6), 3);
    }
}
