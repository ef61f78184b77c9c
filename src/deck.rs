use crate::cards::{Card, Color, Value};
use crate::rules::Variant;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// An ordered stack of cards; the last element is the top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The 168-card No Mercy deck.
    ///
    /// ```
    /// use uno_rs::deck::Deck;
    ///
    /// assert_eq!(Deck::no_mercy().len(), 168);
    /// ```
    pub fn no_mercy() -> Self {
        let mut cards = Vec::with_capacity(168);
        for &color in &Color::ALL {
            for n in 0..=9 {
                cards.push(Card::new(Value::Number(n), color));
                cards.push(Card::new(Value::Number(n), color));
            }
            for (value, copies) in [
                (Value::Skip, 3),
                (Value::SkipAll, 2),
                (Value::Reverse, 3),
                (Value::Draw2, 3),
                (Value::Draw4, 2),
                (Value::DiscardColor, 3),
            ] {
                cards.extend(std::iter::repeat(Card::new(value, color)).take(copies));
            }
        }
        for (value, copies) in [
            (Value::ReverseDraw4, 8),
            (Value::Draw6, 4),
            (Value::Draw10, 4),
            (Value::ColorRoulette, 8),
        ] {
            cards.extend(std::iter::repeat(Card::wild(value)).take(copies));
        }
        Self { cards }
    }

    /// The 108-card classic deck.
    ///
    /// ```
    /// use uno_rs::deck::Deck;
    ///
    /// assert_eq!(Deck::classic().len(), 108);
    /// ```
    pub fn classic() -> Self {
        let mut cards = Vec::with_capacity(108);
        for &color in &Color::ALL {
            cards.push(Card::new(Value::Number(0), color));
            for n in 1..=9 {
                cards.push(Card::new(Value::Number(n), color));
                cards.push(Card::new(Value::Number(n), color));
            }
            for value in [Value::Skip, Value::Reverse, Value::Draw2] {
                cards.push(Card::new(value, color));
                cards.push(Card::new(value, color));
            }
        }
        for _ in 0..4 {
            cards.push(Card::wild(Value::Wild));
            cards.push(Card::wild(Value::WildDraw4));
        }
        Self { cards }
    }

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self::classic(),
            Variant::NoMercy => Self::no_mercy(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    /// Shuffle using a seeded RNG for reproducibility.
    pub fn shuffle_seeded(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.cards.shuffle(&mut rng);
    }

    /// Shuffle using the provided RNG implementing Rng.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Draw one card from the top of the deck.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Draw up to `n` cards from the top of the deck.
    pub fn draw_n(&mut self, n: usize) -> Vec<Card> {
        (0..n).map_while(|_| self.draw()).collect()
    }

    /// Put a card underneath everything else.
    pub fn push_bottom(&mut self, card: Card) {
        self.cards.insert(0, card);
    }
}

impl From<Vec<Card>> for Deck {
    /// Cards are given bottom-first: the last element is drawn first.
    fn from(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

/// Deck and discard pile, with refilling from the discard pile.
#[derive(Debug, Clone)]
pub struct Zones {
    deck: Deck,
    discard: Vec<Card>,
    recycle_threshold: usize,
    recycles: u32,
}

impl Zones {
    pub fn new(deck: Deck, discard: Vec<Card>, recycle_threshold: usize) -> Self {
        Self { deck, discard, recycle_threshold, recycles: 0 }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub(crate) fn deck_mut(&mut self) -> &mut Deck {
        &mut self.deck
    }

    /// Discard pile, bottom first.
    pub fn discard(&self) -> &[Card] {
        &self.discard
    }

    pub fn top(&self) -> Option<Card> {
        self.discard.last().copied()
    }

    /// Number of times the discard pile was shuffled back into the deck.
    pub fn recycles(&self) -> u32 {
        self.recycles
    }

    pub fn total(&self) -> usize {
        self.deck.len() + self.discard.len()
    }

    /// Place a played card on top of the discard pile.
    pub fn discard_card(&mut self, card: Card) {
        self.discard.push(card);
    }

    /// Slide cards into the discard pile beneath the current top card.
    pub fn insert_under_top(&mut self, cards: impl IntoIterator<Item = Card>) {
        match self.discard.pop() {
            Some(top) => {
                self.discard.extend(cards);
                self.discard.push(top);
            }
            None => self.discard.extend(cards),
        }
    }

    /// Move every discard except the top card into the deck and shuffle.
    ///
    /// Returns the number of cards moved. Chosen wild colors are cleared.
    pub fn recycle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let Some(top) = self.discard.pop() else {
            return 0;
        };
        let moved = self.discard.len();
        for card in self.discard.drain(..) {
            self.deck.cards.push(card.cleared());
        }
        self.discard.push(top);
        if moved > 0 {
            self.deck.shuffle_with(rng);
            self.recycles += 1;
            tracing::debug!(moved, deck = self.deck.len(), "recycled discard pile into deck");
        }
        moved
    }

    /// Draw up to `n` cards, refilling from the discard pile first when the deck
    /// is below the recycle threshold or cannot cover the request.
    ///
    /// A short result is normal once both piles run dry.
    pub fn draw<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) -> Vec<Card> {
        if n == 0 {
            return Vec::new();
        }
        if self.deck.len() < self.recycle_threshold.max(n) {
            self.recycle(rng);
        }
        let cards = self.deck.draw_n(n);
        if cards.len() < n {
            tracing::debug!(requested = n, drawn = cards.len(), "short draw");
        }
        cards
    }

    /// Draw a single card, recycling as [`Zones::draw`] does.
    pub fn draw_one<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Card> {
        self.draw(1, rng).pop()
    }
}
