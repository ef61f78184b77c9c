//! Game configuration: which deck, how many players, and which optional rules apply.

use crate::cards::Color;
use crate::deck::Deck;
use serde::Serialize;

/// Deck composition and default rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum Variant {
    /// 108-card deck, no stacking, no mercy rule.
    Classic,
    /// 168-card deck with SkipAll, DiscardColor and the No Mercy wilds.
    NoMercy,
}

impl Variant {
    pub fn deck_size(self) -> usize {
        Deck::for_variant(self).len()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RulesError {
    #[error("player count must be between {min} and {max}, got {got}")]
    PlayerCount { min: usize, max: usize, got: usize },
    #[error("hand size must be at least 1")]
    EmptyHands,
    #[error("dealing {needed} cards needs a bigger deck than {available}")]
    DeckTooSmall { needed: usize, available: usize },
    #[error("mercy limit must be positive")]
    ZeroMercyLimit,
}

/// Rule switches for one game.
///
/// ```
/// use uno_rs::rules::{Rules, Variant};
///
/// let rules = Rules::no_mercy().with_players(6).with_hand_size(7);
/// assert_eq!(rules.variant, Variant::NoMercy);
/// assert_eq!(rules.mercy_limit, Some(25));
/// assert!(rules.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Rules {
    pub variant: Variant,
    pub players: usize,
    pub hand_size: usize,
    /// Players holding more than this many cards after their turn are eliminated.
    pub mercy_limit: Option<usize>,
    /// Draw cards may be answered with an escalating draw card.
    pub stacking: bool,
    /// 0 rotates every hand, 7 offers a swap with the smallest opponent hand.
    pub seven_zero: bool,
    /// With two players, Reverse also skips the opponent.
    pub heads_up_reverse_skips: bool,
    /// The deck is refilled from the discard pile below this many cards.
    pub recycle_threshold: usize,
    /// Color a bot names for a wild card when it holds no colored cards.
    pub default_color: Color,
}

impl Rules {
    pub const MIN_PLAYERS: usize = 2;
    pub const MAX_PLAYERS: usize = 10;
    pub const DEFAULT_MERCY_LIMIT: usize = 25;
    pub const DEFAULT_RECYCLE_THRESHOLD: usize = 5;

    pub fn no_mercy() -> Self {
        Self {
            variant: Variant::NoMercy,
            players: 4,
            hand_size: 7,
            mercy_limit: Some(Self::DEFAULT_MERCY_LIMIT),
            stacking: true,
            seven_zero: true,
            heads_up_reverse_skips: false,
            recycle_threshold: Self::DEFAULT_RECYCLE_THRESHOLD,
            default_color: Color::Red,
        }
    }

    pub fn classic() -> Self {
        Self {
            variant: Variant::Classic,
            players: 4,
            hand_size: 7,
            mercy_limit: None,
            stacking: false,
            seven_zero: false,
            heads_up_reverse_skips: true,
            recycle_threshold: 4,
            default_color: Color::Red,
        }
    }

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self::classic(),
            Variant::NoMercy => Self::no_mercy(),
        }
    }

    pub fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }

    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    /// `None` disables the mercy rule.
    pub fn with_mercy_limit(mut self, limit: Option<usize>) -> Self {
        self.mercy_limit = limit;
        self
    }

    pub fn with_stacking(mut self, stacking: bool) -> Self {
        self.stacking = stacking;
        self
    }

    pub fn with_seven_zero(mut self, seven_zero: bool) -> Self {
        self.seven_zero = seven_zero;
        self
    }

    pub fn with_default_color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }

    /// Check that a game with these rules can be dealt.
    pub fn validate(&self) -> Result<(), RulesError> {
        if !(Self::MIN_PLAYERS..=Self::MAX_PLAYERS).contains(&self.players) {
            return Err(RulesError::PlayerCount {
                min: Self::MIN_PLAYERS,
                max: Self::MAX_PLAYERS,
                got: self.players,
            });
        }
        if self.hand_size == 0 {
            return Err(RulesError::EmptyHands);
        }
        if self.mercy_limit == Some(0) {
            return Err(RulesError::ZeroMercyLimit);
        }
        // Every hand plus the opening discard must come out of the deck.
        let needed = self.players * self.hand_size + 1;
        let available = self.variant.deck_size();
        if needed > available {
            return Err(RulesError::DeckTooSmall { needed, available });
        }
        Ok(())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::no_mercy()
    }
}
