//! The mercy rule: a player who ends their turn holding more cards than the
//! limit leaves the game for good.

use crate::game::{Game, GameEvent, PlayerId};

/// Whether a hand of `hand_size` cards breaks `limit`. `None` disables the rule.
///
/// ```
/// use uno_rs::mercy::exceeds_limit;
///
/// assert!(!exceeds_limit(25, Some(25)));
/// assert!(exceeds_limit(26, Some(25)));
/// assert!(!exceeds_limit(400, None));
/// ```
pub fn exceeds_limit(hand_size: usize, limit: Option<usize>) -> bool {
    limit.is_some_and(|limit| hand_size > limit)
}

/// Eliminate `actor` if their hand is over the limit.
///
/// On elimination the turn pointer is moved to whoever would have played next
/// and the eliminated hand goes to the bottom of the deck. With one player left
/// that player wins. Returns the eliminated hand size.
pub(crate) fn apply(game: &mut Game, actor: PlayerId) -> Option<usize> {
    let idx = game.index_of(actor)?;
    let hand_size = game.ring[idx].hand.len();
    if !exceeds_limit(hand_size, game.rules.mercy_limit) {
        return None;
    }

    let step = game.direction.step();
    let mut next = game.offset(game.current, step);
    if next == idx {
        // The actor was about to go again (SkipAll); play passes on instead.
        next = game.offset(idx, step);
    }
    let next_id = game.ring[next].id;

    let removed = game.ring.remove(idx);
    let deck = game.zones.deck_mut();
    for card in removed.hand {
        deck.push_bottom(card.cleared());
    }
    game.eliminated.push(actor);
    game.record(GameEvent::Eliminated { player: actor, hand_size });

    if game.ring.len() == 1 {
        let last = game.ring[0].id;
        game.current = 0;
        game.winner = Some(last);
        game.record(GameEvent::Won { player: last });
    } else {
        game.current = game.index_of(next_id).unwrap_or(0);
    }
    Some(hand_size)
}
