use uno_rs::agents::{AgentTable, BotProfile, Decision, ScriptedAgent};
use uno_rs::cards::{parse_cards, Card};
use uno_rs::game::{Game, GameEvent, PenaltyKind, PendingDraw, PlayerId};
use uno_rs::rules::Rules;

fn cards(s: &str) -> Vec<Card> {
    parse_cards(s).unwrap()
}

#[test]
fn history_recent_returns_the_latest_events() {
    let mut game = Game::builder(Rules::no_mercy())
        .hands(vec![cards("R9 G2"), cards("B1 B2")])
        .deck(cards("Y1 Y2 Y3 Y4 Y6 Y8"))
        .discard(cards("R5"))
        .build()
        .unwrap();
    let opening = game.history_recent(10);
    assert_eq!(opening.len(), game.history_len());
    assert!(matches!(opening[0], GameEvent::Started { .. }));

    let mut agents = AgentTable::for_seats(2);
    let leader = ScriptedAgent::new().then(Decision::play(0));
    agents.set_agent(PlayerId::new(1), Some(Box::new(leader)));
    agents.set_agent(PlayerId::new(2), Some(Box::new(ScriptedAgent::new())));
    game.play_turn(&mut agents).unwrap();

    let recent = game.history_recent(1);
    assert_eq!(recent.len(), 1);
    let played = GameEvent::Played { player: PlayerId::new(1), card: cards("R9")[0] };
    assert_eq!(recent[0], played);
    assert!(game.history_recent(0).is_empty());
    assert_eq!(game.history_recent(1_000), game.history());
}

#[test]
fn history_recent_tracks_a_bot_game() {
    let mut game = Game::new(Rules::no_mercy().with_players(3), 21).unwrap();
    let mut agents = AgentTable::bots(3, &BotProfile::default());
    for _ in 0..5 {
        game.play_turn(&mut agents).unwrap();
    }
    let total = game.history_len();
    let tail = game.history_recent(3);
    assert_eq!(tail.len(), 3.min(total));
    assert_eq!(&game.history()[total - tail.len()..], &tail[..]);
}

/// A penalty of 10 against a three-card deck forces a reshuffle of the discard pile.
fn recycling_game(seed: u64) -> Game {
    Game::builder(Rules::no_mercy())
        .hands(vec![cards("G1 G2"), cards("G3 G4")])
        .deck(cards("Y1 Y2 Y3"))
        .discard(cards("B1 B2 B3 B4 B5 B6 B7 B8 B9 Draw10:R"))
        .pending(PendingDraw::start(PenaltyKind::Draw10))
        .seed(seed)
        .build()
        .unwrap()
}

fn penalty_hand(seed: u64) -> Vec<Card> {
    let mut game = recycling_game(seed);
    let mut agents = AgentTable::for_seats(2);
    agents.set_agent(PlayerId::new(1), Some(Box::new(ScriptedAgent::new())));
    agents.set_agent(PlayerId::new(2), Some(Box::new(ScriptedAgent::new())));
    let report = game.play_turn(&mut agents).unwrap();
    assert_eq!(report.cards_drawn, 10);
    game.player(PlayerId::new(1)).unwrap().hand().to_vec()
}

#[test]
fn builder_seed_fixes_reshuffles() {
    assert_eq!(penalty_hand(7), penalty_hand(7));
    let hands: Vec<Vec<Card>> = (0..16).map(penalty_hand).collect();
    assert!(hands.iter().any(|h| h != &hands[0]), "every seed shuffled alike");
}
