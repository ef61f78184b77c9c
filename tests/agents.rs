use std::io::Cursor;
use uno_rs::agents::{AgentKind, AgentTable, BotProfile, ConsoleAgent, Difficulty, ScriptedAgent};
use uno_rs::game::{Game, GameEvent, PlayerId};
use uno_rs::rules::Rules;
use uno_rs::sim::run_game;

#[test]
fn every_difficulty_finishes_a_game() {
    let tiers = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Expert];
    for difficulty in tiers {
        let mut game = Game::new(Rules::no_mercy().with_players(5), 12).unwrap();
        let mut agents = AgentTable::bots(5, &BotProfile::for_difficulty(difficulty));
        let summary = run_game(&mut game, &mut agents, 10_000, &mut ()).unwrap();
        assert!(!summary.capped, "{difficulty:?} bots never finished");
        assert_eq!(game.total_cards(), game.initial_cards());
    }
}

#[test]
fn bots_never_make_invalid_decisions() {
    let mut game = Game::new(Rules::classic().with_players(4), 77).unwrap();
    let mut agents = AgentTable::bots(4, &BotProfile::for_difficulty(Difficulty::Easy));
    run_game(&mut game, &mut agents, 5_000, &mut ()).unwrap();
    let invalid = game.history().iter().any(|e| matches!(e, GameEvent::InvalidDecision { .. }));
    assert!(!invalid);
}

#[test]
fn console_seat_plays_from_its_input() {
    let mut game = Game::new(Rules::no_mercy().with_players(3), 3).unwrap();
    let mut agents = AgentTable::bots(3, &BotProfile::default());
    // Junk, then an out-of-range card, then draws until input runs out.
    let input = Cursor::new(b"what\n99\nd\nn\nd\nn\n".to_vec());
    let human = ConsoleAgent::new(input, Vec::new(), false);
    agents.set_agent(PlayerId::new(1), Some(Box::new(human)));
    assert!(agents.any_humans());
    assert_eq!(agents.agent_kind(PlayerId::new(1)), Some(AgentKind::Human));

    for _ in 0..30 {
        if game.is_over() {
            break;
        }
        game.play_turn(&mut agents).unwrap();
    }
    let invalid = game.history().iter().any(|e| {
        matches!(e, GameEvent::InvalidDecision { player, .. } if *player == PlayerId::new(1))
    });
    assert!(!invalid);
}

#[test]
fn table_reports_seat_kinds() {
    let mut agents = AgentTable::for_seats(3);
    agents.set_agent(PlayerId::new(2), Some(Box::new(ScriptedAgent::new())));
    assert_eq!(agents.len(), 3);
    assert!(!agents.has_agent(PlayerId::new(1)));
    assert_eq!(agents.agent_kind(PlayerId::new(2)), Some(AgentKind::Scripted));
    assert_eq!(format!("{agents:?}"), "AgentTable(-S-)");
    agents.clear();
    assert!(!agents.has_agent(PlayerId::new(2)));
}
