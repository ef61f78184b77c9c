use proptest::prelude::*;
use uno_rs::agents::{AgentTable, BotProfile, Decision, Difficulty, ScriptedAgent};
use uno_rs::cards::{Card, Color, Value};
use uno_rs::game::{Direction, Game, GameEvent, PenaltyKind, PlayerId};
use uno_rs::rules::{Rules, Variant};

const TURN_CAP: u32 = 1_500;

fn any_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Medium),
        Just(Difficulty::Hard),
        Just(Difficulty::Expert),
    ]
}

fn any_variant() -> impl Strategy<Value = Variant> {
    prop_oneof![Just(Variant::NoMercy), Just(Variant::Classic)]
}

fn any_color() -> impl Strategy<Value = Color> {
    prop_oneof![Just(Color::Red), Just(Color::Blue), Just(Color::Green), Just(Color::Yellow)]
}

/// Plain number cards that never trigger a hand-moving effect.
fn quiet_card() -> impl Strategy<Value = Card> {
    (prop_oneof![1u8..=6, 8u8..=9], any_color()).prop_map(|(v, c)| Card::new(Value::Number(v), c))
}

fn check_table(game: &Game) -> Result<(), TestCaseError> {
    prop_assert_eq!(game.total_cards(), game.initial_cards());
    prop_assert!(game.current() < game.players().len());
    let ids: Vec<PlayerId> = game.players().iter().map(|p| p.id()).collect();
    prop_assert!(ids.windows(2).all(|w| w[0] < w[1]), "seating order changed: {:?}", ids);
    for id in game.eliminated() {
        prop_assert!(!ids.contains(id));
    }
    let pending = game.pending();
    prop_assert_eq!(pending.amount() == 0, pending.kind().is_none());
    for player in game.players() {
        prop_assert!(player.hand().iter().all(|c| !c.is_wild() || c.color().is_none()));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn bot_games_keep_the_table_consistent(
        seed in any::<u64>(),
        players in 2usize..=8,
        difficulty in any_difficulty(),
        variant in any_variant(),
    ) {
        let rules = Rules::for_variant(variant).with_players(players);
        let mut game = Game::new(rules, seed).unwrap();
        let mut agents = AgentTable::bots(players, &BotProfile::for_difficulty(difficulty));
        let mut alive = game.players().len();
        check_table(&game)?;
        while !game.is_over() && game.turn() < TURN_CAP {
            game.play_turn(&mut agents).unwrap();
            check_table(&game)?;
            prop_assert!(game.players().len() <= alive);
            alive = game.players().len();
        }
        prop_assert!(game.turn() <= TURN_CAP);
        if let Some(winner) = game.winner() {
            prop_assert!(!game.eliminated().contains(&winner));
            prop_assert_eq!(game.players().len() + game.eliminated().len(), players);
        }
    }

    #[test]
    fn played_wilds_always_carry_a_color(seed in any::<u64>(), players in 2usize..=6) {
        let mut game = Game::new(Rules::no_mercy().with_players(players), seed).unwrap();
        let mut agents = AgentTable::bots(players, &BotProfile::default());
        while !game.is_over() && game.turn() < TURN_CAP {
            game.play_turn(&mut agents).unwrap();
        }
        for event in game.history() {
            if let GameEvent::Played { card, .. } = event {
                prop_assert!(!card.is_wild() || card.color().is_some(), "uncolored {}", card);
            }
        }
    }

    #[test]
    fn stacking_chains_only_escalate(seed in any::<u64>(), players in 2usize..=6) {
        let mut game = Game::new(Rules::no_mercy().with_players(players), seed).unwrap();
        let mut agents =
            AgentTable::bots(players, &BotProfile::for_difficulty(Difficulty::Expert));
        while !game.is_over() && game.turn() < TURN_CAP {
            game.play_turn(&mut agents).unwrap();
        }
        let mut chain: Option<(u32, Option<PenaltyKind>)> = None;
        for event in game.history() {
            match event {
                GameEvent::PenaltyStarted { pending } => {
                    chain = Some((pending.amount(), pending.kind()));
                }
                GameEvent::Stacked { pending, .. } => {
                    if let Some((amount, kind)) = chain {
                        prop_assert!(pending.amount() > amount);
                        prop_assert!(pending.kind() >= kind);
                    }
                    chain = Some((pending.amount(), pending.kind()));
                }
                GameEvent::PenaltyDrawn { .. } => chain = None,
                _ => {}
            }
        }
    }

    #[test]
    fn same_seed_same_game(seed in any::<u64>(), players in 2usize..=6) {
        let play = || {
            let mut game = Game::new(Rules::no_mercy().with_players(players), seed).unwrap();
            let mut agents = AgentTable::bots(players, &BotProfile::default());
            for _ in 0..200 {
                if game.is_over() {
                    break;
                }
                game.play_turn(&mut agents).unwrap();
            }
            game.history().to_vec()
        };
        prop_assert_eq!(play(), play());
    }

    #[test]
    fn zero_rotation_is_a_bijection(
        extra in prop::collection::vec(quiet_card(), 1..5),
        others in prop::collection::vec(prop::collection::vec(quiet_card(), 1..6), 1..6),
        clockwise in any::<bool>(),
    ) {
        let mut first = vec![Card::new(Value::Number(0), Color::Red)];
        first.extend(extra.iter().copied());
        let mut hands = vec![first];
        hands.extend(others.iter().cloned());
        let n = hands.len();
        let direction = if clockwise { Direction::Clockwise } else { Direction::CounterClockwise };
        let mut game = Game::builder(Rules::no_mercy())
            .hands(hands.clone())
            .discard(vec![Card::new(Value::Number(5), Color::Red)])
            .direction(direction)
            .build()
            .unwrap();
        let mut agents = AgentTable::for_seats(n);
        let zero = ScriptedAgent::new().then(Decision::play(0));
        agents.set_agent(PlayerId::new(1), Some(Box::new(zero)));
        for seat in 2..=n {
            agents.set_agent(PlayerId::new(seat), Some(Box::new(ScriptedAgent::new())));
        }
        game.play_turn(&mut agents).unwrap();

        hands[0].remove(0);
        for i in 0..n {
            let from = if clockwise { (i + n - 1) % n } else { (i + 1) % n };
            prop_assert_eq!(game.players()[i].hand(), &hands[from][..]);
        }
    }
}
