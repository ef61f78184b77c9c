//! uno-rs: UNO and UNO No Mercy rules engine
//!
//! Goals:
//! - Rule-correct turn resolution for the classic game and the No Mercy variant
//! - Deterministic play: one seed fixes every shuffle and every bot decision
//! - Illegal moves are rejected with an error and never change the game
//!
//! ## Quick start: play a bot game to the end
//! ```
//! use uno_rs::agents::{AgentTable, BotProfile};
//! use uno_rs::game::Game;
//! use uno_rs::rules::Rules;
//!
//! let rules = Rules::no_mercy().with_players(4);
//! let mut game = Game::new(rules, 2024).unwrap();
//! let mut agents = AgentTable::bots(4, &BotProfile::default());
//! while !game.is_over() && game.turn() < 5_000 {
//!     game.play_turn(&mut agents).unwrap();
//! }
//! assert_eq!(game.total_cards(), 168);
//! ```
//!
//! ## Simulations
//! Run seeded bot batches and write statistics with:
//! ```sh
//! cargo run --bin uno-rs -- simulate --games 5000 --out stats/
//! ```

pub mod agents;
pub mod cards;
pub mod deck;
pub mod effects;
pub mod engine;
pub mod game;
pub mod mercy;
pub mod rules;
pub mod sim;
pub mod stats;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
