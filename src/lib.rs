//! Agar Engine Library
//!
//! Deterministic, single-threaded simulation core for a mass-consumption
//! arena game: cells eat pellets, food and each other, split, merge and pop
//! on viruses. Rendering, input and bot policies live outside the crate;
//! bots plug in through the `Controller` trait.

pub mod config;
pub mod game;
pub mod util;

pub use config::{ConfigError, GameConfig, RuleConfig};
pub use game::controller::{Controller, Decision, HungryBot};
pub use game::engine::{Engine, EngineError};
pub use game::player::{Action, Player, PlayerId};
pub use game::state::GameState;
