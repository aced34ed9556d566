//! The game state engine.
//!
//! [`GameEngine`] is a pure reducer over `(GameState, EngineContext)`: it applies one
//! [`GameAction`] at a time and reports side effects as [`GameEvent`]s. Hosted inside a
//! [`StateActor`](crate::framework::StateActor), it becomes the single writer of the game.

pub mod actions;
pub mod catalog;
pub mod context;
pub mod error;
pub mod generator;
pub mod level;
pub mod machine;
pub mod pool;
pub mod score;

pub use actions::{GameAction, GameEvent};
pub use context::EngineContext;
pub use error::GameError;
pub use level::{LevelKind, LevelRules};
pub use machine::GameEngine;
pub use pool::PoolManager;

use crate::clients::GameClient;
use crate::config::GameConfig;
use crate::framework::StateActor;

/// Creates the game actor and its client. The actor must be spawned with
/// `actor.run(services)`.
pub fn new(config: GameConfig) -> Result<(StateActor<GameEngine>, GameClient), GameError> {
    let buffer = config.channel_buffer;
    let (actor, client) = StateActor::new(GameEngine::new(config)?, buffer);
    Ok((actor, GameClient::new(client)))
}
