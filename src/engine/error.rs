//! Error types for the game engine and its client.

use crate::config::ConfigError;
use crate::services::StoreError;
use thiserror::Error;

/// Errors that can occur during game operations.
///
/// Gameplay actions never fail: an ineligible select, collect or discard is absorbed as
/// a no-op. Errors are reserved for misuse and for the collaborators around the engine.
#[derive(Debug, Error)]
pub enum GameError {
    /// Only levels 1 and 2 have rules.
    #[error("Unknown level: {0}")]
    UnknownLevel(u32),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Score store error: {0}")]
    Store(#[from] StoreError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunication(String),
}

impl From<String> for GameError {
    fn from(msg: String) -> Self {
        GameError::ActorCommunication(msg)
    }
}
