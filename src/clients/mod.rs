//! Type-safe wrappers around [`StateClient`](crate::framework::StateClient).

pub mod game_client;

pub use game_client::*;
