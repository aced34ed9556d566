//! # Framework Errors
//!
//! Common error types shared by every actor and client built on the framework.

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("State machine error: {0}")]
    Machine(Box<dyn std::error::Error + Send + Sync>),
}
