//! Generic actor framework for serialized state machines.
//!
//! This module provides the building blocks for hosting a reducer in its own Tokio task
//! and talking to it from any number of concurrent producers.
//!
//! # Main Components
//!
//! - [`StateMachine`] - Trait that reducers implement to be hosted by an actor
//! - [`StateActor`] - Generic actor that owns the machine and publishes snapshots
//! - [`StateClient`] - Type-safe, cloneable handle for dispatching commands
//! - [`MachineClient`] - Default read/observe methods for domain client wrappers
//! - [`FrameworkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning full actors.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod error;
pub mod machine;
pub mod message;
pub mod mock;

pub use actor::StateActor;
pub use client::StateClient;
pub use client_trait::MachineClient;
pub use error::FrameworkError;
pub use machine::{StateMachine, Transition};
pub use message::{Committed, Observer, Response, StateRequest, SubscriptionId};
