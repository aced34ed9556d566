//! # StateMachine Trait
//!
//! The `StateMachine` trait is the contract a reducer must satisfy to be driven by the
//! generic [`StateActor`](crate::framework::StateActor). A machine owns one authoritative
//! snapshot of its state, applies commands to it one at a time, and reports what happened
//! as a [`Transition`].
//!
//! # Architecture Note
//! The actor never touches the state itself. It hands each command to
//! [`StateMachine::apply`], reads the new snapshot back through
//! [`StateMachine::snapshot`], and publishes it. Because the actor processes its mailbox
//! sequentially, `apply` never runs concurrently with itself: the read, compute and
//! replace steps of one command cannot interleave with another's.
//!
//! # Side Effects
//! `apply` is synchronous and must not perform I/O. Anything that has to reach the
//! outside world (persistence, device feedback) is described by the returned events and
//! executed afterwards in [`StateMachine::on_commit`], with the injected `Context`.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Outcome of applying a single command.
///
/// `changed == false` means the command was absorbed as a no-op and the previous snapshot
/// is still current.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<E> {
    pub changed: bool,
    pub events: Vec<E>,
}

impl<E> Transition<E> {
    /// A command that left the state untouched.
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            events: Vec::new(),
        }
    }

    /// A command that replaced the snapshot, together with what it triggered.
    pub fn committed(events: Vec<E>) -> Self {
        Self {
            changed: true,
            events,
        }
    }
}

/// Trait that any reducer must implement to be hosted by a `StateActor`.
///
/// # Async & Context
/// Like the lifecycle hooks of a resource entity, `on_commit` is `#[async_trait]` and
/// receives a `Context` injected at `run()` time ("late binding" of collaborators).
#[async_trait]
pub trait StateMachine: Send + Sync + 'static {
    /// The immutable snapshot published after each committed transition.
    type State: Debug + Send + Sync + 'static;

    /// The inputs the machine understands.
    type Command: Send + Debug;

    /// Side effects produced by a transition, executed in `on_commit`.
    type Event: Send + Sync + Debug + Clone;

    /// Collaborators injected into the actor (use `()` for none).
    type Context: Send + Sync;

    /// Errors for commands the machine refuses outright.
    ///
    /// Gameplay-style machines usually absorb invalid commands as no-ops and reserve
    /// errors for misconfiguration.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The current snapshot. Cheap: clones an `Arc`.
    fn snapshot(&self) -> Arc<Self::State>;

    /// Apply one command, replacing the snapshot if anything changed.
    fn apply(&mut self, command: Self::Command) -> Result<Transition<Self::Event>, Self::Error>;

    /// Called after a transition has been committed and published, only when it
    /// produced events. Must not block the actor for long.
    async fn on_commit(&self, _events: &[Self::Event], _ctx: &Self::Context) {}
}
