//! # Generic Messages
//!
//! The message types exchanged between a [`StateClient`](crate::framework::StateClient)
//! and its [`StateActor`](crate::framework::StateActor).

use crate::framework::error::FrameworkError;
use crate::framework::machine::StateMachine;
use std::fmt::{self, Display};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Callback invoked with every committed snapshot.
pub type Observer<S> = Box<dyn Fn(&Arc<S>) + Send + Sync>;

/// Handle returned by `subscribe`, used to unregister an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub_{}", self.0)
    }
}

/// Reply to a dispatched command: the snapshot current *after* the command, and whether
/// the command changed anything.
#[derive(Debug)]
pub struct Committed<S> {
    pub snapshot: Arc<S>,
    pub changed: bool,
}

/// Internal message type sent to the actor.
///
/// - **Dispatch**: run one command through the machine.
/// - **Snapshot**: read the current state without changing it.
/// - **Subscribe / Unsubscribe**: manage commit observers.
pub enum StateRequest<M: StateMachine> {
    Dispatch {
        command: M::Command,
        respond_to: Response<Committed<M::State>>,
    },
    Snapshot {
        respond_to: Response<Arc<M::State>>,
    },
    Subscribe {
        observer: Observer<M::State>,
        respond_to: Response<SubscriptionId>,
    },
    Unsubscribe {
        id: SubscriptionId,
        respond_to: Response<bool>,
    },
}

impl<M: StateMachine> fmt::Debug for StateRequest<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateRequest::Dispatch { command, .. } => {
                f.debug_struct("Dispatch").field("command", command).finish()
            }
            StateRequest::Snapshot { .. } => f.write_str("Snapshot"),
            StateRequest::Subscribe { .. } => f.write_str("Subscribe"),
            StateRequest::Unsubscribe { id, .. } => {
                f.debug_struct("Unsubscribe").field("id", id).finish()
            }
        }
    }
}
