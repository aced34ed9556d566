//! # Generic Client
//!
//! This module defines the generic client for communicating with a [`StateActor`](crate::framework::StateActor).

use crate::framework::error::FrameworkError;
use crate::framework::machine::StateMachine;
use crate::framework::message::{Committed, Observer, StateRequest, SubscriptionId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// ## StateClient
///
/// The `StateClient<M>` provides a type-safe, async API for interacting with a `StateActor<M>`.
/// Commands travel over a Tokio mpsc channel and results come back via oneshot channels.
///
/// * **Cloneable**: holds a sender and a `watch` receiver, so cloning is inexpensive and
///   every clone is an independent producer.
/// * **Lock-free reads**: [`StateClient::latest`] returns the last published snapshot without
///   a round trip to the actor.
pub struct StateClient<M: StateMachine> {
    sender: mpsc::Sender<StateRequest<M>>,
    latest: watch::Receiver<Arc<M::State>>,
}

// Manual impl: `M` itself need not be `Clone`.
impl<M: StateMachine> Clone for StateClient<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            latest: self.latest.clone(),
        }
    }
}

impl<M: StateMachine> StateClient<M> {
    pub fn new(sender: mpsc::Sender<StateRequest<M>>, latest: watch::Receiver<Arc<M::State>>) -> Self {
        Self { sender, latest }
    }

    /// Run one command through the machine and wait until it is committed.
    pub async fn dispatch(&self, command: M::Command) -> Result<Committed<M::State>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StateRequest::Dispatch {
                command,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Ask the actor for its current snapshot. Ordered after every command sent before it.
    pub async fn snapshot(&self) -> Result<Arc<M::State>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StateRequest::Snapshot { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn subscribe(&self, observer: Observer<M::State>) -> Result<SubscriptionId, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StateRequest::Subscribe {
                observer,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StateRequest::Unsubscribe { id, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<M::State> {
        self.latest.borrow().clone()
    }

    /// A fresh `watch` receiver, for consumers that want to await changes.
    pub fn watch(&self) -> watch::Receiver<Arc<M::State>> {
        self.latest.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
