//! # Generic Actor Server
//!
//! This module defines the `StateActor`, the component that hosts a
//! [`StateMachine`] and serializes every transition applied to it. It implements the
//! "Server" side of the Actor Model.

use crate::framework::client::StateClient;
use crate::framework::error::FrameworkError;
use crate::framework::machine::StateMachine;
use crate::framework::message::{Committed, Observer, StateRequest, SubscriptionId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// The generic actor that owns a state machine.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the machine and the receiver
/// end of the channel.
///
/// **Concurrency Model**:
/// Any number of producers (a periodic clock, UI handlers, scripted players) may hold a
/// clone of the [`StateClient`]. Their requests land in one mailbox and are processed
/// *sequentially* in [`StateActor::run`]. A transition is read, computed and committed
/// before the next request is even received, so no producer can build on a stale or
/// half-applied snapshot, and no `Mutex` is needed around the state.
///
/// # Publishing
///
/// After every transition that changed the state, the new snapshot is
/// 1. stored in a `watch` channel, so `StateClient::latest()` never needs a round trip;
/// 2. passed to every registered observer callback;
/// 3. returned to the caller that dispatched the command.
///
/// Publishing happens before the reply is sent, so a caller that receives its reply
/// always finds at least that snapshot in the `watch` channel.
pub struct StateActor<M: StateMachine> {
    receiver: mpsc::Receiver<StateRequest<M>>,
    machine: M,
    publisher: watch::Sender<Arc<M::State>>,
    observers: Vec<(SubscriptionId, Observer<M::State>)>,
    next_subscription: u64,
}

impl<M: StateMachine> StateActor<M> {
    /// Creates a new `StateActor` around `machine`, and its associated `StateClient`.
    ///
    /// # Arguments
    ///
    /// * `machine` - The reducer to host; its current snapshot seeds the `watch` channel.
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    pub fn new(machine: M, buffer_size: usize) -> (Self, StateClient<M>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (publisher, latest) = watch::channel(machine.snapshot());
        let actor = Self {
            receiver,
            machine,
            publisher,
            observers: Vec::new(),
            next_subscription: 1,
        };
        let client = StateClient::new(sender, latest);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    ///
    /// # Context Injection
    /// The `context` argument is handed to [`StateMachine::on_commit`]. Collaborators are
    /// therefore wired when the loop starts rather than when the machine is built.
    pub async fn run(mut self, context: M::Context) {
        let machine_type = std::any::type_name::<M>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(machine_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StateRequest::Dispatch {
                    command,
                    respond_to,
                } => {
                    debug!(machine_type, ?command, "Dispatch");
                    match self.machine.apply(command) {
                        Ok(transition) => {
                            let snapshot = self.machine.snapshot();
                            if transition.changed {
                                self.publish(&snapshot);
                                debug!(machine_type, events = transition.events.len(), "Committed");
                            } else {
                                debug!(machine_type, "No-op");
                            }
                            if !transition.events.is_empty() {
                                self.machine.on_commit(&transition.events, &context).await;
                            }
                            let _ = respond_to.send(Ok(Committed {
                                snapshot,
                                changed: transition.changed,
                            }));
                        }
                        Err(e) => {
                            warn!(machine_type, error = %e, "Dispatch rejected");
                            let _ = respond_to.send(Err(FrameworkError::Machine(Box::new(e))));
                        }
                    }
                }
                StateRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.machine.snapshot()));
                }
                StateRequest::Subscribe {
                    observer,
                    respond_to,
                } => {
                    let id = SubscriptionId(self.next_subscription);
                    self.next_subscription += 1;
                    self.observers.push((id, observer));
                    info!(machine_type, %id, observers = self.observers.len(), "Subscribed");
                    let _ = respond_to.send(Ok(id));
                }
                StateRequest::Unsubscribe { id, respond_to } => {
                    let before = self.observers.len();
                    self.observers.retain(|(existing, _)| *existing != id);
                    let removed = self.observers.len() != before;
                    debug!(machine_type, %id, removed, "Unsubscribe");
                    let _ = respond_to.send(Ok(removed));
                }
            }
        }

        info!(machine_type, observers = self.observers.len(), "Shutdown");
    }

    fn publish(&self, snapshot: &Arc<M::State>) {
        self.publisher.send_replace(snapshot.clone());
        for (_, observer) in &self.observers {
            observer(snapshot);
        }
    }
}
