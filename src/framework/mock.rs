//! # Mock Framework & Testing Guide
//!
//! Helpers for testing client wrappers without spawning a `StateActor`.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | Mock receiver | Real Actor |
//! |---------|---------------|------------|
//! | **Speed** | Instant | Fast (but involves tokio spawn) |
//! | **Determinism** | Fully deterministic | Subject to scheduler |
//! | **State** | Whatever the test replies | Real transitions |
//! | **Use Case** | Logic *around* the client | The machine itself or the full system |
//! | **Error Injection** | Reply with any `FrameworkError` | Requires a misconfigured machine |
//!
//! ## Pattern
//!
//! ```rust,ignore
//! let (client, mut receiver) = create_mock_client::<GameEngine>(10, initial);
//! let game = GameClient::new(client);
//!
//! let call = tokio::spawn(async move { game.collect(InstanceId(1)).await });
//! let (command, respond_to) = expect_dispatch(&mut receiver).await.unwrap();
//! assert!(matches!(command, GameAction::Collect(InstanceId(1))));
//! respond_to.send(Err(FrameworkError::ActorClosed)).unwrap();
//! ```

use crate::framework::client::StateClient;
use crate::framework::error::FrameworkError;
use crate::framework::machine::StateMachine;
use crate::framework::message::{Committed, StateRequest};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// The client sends messages to a channel the test controls (`receiver`). The test then
/// inspects each message and replies however it likes (success, failure, or dropping the
/// responder to simulate a crashed actor).
///
/// `initial` seeds the `watch` channel behind `StateClient::latest`. The sender half is
/// dropped, so `latest()` keeps returning `initial` for the whole test.
pub fn create_mock_client<M: StateMachine>(
    buffer_size: usize,
    initial: Arc<M::State>,
) -> (StateClient<M>, mpsc::Receiver<StateRequest<M>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (_publisher, latest) = watch::channel(initial);
    (StateClient::new(sender, latest), receiver)
}

/// Helper to verify that the next message is a Dispatch request
pub async fn expect_dispatch<M: StateMachine>(
    receiver: &mut mpsc::Receiver<StateRequest<M>>,
) -> Option<(
    M::Command,
    oneshot::Sender<Result<Committed<M::State>, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(StateRequest::Dispatch {
            command,
            respond_to,
        }) => Some((command, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Snapshot request
pub async fn expect_snapshot<M: StateMachine>(
    receiver: &mut mpsc::Receiver<StateRequest<M>>,
) -> Option<oneshot::Sender<Result<Arc<M::State>, FrameworkError>>> {
    match receiver.recv().await {
        Some(StateRequest::Snapshot { respond_to }) => Some(respond_to),
        _ => None,
    }
}
