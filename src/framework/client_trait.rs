//! # MachineClient Trait
//!
//! Provides a common interface for domain-specific clients, adding default `snapshot`,
//! `subscribe` and `unsubscribe` methods built on top of a generic `StateClient`.

use crate::framework::{FrameworkError, Observer, StateClient, StateMachine, SubscriptionId};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for domain-specific clients to inherit the standard read and observe operations.
///
/// Implementors only provide access to the inner client and an error mapping; domain
/// commands stay as inherent methods on the wrapper.
#[async_trait]
pub trait MachineClient<M: StateMachine>: Send + Sync {
    /// The domain-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic StateClient.
    fn inner(&self) -> &StateClient<M>;

    /// Map framework errors to the domain error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch the current snapshot from the actor.
    #[tracing::instrument(skip(self))]
    async fn snapshot(&self) -> Result<Arc<M::State>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().snapshot().await.map_err(Self::map_error)
    }

    /// Register a callback for every committed snapshot.
    #[tracing::instrument(skip(self, observer))]
    async fn subscribe(&self, observer: Observer<M::State>) -> Result<SubscriptionId, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().subscribe(observer).await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self))]
    async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().unsubscribe(id).await.map_err(Self::map_error)
    }
}
