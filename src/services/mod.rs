//! Collaborators injected into the game actor.
//!
//! The engine never performs I/O inside a transition. Side effects reach these services
//! through [`GameServices`], handed to the actor as its `run()` context.

pub mod feedback;
pub mod store;

pub use feedback::{Feedback, FeedbackEvent, LogFeedback};
pub use store::{InMemoryStore, JsonFileStore, ScoreStore, StoreError, StoreRecord};

use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Context for [`GameEngine`](crate::engine::GameEngine): the store and the feedback sink,
/// plus the persistence tasks spawned at win checkpoints.
#[derive(Clone)]
pub struct GameServices {
    pub store: Arc<dyn ScoreStore>,
    pub feedback: Arc<dyn Feedback>,
    checkpoints: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl GameServices {
    pub fn new(store: Arc<dyn ScoreStore>, feedback: Arc<dyn Feedback>) -> Self {
        Self {
            store,
            feedback,
            checkpoints: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Bank the final score and update the level's high score, off the actor task.
    /// Failures are logged; gameplay state is never rolled back.
    pub fn record_win(&self, level: u32, final_score: u32) {
        let store = self.store.clone();
        let handle = tokio::spawn(async move {
            match persist_win(store.as_ref(), level, final_score).await {
                Ok(new_high) => info!(level, final_score, new_high, "Win recorded"),
                Err(e) => warn!(level, final_score, error = %e, "Failed to record win"),
            }
        });
        let mut checkpoints = self
            .checkpoints
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        checkpoints.retain(|h| !h.is_finished());
        checkpoints.push(handle);
    }

    /// Wait for every persistence task spawned so far.
    pub async fn drain_checkpoints(&self) {
        let handles = std::mem::take(
            &mut *self
                .checkpoints
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Checkpoint task failed");
            }
        }
    }
}

/// Returns whether `final_score` became the new high score.
async fn persist_win(
    store: &dyn ScoreStore,
    level: u32,
    final_score: u32,
) -> Result<bool, StoreError> {
    store.add_points(final_score).await?;
    let best = store.high_score(level).await?;
    if final_score > best {
        store.set_high_score(level, final_score).await?;
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_win_banks_points_and_high_score() {
        let store = Arc::new(InMemoryStore::new());
        let services = GameServices::new(store.clone(), Arc::new(LogFeedback));

        services.record_win(1, 250);
        services.drain_checkpoints().await;
        assert_eq!(store.points().await.unwrap(), 250);
        assert_eq!(store.high_score(1).await.unwrap(), 250);

        // A lower score still banks points but keeps the high score.
        services.record_win(1, 100);
        services.drain_checkpoints().await;
        assert_eq!(store.points().await.unwrap(), 350);
        assert_eq!(store.high_score(1).await.unwrap(), 250);
    }

    fn pending(services: &GameServices) -> Vec<bool> {
        services
            .checkpoints
            .lock()
            .unwrap()
            .iter()
            .map(|h| h.is_finished())
            .collect()
    }

    #[tokio::test]
    async fn test_finished_checkpoints_are_pruned() {
        let store = Arc::new(InMemoryStore::new());
        let services = GameServices::new(store.clone(), Arc::new(LogFeedback));

        for round in 1..=5u32 {
            services.record_win(1, round * 10);
            while pending(&services).contains(&false) {
                tokio::task::yield_now().await;
            }
        }
        // Only the latest handle is still tracked.
        assert_eq!(pending(&services), vec![true]);

        services.drain_checkpoints().await;
        assert!(pending(&services).is_empty());
        assert_eq!(store.points().await.unwrap(), 150);
        assert_eq!(store.high_score(1).await.unwrap(), 50);
    }

}
