use crate::engine::{GameAction, GameEngine, GameError};
use crate::framework::{FrameworkError, MachineClient, StateClient};
use crate::model::{GameState, InstanceId, ProcessId, Upgrades};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, instrument, trace};

/// Client for interacting with the game actor.
///
/// Every method sends one [`GameAction`] and resolves to the snapshot current *after*
/// the action was committed (or absorbed as a no-op). Clones are independent producers.
#[derive(Clone)]
pub struct GameClient {
    inner: StateClient<GameEngine>,
}

impl GameClient {
    pub fn new(inner: StateClient<GameEngine>) -> Self {
        Self { inner }
    }

    async fn send(&self, action: GameAction) -> Result<Arc<GameState>, GameError> {
        let committed = self.inner.dispatch(action).await.map_err(Self::map_error)?;
        debug!(changed = committed.changed, "Committed");
        Ok(committed.snapshot)
    }

    #[instrument(skip(self))]
    pub async fn select_process(&self, id: ProcessId) -> Result<Arc<GameState>, GameError> {
        self.send(GameAction::SelectProcess(id)).await
    }

    #[instrument(skip(self))]
    pub async fn collect(&self, id: InstanceId) -> Result<Arc<GameState>, GameError> {
        self.send(GameAction::Collect(id)).await
    }

    #[instrument(skip(self))]
    pub async fn discard(&self, id: InstanceId) -> Result<Arc<GameState>, GameError> {
        self.send(GameAction::Discard(id)).await
    }

    /// Advance game time to `now`. Called by the clock driver.
    #[instrument(skip(self), level = "trace")]
    pub async fn tick(&self, now: Duration) -> Result<Arc<GameState>, GameError> {
        trace!("Sending tick");
        self.send(GameAction::Tick(now)).await
    }

    /// Start (or restart) `level` with no upgrades.
    pub async fn init_level(&self, level: u32) -> Result<Arc<GameState>, GameError> {
        self.init_level_with(level, Upgrades::default()).await
    }

    #[instrument(skip(self))]
    pub async fn init_level_with(
        &self,
        level: u32,
        upgrades: Upgrades,
    ) -> Result<Arc<GameState>, GameError> {
        self.send(GameAction::InitializeLevel { level, upgrades }).await
    }

    /// Last published snapshot, without a round trip.
    pub fn latest(&self) -> Arc<GameState> {
        self.inner.latest()
    }

    pub fn watch(&self) -> watch::Receiver<Arc<GameState>> {
        self.inner.watch()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

#[async_trait]
impl MachineClient<GameEngine> for GameClient {
    type Error = GameError;

    fn inner(&self) -> &StateClient<GameEngine> {
        &self.inner
    }

    /// Engine errors travel boxed through the framework; unbox them so callers can match.
    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::Machine(source) => match source.downcast::<GameError>() {
                Ok(game) => *game,
                Err(other) => GameError::ActorCommunication(other.to_string()),
            },
            other => GameError::ActorCommunication(other.to_string()),
        }
    }
}
