use crate::clients::GameClient;
use crate::config::GameConfig;
use crate::engine::{self, GameError};
use crate::model::{GameState, ItemId, Upgrades};
use crate::runtime::clock::{ClockDriver, ClockHandle};
use crate::services::GameServices;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The runtime orchestrator for one game session.
///
/// `GameSystem` is responsible for:
/// - **Lifecycle Management**: starting the game actor (and the clock driver) and
///   stopping them in order
/// - **Dependency Wiring**: injecting [`GameServices`] into the actor at `run()` time
/// - **Level Setup**: reading owned upgrades and resetting the clock before a level starts
///
/// # Example
///
/// ```ignore
/// let system = GameSystem::new(config, services)?;
/// system.start_level(1).await?;
///
/// let board = system.client.latest();
/// system.client.select_process(board.processes[0].id).await?;
///
/// system.shutdown().await?;
/// ```
pub struct GameSystem {
    /// Client for the game actor. Clone it freely; every clone is another producer.
    pub client: GameClient,

    services: GameServices,

    /// `None` when time is driven by hand (tests, scripted demos).
    clock: Option<ClockHandle>,

    /// Clock first, then the actor: the order they must stop in.
    handles: Vec<JoinHandle<()>>,
}

impl GameSystem {
    /// Starts the game actor and a real-time clock driver ticking every
    /// `config.tick_period()`.
    ///
    /// Nothing is spawned when `config` does not validate.
    pub fn new(config: GameConfig, services: GameServices) -> Result<Self, GameError> {
        Self::build(config, services, true)
    }

    /// Starts the game actor only. Game time advances solely through `client.tick()`.
    pub fn with_manual_clock(config: GameConfig, services: GameServices) -> Result<Self, GameError> {
        Self::build(config, services, false)
    }

    fn build(config: GameConfig, services: GameServices, realtime: bool) -> Result<Self, GameError> {
        let tick_period = config.tick_period();

        // =====================================================================
        // 1. Game actor
        // =====================================================================
        let (actor, client) = engine::new(config)?;
        let actor_handle = tokio::spawn(actor.run(services.clone()));

        // =====================================================================
        // 2. Clock driver (holds its own client clone)
        // =====================================================================
        let mut handles = Vec::new();
        let clock = if realtime {
            let (driver, handle) = ClockDriver::new(client.clone(), tick_period);
            handles.push(tokio::spawn(driver.run()));
            Some(handle)
        } else {
            None
        };
        handles.push(actor_handle);

        info!(realtime, "Game system started");
        Ok(Self {
            client,
            services,
            clock,
            handles,
        })
    }

    pub fn services(&self) -> &GameServices {
        &self.services
    }

    /// Initialize `level` with the upgrades currently owned, restarting game time.
    pub async fn start_level(&self, level: u32) -> Result<Arc<GameState>, GameError> {
        let owned = self.services.store.active_items().await?;
        let upgrades = Upgrades::from_items(&owned);
        if let Some(clock) = &self.clock {
            clock.reset().await.map_err(clock_error)?;
        }
        info!(level, ?upgrades, "Starting level");
        self.client.init_level_with(level, upgrades).await
    }

    /// Buy a shop item with banked points. Takes effect from the next `start_level`.
    pub async fn purchase(&self, item: ItemId) -> Result<(), GameError> {
        self.services.store.purchase_item(item).await?;
        info!(%item, "Item purchased");
        Ok(())
    }

    pub async fn pause(&self) -> Result<(), GameError> {
        match &self.clock {
            Some(clock) => clock.pause().await.map_err(clock_error),
            None => Ok(()),
        }
    }

    pub async fn resume(&self) -> Result<(), GameError> {
        match &self.clock {
            Some(clock) => clock.resume().await.map_err(clock_error),
            None => Ok(()),
        }
    }

    /// Gracefully shuts down the session.
    ///
    /// 1. Drops the clock handle, which stops the driver and releases its client clone
    /// 2. Drops the system client, which closes the actor's channel
    /// 3. Waits for both tasks, then for any pending win checkpoint
    ///
    /// Clones of `client` held elsewhere keep the actor alive; drop them first.
    pub async fn shutdown(self) -> Result<(), GameError> {
        info!("Shutting down game system...");

        drop(self.clock);
        drop(self.client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Task failed: {:?}", e);
                return Err(GameError::ActorCommunication(format!("Task failed: {e}")));
            }
        }

        self.services.drain_checkpoints().await;
        info!("Game system shutdown complete.");
        Ok(())
    }
}

fn clock_error(e: crate::runtime::clock::ClockStopped) -> GameError {
    GameError::ActorCommunication(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::shop::FASTER_RESOURCES_I;
    use crate::services::{InMemoryStore, LogFeedback, ScoreStore};
    use std::time::Duration;

    fn services(store: Arc<InMemoryStore>) -> GameServices {
        GameServices::new(store, Arc::new(LogFeedback))
    }

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(5),
            ..GameConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_clock_spawns_resources() {
        let store = Arc::new(InMemoryStore::new());
        let system = GameSystem::new(config(), services(store)).unwrap();
        system.start_level(1).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5500)).await;

        let state = system.client.latest();
        assert_eq!(state.resource_instances.len(), 2);
        assert_eq!(state.time_elapsed, Duration::from_secs(5));

        system.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_game_time() {
        let store = Arc::new(InMemoryStore::new());
        let system = GameSystem::new(config(), services(store)).unwrap();
        system.start_level(1).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        system.pause().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(system.client.latest().time_elapsed, Duration::from_secs(1));
        assert!(system.client.latest().resource_instances.is_empty());

        system.resume().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        let state = system.client.latest();
        assert!(state.time_elapsed >= Duration::from_secs(2));
        assert!(state.time_elapsed < Duration::from_secs(5));

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_purchase_applies_on_next_level() {
        let store = Arc::new(InMemoryStore::new());
        store.add_points(600).await.unwrap();
        let system = GameSystem::with_manual_clock(config(), services(store)).unwrap();

        system.purchase(FASTER_RESOURCES_I).await.unwrap();
        assert_eq!(system.services().store.points().await.unwrap(), 100);

        system.start_level(1).await.unwrap();
        let state = system.client.tick(Duration::from_secs(1)).await.unwrap();
        assert_eq!(state.resource_instances.len(), 1);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_level_surfaces_error() {
        let store = Arc::new(InMemoryStore::new());
        let system = GameSystem::with_manual_clock(config(), services(store)).unwrap();
        assert!(matches!(
            system.start_level(3).await,
            Err(GameError::UnknownLevel(3))
        ));
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_config_spawns_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let config = GameConfig {
            tick_period_ms: 0,
            ..config()
        };
        assert!(matches!(
            GameSystem::new(config, services(store)),
            Err(GameError::Config(_))
        ));
    }
}
