//! # Clock Driver
//!
//! The periodic producer of `Tick` actions. It runs in its own Tokio task, measures game
//! time (wall time minus paused spans) and sends it to the game actor once per period.
//! Whether a tick spawns a resource is decided by the engine, not here.
//!
//! Control requests (`pause`, `resume`, `reset`) go through a [`ClockHandle`] and are
//! acknowledged only once applied, so a caller that awaited `reset()` knows every later
//! tick is measured from the new origin.

use crate::clients::GameClient;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

// =============================================================================
// GameClock
// =============================================================================

/// Game time bookkeeping. Pure: every method takes the current instant.
#[derive(Debug, Clone, Copy)]
pub struct GameClock {
    origin: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl GameClock {
    pub fn new(now: Instant) -> Self {
        Self {
            origin: now,
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    /// Restart at zero, running.
    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }

    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(since) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(since);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Game time at `now`. Frozen while paused.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let end = self.paused_at.unwrap_or(now);
        end.saturating_duration_since(self.origin)
            .saturating_sub(self.paused_total)
    }
}

// =============================================================================
// Driver
// =============================================================================

#[derive(Debug)]
enum ClockCommand {
    Pause(oneshot::Sender<()>),
    Resume(oneshot::Sender<()>),
    Reset(oneshot::Sender<()>),
}

/// Returned when the driver task is no longer running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Clock driver stopped")]
pub struct ClockStopped;

/// Control handle for a running [`ClockDriver`]. Dropping every handle stops the driver.
#[derive(Debug, Clone)]
pub struct ClockHandle {
    sender: mpsc::Sender<ClockCommand>,
}

impl ClockHandle {
    async fn request(&self, make: fn(oneshot::Sender<()>) -> ClockCommand) -> Result<(), ClockStopped> {
        let (ack, done) = oneshot::channel();
        self.sender.send(make(ack)).await.map_err(|_| ClockStopped)?;
        done.await.map_err(|_| ClockStopped)
    }

    pub async fn pause(&self) -> Result<(), ClockStopped> {
        self.request(ClockCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<(), ClockStopped> {
        self.request(ClockCommand::Resume).await
    }

    /// Restart game time at zero. Called right before a level is initialized.
    pub async fn reset(&self) -> Result<(), ClockStopped> {
        self.request(ClockCommand::Reset).await
    }
}

pub struct ClockDriver {
    client: GameClient,
    period: Duration,
    commands: mpsc::Receiver<ClockCommand>,
    clock: GameClock,
}

impl ClockDriver {
    pub fn new(client: GameClient, period: Duration) -> (Self, ClockHandle) {
        let (sender, commands) = mpsc::channel(8);
        let driver = Self {
            client,
            period,
            commands,
            clock: GameClock::new(Instant::now()),
        };
        (driver, ClockHandle { sender })
    }

    /// Tick until every handle is dropped or the game actor closes.
    ///
    /// Missed periods are skipped rather than replayed, so a stalled runtime produces
    /// one late tick instead of a burst.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_ms = self.period.as_millis() as u64, "Clock started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.clock.is_paused() {
                        continue;
                    }
                    let now = self.clock.elapsed(Instant::now());
                    if let Err(e) = self.client.tick(now).await {
                        info!(error = %e, "Game actor closed, clock stopping");
                        break;
                    }
                }
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    let now = Instant::now();
                    let ack = match command {
                        ClockCommand::Pause(ack) => {
                            self.clock.pause(now);
                            ack
                        }
                        ClockCommand::Resume(ack) => {
                            self.clock.resume(now);
                            ack
                        }
                        ClockCommand::Reset(ack) => {
                            self.clock.reset(now);
                            interval.reset();
                            ack
                        }
                    };
                    debug!(paused = self.clock.is_paused(), "Clock control applied");
                    let _ = ack.send(());
                }
            }
        }

        info!("Clock stopped");
    }
}
