//! Runtime wiring: the session orchestrator, the clock driver and logging setup.

pub mod clock;
pub mod game_system;
pub mod tracing;

pub use clock::{ClockDriver, ClockHandle, ClockStopped, GameClock};
pub use game_system::GameSystem;
pub use self::tracing::setup_tracing;
