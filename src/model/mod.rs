//! Domain data: resources, processes, the game snapshot and the shop.
//!
//! Everything here is plain data. Transitions live in [`crate::engine`].

pub mod process;
pub mod resource;
pub mod shop;
pub mod state;

pub use process::{Process, ProcessId};
pub use resource::{Availability, InstanceId, KindId, ResourceInstance, ResourceKind};
pub use shop::{ItemId, ShopItem, Upgrades};
pub use state::{GameState, InvariantViolation, Mode};
