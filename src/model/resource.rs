//! Resource kinds and the instances spawned from them.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

/// Stable identifier of a resource kind (e.g. `"R1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KindId(pub String);

impl From<&str> for KindId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for KindId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-safe identifier for spawned instances. Unique for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl From<u64> for InstanceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inst_{}", self.0)
    }
}

/// Earliest game-time offset at which a kind may spawn.
///
/// `Withheld` kinds are never picked by the randomized spawner; fixed levels still hand
/// them out through the round-robin cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    After(Duration),
    Withheld,
}

impl Availability {
    pub const IMMEDIATE: Availability = Availability::After(Duration::ZERO);

    pub fn is_reached_at(&self, elapsed: Duration) -> bool {
        match self {
            Availability::After(offset) => *offset <= elapsed,
            Availability::Withheld => false,
        }
    }
}

/// A category of collectible resource. Defined once per level and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceKind {
    pub id: KindId,
    pub name: String,
    /// Opaque `0xRRGGBB` tag; the core never interprets it.
    pub color_tag: u32,
    pub earliest_available_at: Availability,
}

impl ResourceKind {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        color_tag: u32,
        earliest_available_at: Availability,
    ) -> Self {
        Self {
            id: KindId(id.into()),
            name: name.into(),
            color_tag,
            earliest_available_at,
        }
    }

    /// Same kind, spawnable from the start of the level.
    pub fn immediately_available(&self) -> Self {
        Self {
            earliest_available_at: Availability::IMMEDIATE,
            ..self.clone()
        }
    }
}

/// One spawned occurrence of a kind, sitting in the pool or held by the current process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInstance {
    pub kind: ResourceKind,
    pub instance_id: InstanceId,
    pub spawn_time: Duration,
}

impl ResourceInstance {
    pub fn kind_id(&self) -> &KindId {
        &self.kind.id
    }

    pub fn is_available_at(&self, elapsed: Duration) -> bool {
        self.spawn_time <= elapsed
    }
}
