//! Actions accepted by the engine and the events its transitions emit.

use crate::model::{InstanceId, KindId, ProcessId, Upgrades};
use std::time::Duration;

/// Every input the engine understands. Producers: the clock driver (`Tick`) and the
/// player (`SelectProcess`, `Collect`, `Discard`, `InitializeLevel`).
#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    SelectProcess(ProcessId),
    Collect(InstanceId),
    Discard(InstanceId),
    /// Game time since the level started, excluding paused spans.
    Tick(Duration),
    InitializeLevel { level: u32, upgrades: Upgrades },
}

/// Side effects of a committed transition, executed after the commit.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ResourceSpawned {
        instance_id: InstanceId,
        kind: KindId,
    },
    ProcessCompleted {
        process_id: ProcessId,
        name: String,
        score: u32,
    },
    GameWon {
        level: u32,
        score: u32,
        final_score: u32,
        time_elapsed: Duration,
    },
}
