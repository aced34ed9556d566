//! # GameState
//!
//! The single authoritative snapshot of a level. A `GameState` is never mutated once
//! published: every transition builds a new value and the actor swaps the `Arc`.

use crate::model::process::{Process, ProcessId};
use crate::model::resource::{InstanceId, ResourceInstance, ResourceKind};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// What the player is currently doing, derived from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Collecting(ProcessId),
    Won,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    pub processes: Vec<Process>,
    pub available_resource_kinds: Vec<ResourceKind>,
    /// The pool: spawned instances nobody holds yet.
    pub resource_instances: Vec<ResourceInstance>,
    pub current_process: Option<ProcessId>,
    /// Instances held by `current_process`, in collection order.
    pub collected_resources: Vec<ResourceInstance>,
    pub score: u32,
    pub time_elapsed: Duration,
    pub is_game_won: bool,
    pub level: u32,
}

impl GameState {
    /// The state before any level has been initialized.
    pub fn empty() -> Self {
        Self::fresh(0, Vec::new(), Vec::new())
    }

    /// Start-of-level state: nothing spawned, nothing held, clock at zero.
    pub fn fresh(level: u32, processes: Vec<Process>, kinds: Vec<ResourceKind>) -> Self {
        Self {
            processes,
            available_resource_kinds: kinds,
            resource_instances: Vec::new(),
            current_process: None,
            collected_resources: Vec::new(),
            score: 0,
            time_elapsed: Duration::ZERO,
            is_game_won: false,
            level,
        }
    }

    pub fn process(&self, id: ProcessId) -> Option<&Process> {
        self.processes.iter().find(|p| p.id == id)
    }

    /// The selected process, if any.
    pub fn current(&self) -> Option<&Process> {
        self.current_process.and_then(|id| self.process(id))
    }

    pub fn pool_instance(&self, id: InstanceId) -> Option<&ResourceInstance> {
        self.resource_instances.iter().find(|i| i.instance_id == id)
    }

    pub fn is_collected(&self, id: InstanceId) -> bool {
        self.collected_resources.iter().any(|i| i.instance_id == id)
    }

    pub fn all_completed(&self) -> bool {
        !self.processes.is_empty() && self.processes.iter().all(|p| p.is_completed)
    }

    pub fn mode(&self) -> Mode {
        if self.is_game_won {
            Mode::Won
        } else {
            match self.current_process {
                Some(id) => Mode::Collecting(id),
                None => Mode::Idle,
            }
        }
    }

    /// Check every structural rule a published snapshot must satisfy.
    pub fn check_invariants(&self, capacity: usize) -> Result<(), InvariantViolation> {
        if self.resource_instances.len() > capacity {
            return Err(InvariantViolation::PoolOverflow {
                len: self.resource_instances.len(),
                capacity,
            });
        }

        let mut seen = HashSet::new();
        for instance in self.resource_instances.iter().chain(&self.collected_resources) {
            if !seen.insert(instance.instance_id) {
                return Err(InvariantViolation::DuplicateInstance(instance.instance_id));
            }
        }

        match self.current() {
            Some(process) => {
                if process.is_completed {
                    return Err(InvariantViolation::CompletedProcessSelected(process.id));
                }
                if let Some(stray) = self
                    .collected_resources
                    .iter()
                    .find(|i| !process.requires(i.kind_id()))
                {
                    return Err(InvariantViolation::UnrequiredCollected(stray.instance_id));
                }
            }
            None => {
                if let Some(id) = self.current_process {
                    return Err(InvariantViolation::UnknownCurrentProcess(id));
                }
                if !self.collected_resources.is_empty() {
                    return Err(InvariantViolation::CollectedWithoutProcess(
                        self.collected_resources.len(),
                    ));
                }
            }
        }

        if self.is_game_won != self.all_completed() {
            return Err(InvariantViolation::WinFlagMismatch {
                is_game_won: self.is_game_won,
            });
        }

        Ok(())
    }
}

/// A broken structural rule, reported by [`GameState::check_invariants`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("Pool holds {len} instances, capacity is {capacity}")]
    PoolOverflow { len: usize, capacity: usize },

    #[error("Instance {0} appears more than once")]
    DuplicateInstance(InstanceId),

    #[error("Completed process {0} is still selected")]
    CompletedProcessSelected(ProcessId),

    #[error("Current process {0} does not exist")]
    UnknownCurrentProcess(ProcessId),

    #[error("Collected instance {0} is not required by the current process")]
    UnrequiredCollected(InstanceId),

    #[error("{0} collected instances but no current process")]
    CollectedWithoutProcess(usize),

    #[error("is_game_won is {is_game_won} but process completion disagrees")]
    WinFlagMismatch { is_game_won: bool },
}
