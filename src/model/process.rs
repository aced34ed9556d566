//! Processes: goals that need a multiset of resource kinds.

use crate::model::resource::{KindId, ResourceInstance};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// Type-safe identifier for Processes, unique within a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "process_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    /// Ordered multiset: a kind listed twice must be collected twice.
    pub required_resources: Vec<KindId>,
    pub is_completed: bool,
}

impl Process {
    pub fn new(id: ProcessId, name: impl Into<String>, required_resources: Vec<KindId>) -> Self {
        Self {
            id,
            name: name.into(),
            required_resources,
            is_completed: false,
        }
    }

    pub fn requires(&self, kind: &KindId) -> bool {
        self.required_resources.contains(kind)
    }

    pub fn required_count(&self, kind: &KindId) -> usize {
        self.required_resources.iter().filter(|k| *k == kind).count()
    }

    /// True when `collected` covers every required kind at least as many times as listed.
    pub fn is_satisfied_by(&self, collected: &[ResourceInstance]) -> bool {
        let mut have: HashMap<&KindId, usize> = HashMap::new();
        for instance in collected {
            *have.entry(instance.kind_id()).or_default() += 1;
        }
        self.required_resources
            .iter()
            .all(|kind| have.get(kind).copied().unwrap_or(0) >= self.required_count(kind))
    }

    pub fn completed(&self) -> Self {
        Self {
            is_completed: true,
            ..self.clone()
        }
    }
}
