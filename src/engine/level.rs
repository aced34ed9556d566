//! Per-level rule variation.

use crate::engine::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    /// Hardcoded processes, round-robin spawning that halts once the catalog is exhausted.
    Fixed,
    /// Generated processes, uniform random spawning without limit.
    Randomized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRules {
    pub level: u32,
    pub kind: LevelKind,
}

impl LevelRules {
    pub fn for_level(level: u32) -> Result<Self, GameError> {
        let kind = match level {
            1 => LevelKind::Fixed,
            2 => LevelKind::Randomized,
            other => return Err(GameError::UnknownLevel(other)),
        };
        Ok(Self { level, kind })
    }

    /// Switch and discard penalties only apply on the first two levels.
    pub fn applies_penalties(&self) -> bool {
        self.level <= 2
    }
}
