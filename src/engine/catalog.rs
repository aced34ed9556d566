//! The resource catalog shared by every level.

use crate::engine::level::{LevelKind, LevelRules};
use crate::model::{Availability, KindId, ResourceKind};

pub const CPU: &str = "R1";
pub const MEMORY: &str = "R2";
pub const DISK: &str = "R3";
pub const NETWORK: &str = "R4";
pub const PRINTER: &str = "R5";

/// The five standard kinds, in spawn order. Only CPU is open from the start; the rest
/// are withheld and reach the pool through the fixed round-robin.
pub fn standard() -> Vec<ResourceKind> {
    vec![
        ResourceKind::new(CPU, "CPU", 0xE57373, Availability::IMMEDIATE),
        ResourceKind::new(MEMORY, "Memory", 0x81C784, Availability::Withheld),
        ResourceKind::new(DISK, "Disk", 0x64B5F6, Availability::Withheld),
        ResourceKind::new(NETWORK, "Network", 0xFFB74D, Availability::Withheld),
        ResourceKind::new(PRINTER, "Printer", 0xBA68C8, Availability::Withheld),
    ]
}

/// Catalog as seen by a level: randomized levels open every kind immediately.
pub fn for_level(rules: &LevelRules) -> Vec<ResourceKind> {
    match rules.kind {
        LevelKind::Fixed => standard(),
        LevelKind::Randomized => standard()
            .iter()
            .map(ResourceKind::immediately_available)
            .collect(),
    }
}

pub fn kind_id(id: &str) -> KindId {
    KindId::from(id)
}
