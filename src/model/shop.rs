//! Purchasable upgrades and their effect on gameplay.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub cost: u32,
    /// How much faster resources spawn while this item is owned.
    pub spawn_interval_reduction: Duration,
}

pub const FASTER_RESOURCES_I: ItemId = ItemId(1);

/// Everything the shop sells.
pub fn catalog() -> Vec<ShopItem> {
    vec![ShopItem {
        id: FASTER_RESOURCES_I,
        name: "Faster Resources I".to_string(),
        description: "Resources are produced 1s faster".to_string(),
        cost: 500,
        spawn_interval_reduction: Duration::from_secs(1),
    }]
}

pub fn find(id: ItemId) -> Option<ShopItem> {
    catalog().into_iter().find(|item| item.id == id)
}

/// Combined effect of the owned items, applied when a level starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Upgrades {
    pub spawn_interval_reduction: Duration,
}

impl Upgrades {
    /// Unknown ids are ignored.
    pub fn from_items(owned: &[ItemId]) -> Self {
        let spawn_interval_reduction = owned
            .iter()
            .filter_map(|id| find(*id))
            .map(|item| item.spawn_interval_reduction)
            .sum();
        Self {
            spawn_interval_reduction,
        }
    }
}
