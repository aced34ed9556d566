//! # Resource Pool Manager
//!
//! Capacity policy for the pool of spawned, uncollected instances.

use crate::engine::context::EngineContext;
use crate::engine::level::LevelKind;
use crate::model::{GameState, ResourceInstance};
use rand::seq::SliceRandom;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolManager {
    capacity: usize,
}

impl PoolManager {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn has_room(&self, pool_len: usize) -> bool {
        pool_len < self.capacity
    }

    /// The prefix of `instances` that fits beside `pool_len` existing instances.
    /// Whatever does not fit is dropped for good.
    pub fn return_to_pool(
        &self,
        pool_len: usize,
        instances: Vec<ResourceInstance>,
    ) -> Vec<ResourceInstance> {
        let remaining = self.capacity.saturating_sub(pool_len);
        if instances.len() > remaining {
            debug!(
                offered = instances.len(),
                remaining, "Pool full, dropping returned instances"
            );
        }
        instances.into_iter().take(remaining).collect()
    }

    /// Produce the next instance for `state`, or `None` if the pool is full or nothing is
    /// eligible. Advances the fixed-level cursor and the instance counter on success.
    pub fn try_spawn(
        &self,
        state: &GameState,
        ctx: &mut EngineContext,
        elapsed: Duration,
    ) -> Option<ResourceInstance> {
        if !self.has_room(state.resource_instances.len()) {
            return None;
        }
        let rules = ctx.rules?;

        let kind = match rules.kind {
            LevelKind::Fixed => {
                let kind = state.available_resource_kinds.get(ctx.spawn_cursor)?.clone();
                ctx.spawn_cursor += 1;
                kind
            }
            LevelKind::Randomized => {
                let eligible: Vec<_> = state
                    .available_resource_kinds
                    .iter()
                    .filter(|k| k.earliest_available_at.is_reached_at(elapsed))
                    .collect();
                (*eligible.choose(&mut ctx.rng)?).clone()
            }
        };

        Some(ResourceInstance {
            kind,
            instance_id: ctx.allocate_instance_id(),
            spawn_time: elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::catalog;
    use crate::engine::level::LevelRules;
    use crate::model::{Availability, InstanceId, ResourceKind};

    fn instance(id: u64) -> ResourceInstance {
        ResourceInstance {
            kind: ResourceKind::new("R1", "CPU", 0, Availability::IMMEDIATE),
            instance_id: InstanceId(id),
            spawn_time: Duration::ZERO,
        }
    }

    fn level(n: u32) -> (GameState, EngineContext) {
        let rules = LevelRules::for_level(n).unwrap();
        let state = GameState::fresh(n, Vec::new(), catalog::for_level(&rules));
        let mut ctx = EngineContext::new(3, Duration::from_secs(2));
        ctx.reset_for_level(rules, Duration::from_secs(2));
        (state, ctx)
    }

    #[test]
    fn test_return_to_pool_is_capacity_limited() {
        let pool = PoolManager::new(5);
        let returned = pool.return_to_pool(3, (1..=4).map(instance).collect());
        let ids: Vec<_> = returned.iter().map(|i| i.instance_id).collect();
        assert_eq!(ids, vec![InstanceId(1), InstanceId(2)]);

        assert!(pool.return_to_pool(5, vec![instance(9)]).is_empty());
        assert!(pool.return_to_pool(7, vec![instance(9)]).is_empty());
    }

    #[test]
    fn test_full_pool_does_not_spawn() {
        let pool = PoolManager::new(5);
        let (mut state, mut ctx) = level(1);
        state.resource_instances = (1..=5).map(instance).collect();

        assert!(pool.try_spawn(&state, &mut ctx, Duration::from_secs(2)).is_none());
        assert_eq!(ctx.spawn_cursor, 0);
    }

    #[test]
    fn test_fixed_round_robin_halts() {
        let pool = PoolManager::new(10);
        let (mut state, mut ctx) = level(1);

        let mut spawned = Vec::new();
        for step in 1..=7u64 {
            if let Some(inst) = pool.try_spawn(&state, &mut ctx, Duration::from_secs(step)) {
                spawned.push(inst.kind_id().0.clone());
                state.resource_instances.push(inst);
            }
        }
        assert_eq!(spawned, ["R1", "R2", "R3", "R4", "R5"]);
        assert_eq!(ctx.spawn_cursor, 5);
    }

    #[test]
    fn test_randomized_only_spawns_reached_kinds() {
        let pool = PoolManager::new(100);
        let (mut state, mut ctx) = level(2);
        state.available_resource_kinds[1].earliest_available_at = Availability::Withheld;

        for step in 0..50u64 {
            let inst = pool
                .try_spawn(&state, &mut ctx, Duration::from_secs(step))
                .unwrap();
            assert_ne!(inst.kind_id().0, "R2");
            assert_eq!(inst.spawn_time, Duration::from_secs(step));
            state.resource_instances.push(inst);
        }
    }
}
