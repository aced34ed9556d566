//! Engine-private counters that live beside the published state.

use crate::engine::level::LevelRules;
use crate::model::InstanceId;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Mutable bookkeeping the snapshot does not expose.
///
/// `next_instance_id` and `rng` survive level re-initialization; everything else is reset
/// by [`EngineContext::reset_for_level`].
#[derive(Debug, Clone)]
pub struct EngineContext {
    pub rules: Option<LevelRules>,
    /// Next catalog index for fixed levels. Never wraps.
    pub spawn_cursor: usize,
    pub last_spawn_at: Duration,
    /// False before the first level and after a win; ticks are ignored while inactive.
    pub active: bool,
    pub spawn_interval: Duration,
    pub rng: ChaCha8Rng,
    next_instance_id: u64,
}

impl EngineContext {
    pub fn new(seed: u64, spawn_interval: Duration) -> Self {
        Self {
            rules: None,
            spawn_cursor: 0,
            last_spawn_at: Duration::ZERO,
            active: false,
            spawn_interval,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_instance_id: 1,
        }
    }

    pub fn reset_for_level(&mut self, rules: LevelRules, spawn_interval: Duration) {
        self.rules = Some(rules);
        self.spawn_cursor = 0;
        self.last_spawn_at = Duration::ZERO;
        self.active = true;
        self.spawn_interval = spawn_interval;
    }

    pub fn allocate_instance_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next_instance_id);
        self.next_instance_id += 1;
        id
    }

    /// True when `now` is at least one spawn interval past the last spawn check.
    pub fn spawn_due(&self, now: Duration) -> bool {
        now.saturating_sub(self.last_spawn_at) >= self.spawn_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_ids_survive_reset() {
        let mut ctx = EngineContext::new(7, Duration::from_secs(2));
        assert_eq!(ctx.allocate_instance_id(), InstanceId(1));
        ctx.spawn_cursor = 3;

        ctx.reset_for_level(LevelRules::for_level(1).unwrap(), Duration::from_secs(1));
        assert_eq!(ctx.spawn_cursor, 0);
        assert!(ctx.active);
        assert_eq!(ctx.allocate_instance_id(), InstanceId(2));
    }

    #[test]
    fn test_first_spawn_due_after_one_interval() {
        let ctx = EngineContext::new(0, Duration::from_secs(2));
        assert!(!ctx.spawn_due(Duration::from_secs(1)));
        assert!(ctx.spawn_due(Duration::from_secs(2)));
    }
}
