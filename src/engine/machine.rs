//! # Allocation Engine
//!
//! [`GameEngine`] is the [`StateMachine`] behind the game actor. It owns the current
//! [`GameState`] snapshot plus the private [`EngineContext`], and turns each
//! [`GameAction`] into a new snapshot.
//!
//! ## Modes
//!
//! | Mode | Meaning | Accepted |
//! |------|---------|----------|
//! | Idle | no process selected | select, discard, tick, init |
//! | Collecting | one process selected | everything |
//! | Won | every process completed | init only |
//!
//! Ineligible actions are absorbed as no-ops ([`Transition::unchanged`]), so concurrent
//! producers racing on a stale view of the board can never corrupt it.

use crate::config::GameConfig;
use crate::engine::actions::{GameAction, GameEvent};
use crate::engine::catalog;
use crate::engine::context::EngineContext;
use crate::engine::error::GameError;
use crate::engine::generator;
use crate::engine::level::LevelRules;
use crate::engine::pool::PoolManager;
use crate::engine::score;
use crate::framework::{StateMachine, Transition};
use crate::model::{GameState, InstanceId, ProcessId, Upgrades};
use crate::services::{FeedbackEvent, GameServices};
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

type Outcome = Result<Transition<GameEvent>, GameError>;

pub struct GameEngine {
    config: GameConfig,
    pool: PoolManager,
    state: Arc<GameState>,
    ctx: EngineContext,
}

impl GameEngine {
    /// Engine with no level loaded. Ticks are ignored until `InitializeLevel`.
    ///
    /// Fails with [`GameError::Config`] when `config` does not validate.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        debug!(seed, "Engine seeded");
        Ok(Self {
            pool: PoolManager::new(config.max_resources),
            ctx: EngineContext::new(seed, config.spawn_interval()),
            state: Arc::new(GameState::empty()),
            config,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    fn penalties_apply(&self) -> bool {
        self.ctx
            .rules
            .map(|rules| rules.applies_penalties())
            .unwrap_or(false)
    }

    fn commit(&mut self, next: GameState, events: Vec<GameEvent>) -> Outcome {
        self.state = Arc::new(next);
        Ok(Transition::committed(events))
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn initialize_level(&mut self, level: u32, upgrades: Upgrades) -> Outcome {
        let rules = LevelRules::for_level(level)?;
        let kinds = catalog::for_level(&rules);
        let processes = generator::generate(
            &rules,
            &kinds,
            self.config.generation_limits(),
            &mut self.ctx.rng,
        );
        let spawn_interval = self.config.spawn_interval_with(&upgrades);
        self.ctx.reset_for_level(rules, spawn_interval);

        info!(
            level,
            processes = processes.len(),
            spawn_interval_ms = spawn_interval.as_millis() as u64,
            "Level initialized"
        );
        self.commit(GameState::fresh(level, processes, kinds), Vec::new())
    }

    fn select_process(&mut self, id: ProcessId) -> Outcome {
        let current = &self.state;
        let eligible = !current.is_game_won
            && current.current_process != Some(id)
            && current.process(id).is_some_and(|p| !p.is_completed);
        if !eligible {
            debug!(%id, "Select ignored");
            return Ok(Transition::unchanged());
        }

        let mut next = GameState::clone(current);
        let held = std::mem::take(&mut next.collected_resources);
        if !held.is_empty() && self.penalties_apply() {
            next.score = score::apply(next.score, score::SWITCH_PENALTY);
        }
        let returned = self.pool.return_to_pool(next.resource_instances.len(), held);
        let returned_count = returned.len();
        next.resource_instances.extend(returned);
        next.current_process = Some(id);

        info!(%id, returned = returned_count, score = next.score, "Process selected");
        self.commit(next, Vec::new())
    }

    fn collect(&mut self, id: InstanceId) -> Outcome {
        let current = &self.state;
        let Some(process) = current.current().filter(|p| !p.is_completed) else {
            debug!(%id, "Collect ignored: no process selected");
            return Ok(Transition::unchanged());
        };
        let Some(instance) = current.pool_instance(id) else {
            debug!(%id, "Collect ignored: not in pool");
            return Ok(Transition::unchanged());
        };
        if !process.requires(instance.kind_id())
            || current.is_collected(id)
            || !instance.is_available_at(current.time_elapsed)
        {
            debug!(%id, kind = %instance.kind_id(), "Collect ignored: not eligible");
            return Ok(Transition::unchanged());
        }

        let (process, instance) = (process.clone(), instance.clone());
        let mut next = GameState::clone(current);
        next.resource_instances.retain(|i| i.instance_id != id);
        next.collected_resources.push(instance);

        if !process.is_satisfied_by(&next.collected_resources) {
            debug!(%id, process_id = %process.id, held = next.collected_resources.len(), "Collected");
            return self.commit(next, Vec::new());
        }

        // Completion: every held instance goes back to the pool, space permitting.
        let held = std::mem::take(&mut next.collected_resources);
        let returned = self.pool.return_to_pool(next.resource_instances.len(), held);
        next.resource_instances.extend(returned);
        if let Some(slot) = next.processes.iter_mut().find(|p| p.id == process.id) {
            *slot = slot.completed();
        }
        next.current_process = None;
        next.score = score::apply(next.score, score::COMPLETION_BONUS);
        next.is_game_won = next.all_completed();

        info!(process_id = %process.id, score = next.score, "Process completed");
        let mut events = vec![GameEvent::ProcessCompleted {
            process_id: process.id,
            name: process.name.clone(),
            score: next.score,
        }];

        if next.is_game_won {
            self.ctx.active = false;
            let final_score = score::final_score(next.score, next.time_elapsed);
            info!(
                level = next.level,
                score = next.score,
                final_score,
                elapsed_ms = next.time_elapsed.as_millis() as u64,
                "Game won"
            );
            events.push(GameEvent::GameWon {
                level: next.level,
                score: next.score,
                final_score,
                time_elapsed: next.time_elapsed,
            });
        }

        self.commit(next, events)
    }

    fn discard(&mut self, id: InstanceId) -> Outcome {
        if self.state.is_game_won || self.state.pool_instance(id).is_none() {
            debug!(%id, "Discard ignored");
            return Ok(Transition::unchanged());
        }

        let mut next = GameState::clone(&self.state);
        next.resource_instances.retain(|i| i.instance_id != id);
        if self.penalties_apply() {
            next.score = score::apply(next.score, score::DISCARD_PENALTY);
        }

        info!(%id, score = next.score, "Discarded");
        self.commit(next, Vec::new())
    }

    fn tick(&mut self, now: Duration) -> Outcome {
        if !self.ctx.active || self.state.is_game_won || now < self.state.time_elapsed {
            return Ok(Transition::unchanged());
        }

        let mut next = GameState::clone(&self.state);
        next.time_elapsed = now;

        let mut events = Vec::new();
        // One spawn check per due tick, however long the gap since the last one.
        if self.ctx.spawn_due(now) {
            self.ctx.last_spawn_at = now;
            if let Some(instance) = self.pool.try_spawn(&next, &mut self.ctx, now) {
                info!(
                    id = %instance.instance_id,
                    kind = %instance.kind_id(),
                    pool = next.resource_instances.len() + 1,
                    "Resource spawned"
                );
                events.push(GameEvent::ResourceSpawned {
                    instance_id: instance.instance_id,
                    kind: instance.kind_id().clone(),
                });
                next.resource_instances.push(instance);
            }
        }

        if events.is_empty() && now == self.state.time_elapsed {
            return Ok(Transition::unchanged());
        }
        self.commit(next, events)
    }
}

#[async_trait]
impl StateMachine for GameEngine {
    type State = GameState;
    type Command = GameAction;
    type Event = GameEvent;
    type Context = GameServices;
    type Error = GameError;

    fn snapshot(&self) -> Arc<GameState> {
        self.state.clone()
    }

    fn apply(&mut self, action: GameAction) -> Outcome {
        match action {
            GameAction::SelectProcess(id) => self.select_process(id),
            GameAction::Collect(id) => self.collect(id),
            GameAction::Discard(id) => self.discard(id),
            GameAction::Tick(now) => self.tick(now),
            GameAction::InitializeLevel { level, upgrades } => {
                self.initialize_level(level, upgrades)
            }
        }
    }

    async fn on_commit(&self, events: &[GameEvent], services: &GameServices) {
        for event in events {
            match event {
                GameEvent::ResourceSpawned { .. } => {}
                GameEvent::ProcessCompleted {
                    process_id, name, ..
                } => {
                    services.feedback.notify(FeedbackEvent::ProcessCompleted {
                        process_id: *process_id,
                        name: name.clone(),
                    });
                }
                GameEvent::GameWon {
                    level, final_score, ..
                } => {
                    services.feedback.notify(FeedbackEvent::GameWon {
                        level: *level,
                        final_score: *final_score,
                    });
                    services.record_win(*level, *final_score);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::engine::catalog::{CPU, MEMORY};
    use crate::model::{KindId, Mode};

    fn engine(level: u32) -> GameEngine {
        let config = GameConfig {
            seed: Some(11),
            ..GameConfig::default()
        };
        let mut engine = GameEngine::new(config).unwrap();
        engine
            .apply(GameAction::InitializeLevel {
                level,
                upgrades: Upgrades::default(),
            })
            .unwrap();
        engine
    }

    fn run(engine: &mut GameEngine, action: GameAction) -> Transition<GameEvent> {
        let transition = engine.apply(action).unwrap();
        engine.state().check_invariants(engine.capacity()).unwrap();
        transition
    }

    fn secs(s: u64) -> GameAction {
        GameAction::Tick(Duration::from_secs(s))
    }

    fn pool_id(engine: &GameEngine, kind: &str) -> InstanceId {
        engine
            .state()
            .resource_instances
            .iter()
            .find(|i| i.kind_id() == &KindId::from(kind))
            .map(|i| i.instance_id)
            .unwrap()
    }

    fn pool_ids(engine: &GameEngine) -> Vec<InstanceId> {
        engine
            .state()
            .resource_instances
            .iter()
            .map(|i| i.instance_id)
            .collect()
    }

    /// CPU at 2s, Memory at 4s.
    fn spawn_cpu_and_memory(engine: &mut GameEngine) -> (InstanceId, InstanceId) {
        run(engine, secs(2));
        run(engine, secs(4));
        (pool_id(engine, CPU), pool_id(engine, MEMORY))
    }

    #[test]
    fn test_level_one_scenario_completes_process_a() {
        let mut engine = engine(1);
        let (cpu, memory) = spawn_cpu_and_memory(&mut engine);

        run(&mut engine, GameAction::SelectProcess(ProcessId(1)));
        assert_eq!(engine.state().mode(), Mode::Collecting(ProcessId(1)));

        run(&mut engine, GameAction::Collect(cpu));
        assert_eq!(engine.state().collected_resources.len(), 1);
        assert!(engine.state().pool_instance(cpu).is_none());

        let transition = run(&mut engine, GameAction::Collect(memory));
        let state = engine.state();
        assert_eq!(state.score, 100);
        assert_eq!(state.mode(), Mode::Idle);
        assert!(state.process(ProcessId(1)).unwrap().is_completed);
        assert!(state.collected_resources.is_empty());
        // Both held instances went back to the pool, in collection order.
        assert_eq!(pool_ids(&engine), vec![cpu, memory]);
        assert!(matches!(
            transition.events.as_slice(),
            [GameEvent::ProcessCompleted { process_id: ProcessId(1), score: 100, .. }]
        ));
    }

    #[test]
    fn test_switch_penalty_returns_held_instance() {
        let mut engine = engine(1);
        let (cpu, memory) = spawn_cpu_and_memory(&mut engine);
        run(&mut engine, GameAction::SelectProcess(ProcessId(1)));
        run(&mut engine, GameAction::Collect(cpu));
        run(&mut engine, GameAction::Collect(memory));
        assert_eq!(engine.state().score, 100);

        run(&mut engine, GameAction::SelectProcess(ProcessId(2)));
        run(&mut engine, GameAction::Collect(memory));
        assert!(engine.state().pool_instance(memory).is_none());

        run(&mut engine, GameAction::SelectProcess(ProcessId(3)));
        let state = engine.state();
        assert_eq!(state.score, 90);
        assert!(state.pool_instance(memory).is_some());
        assert!(state.collected_resources.is_empty());
        assert_eq!(state.current_process, Some(ProcessId(3)));
    }

    #[test]
    fn test_switch_without_holding_is_free() {
        let mut engine = engine(1);
        run(&mut engine, GameAction::SelectProcess(ProcessId(1)));
        run(&mut engine, GameAction::SelectProcess(ProcessId(2)));
        assert_eq!(engine.state().score, 0);
        assert_eq!(engine.state().current_process, Some(ProcessId(2)));
    }

    #[test]
    fn test_reselecting_current_process_is_noop() {
        let mut engine = engine(1);
        let (cpu, _) = spawn_cpu_and_memory(&mut engine);
        run(&mut engine, GameAction::SelectProcess(ProcessId(1)));
        run(&mut engine, GameAction::Collect(cpu));

        let transition = run(&mut engine, GameAction::SelectProcess(ProcessId(1)));
        assert!(!transition.changed);
        assert_eq!(engine.state().collected_resources.len(), 1);
    }

    #[test]
    fn test_selecting_completed_process_is_noop() {
        let mut engine = engine(1);
        let (cpu, memory) = spawn_cpu_and_memory(&mut engine);
        run(&mut engine, GameAction::SelectProcess(ProcessId(1)));
        run(&mut engine, GameAction::Collect(cpu));
        run(&mut engine, GameAction::Collect(memory));

        let before = engine.snapshot();
        let transition = run(&mut engine, GameAction::SelectProcess(ProcessId(1)));
        assert!(!transition.changed);
        assert!(Arc::ptr_eq(&before, &engine.snapshot()));
    }

    #[test]
    fn test_collecting_unrequired_kind_is_noop() {
        let mut engine = engine(1);
        let (cpu, _) = spawn_cpu_and_memory(&mut engine);
        // Process B needs Memory, Disk, Network.
        run(&mut engine, GameAction::SelectProcess(ProcessId(2)));

        let transition = run(&mut engine, GameAction::Collect(cpu));
        assert!(!transition.changed);
        assert!(engine.state().pool_instance(cpu).is_some());
    }

    #[test]
    fn test_collect_without_selection_is_noop() {
        let mut engine = engine(1);
        let (cpu, _) = spawn_cpu_and_memory(&mut engine);
        assert!(!run(&mut engine, GameAction::Collect(cpu)).changed);
        assert!(!run(&mut engine, GameAction::Collect(InstanceId(999))).changed);
    }

    #[test]
    fn test_discard_not_collected_applies_penalty() {
        let mut engine = engine(1);
        let (cpu, memory) = spawn_cpu_and_memory(&mut engine);
        run(&mut engine, GameAction::SelectProcess(ProcessId(1)));
        run(&mut engine, GameAction::Collect(cpu));
        run(&mut engine, GameAction::Collect(memory));
        assert_eq!(engine.state().score, 100);

        run(&mut engine, GameAction::Discard(cpu));
        assert!(engine.state().pool_instance(cpu).is_none());
        assert_eq!(engine.state().score, 90);

        assert!(!run(&mut engine, GameAction::Discard(cpu)).changed);
        assert_eq!(engine.state().score, 90);
    }

    #[test]
    fn test_discard_clamps_score_at_zero() {
        let mut engine = engine(1);
        run(&mut engine, secs(2));
        let cpu = pool_id(&engine, CPU);
        run(&mut engine, GameAction::Discard(cpu));
        assert_eq!(engine.state().score, 0);
    }

    #[test]
    fn test_tick_spawns_once_per_interval() {
        let mut engine = engine(1);
        assert!(run(&mut engine, secs(1)).events.is_empty());
        assert_eq!(engine.state().resource_instances.len(), 0);

        let spawned = run(&mut engine, secs(2));
        assert!(matches!(spawned.events.as_slice(), [GameEvent::ResourceSpawned { .. }]));

        run(&mut engine, secs(3));
        assert_eq!(engine.state().resource_instances.len(), 1);

        // A long gap yields a single spawn check, not a burst.
        run(&mut engine, secs(60));
        assert_eq!(engine.state().resource_instances.len(), 2);
        assert_eq!(engine.state().time_elapsed, Duration::from_secs(60));
    }

    #[test]
    fn test_backwards_or_repeated_tick_is_noop() {
        let mut engine = engine(1);
        run(&mut engine, secs(3));
        assert!(!run(&mut engine, secs(1)).changed);
        assert!(!run(&mut engine, secs(3)).changed);
        assert_eq!(engine.state().time_elapsed, Duration::from_secs(3));
    }

    #[test]
    fn test_tick_before_any_level_is_noop() {
        let mut engine = GameEngine::new(GameConfig::default()).unwrap();
        assert!(!engine.apply(secs(5)).unwrap().changed);
        assert_eq!(engine.state().level, 0);
    }

    #[test]
    fn test_full_pool_stops_spawning() {
        let mut engine = engine(2);
        for s in 1..=20 {
            run(&mut engine, secs(s * 2));
        }
        assert_eq!(engine.state().resource_instances.len(), engine.capacity());
    }

    #[test]
    fn test_level_one_can_be_won() {
        let mut engine = engine(1);
        for s in 1..=5 {
            run(&mut engine, secs(s * 2));
        }
        assert_eq!(engine.state().resource_instances.len(), 5);

        let plan: [(u32, &[&str]); 3] = [
            (1, &["R1", "R2"]),
            (2, &["R2", "R3", "R4"]),
            (3, &["R1", "R4", "R5"]),
        ];
        let mut events = Vec::new();
        for (process, kinds) in plan {
            run(&mut engine, GameAction::SelectProcess(ProcessId(process)));
            for kind in kinds {
                let id = pool_id(&engine, kind);
                events.extend(run(&mut engine, GameAction::Collect(id)).events);
            }
        }

        let state = engine.state();
        assert!(state.is_game_won);
        assert_eq!(state.mode(), Mode::Won);
        assert_eq!(state.score, 300);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::GameWon { level: 1, score: 300, final_score: 297, .. }
        )));
    }

    #[test]
    fn test_won_is_terminal_until_reinitialized() {
        let mut engine = engine(1);
        for s in 1..=5 {
            run(&mut engine, secs(s * 2));
        }
        for (process, kinds) in [(1, vec!["R1", "R2"]), (2, vec!["R2", "R3", "R4"]), (3, vec!["R1", "R4", "R5"])] {
            run(&mut engine, GameAction::SelectProcess(ProcessId(process)));
            for kind in kinds {
                let id = pool_id(&engine, kind);
                run(&mut engine, GameAction::Collect(id));
            }
        }
        assert!(engine.state().is_game_won);

        let any = pool_ids(&engine)[0];
        assert!(!run(&mut engine, GameAction::Discard(any)).changed);
        assert!(!run(&mut engine, secs(100)).changed);
        assert!(!run(&mut engine, GameAction::SelectProcess(ProcessId(1))).changed);

        run(
            &mut engine,
            GameAction::InitializeLevel {
                level: 1,
                upgrades: Upgrades::default(),
            },
        );
        assert!(!engine.state().is_game_won);
        assert!(engine.state().resource_instances.is_empty());
        assert!(engine.context().active);
    }

    #[test]
    fn test_unknown_level_leaves_state_untouched() {
        let mut engine = engine(1);
        run(&mut engine, secs(2));
        let before = engine.snapshot();

        let result = engine.apply(GameAction::InitializeLevel {
            level: 9,
            upgrades: Upgrades::default(),
        });
        assert!(matches!(result, Err(GameError::UnknownLevel(9))));
        assert!(Arc::ptr_eq(&before, &engine.snapshot()));
    }

    #[test]
    fn test_upgrades_shorten_spawn_interval() {
        let mut engine = engine(1);
        run(
            &mut engine,
            GameAction::InitializeLevel {
                level: 1,
                upgrades: Upgrades {
                    spawn_interval_reduction: Duration::from_secs(1),
                },
            },
        );
        run(&mut engine, secs(1));
        assert_eq!(engine.state().resource_instances.len(), 1);
    }

    #[test]
    fn test_instance_ids_unique_across_levels() {
        let mut engine = engine(1);
        run(&mut engine, secs(2));
        let first = pool_ids(&engine)[0];

        run(
            &mut engine,
            GameAction::InitializeLevel {
                level: 1,
                upgrades: Upgrades::default(),
            },
        );
        run(&mut engine, secs(2));
        assert_ne!(pool_ids(&engine)[0], first);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GameConfig {
            max_requirements: 1,
            ..GameConfig::default()
        };
        assert!(matches!(
            GameEngine::new(config),
            Err(GameError::Config(ConfigError::Invalid(_)))
        ));
    }
}
