//! # Process Generator
//!
//! Builds the processes of a level. The output depends only on the level rules, the
//! catalog and the random source, so a seeded RNG reproduces a level exactly.

use crate::config::GenerationLimits;
use crate::engine::catalog::{self, CPU, DISK, MEMORY, NETWORK, PRINTER};
use crate::engine::level::{LevelKind, LevelRules};
use crate::model::{KindId, Process, ProcessId, ResourceKind};
use rand::seq::SliceRandom;
use rand::Rng;

pub fn generate<R: Rng>(
    rules: &LevelRules,
    kinds: &[ResourceKind],
    limits: GenerationLimits,
    rng: &mut R,
) -> Vec<Process> {
    match rules.kind {
        LevelKind::Fixed => fixed_processes(),
        LevelKind::Randomized => randomized_processes(kinds, limits, rng),
    }
}

fn fixed_processes() -> Vec<Process> {
    let ids = |list: &[&str]| -> Vec<KindId> { list.iter().map(|id| catalog::kind_id(id)).collect() };
    vec![
        Process::new(ProcessId(1), process_name(1), ids(&[CPU, MEMORY])),
        Process::new(ProcessId(2), process_name(2), ids(&[MEMORY, DISK, NETWORK])),
        Process::new(ProcessId(3), process_name(3), ids(&[CPU, NETWORK, PRINTER])),
    ]
}

fn randomized_processes<R: Rng>(
    kinds: &[ResourceKind],
    limits: GenerationLimits,
    rng: &mut R,
) -> Vec<Process> {
    (1..=limits.process_slots as u32)
        .map(|slot| {
            let draws = rng.gen_range(2..=limits.max_requirements);
            let mut requirements: Vec<KindId> = Vec::with_capacity(draws);
            for _ in 0..draws {
                let Some(kind) = kinds.choose(rng) else {
                    break;
                };
                // Over the duplicate limit: the draw is dropped, not retried.
                let count = requirements.iter().filter(|k| **k == kind.id).count();
                if count < limits.max_duplicates {
                    requirements.push(kind.id.clone());
                }
            }
            Process::new(ProcessId(slot), process_name(slot), requirements)
        })
        .collect()
}

/// "Process A", "Process B", ...
fn process_name(slot: u32) -> String {
    let letter = char::from_u32('A' as u32 + slot - 1).unwrap_or('?');
    format!("Process {letter}")
}
