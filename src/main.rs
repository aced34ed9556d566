//! # procalloc demo
//!
//! Plays one level with a scripted player on a manual clock and prints the result.
//!
//! ```bash
//! RUST_LOG=info cargo run -- --level 2 --seed 7 --store scores.json
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Instrument};

use procalloc::clients::GameClient;
use procalloc::config::GameConfig;
use procalloc::model::{GameState, InstanceId, KindId, Process};
use procalloc::runtime::{setup_tracing, GameSystem};
use procalloc::services::{GameServices, InMemoryStore, JsonFileStore, LogFeedback, ScoreStore};

#[derive(Debug, Parser)]
#[command(author, version, about = "Resource allocation game, played by a script")]
struct Cli {
    /// Level to play (1 = fixed, 2 = randomized)
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file for high scores and points (in-memory when omitted)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Give up after this much game time
    #[arg(long, default_value_t = 300)]
    max_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    let tick_period = config.tick_period();
    let capacity = config.max_resources;

    let store: Arc<dyn ScoreStore> = match &cli.store {
        Some(path) => Arc::new(JsonFileStore::open(path).await?),
        None => Arc::new(InMemoryStore::new()),
    };
    let services = GameServices::new(store.clone(), Arc::new(LogFeedback));

    let system = GameSystem::with_manual_clock(config, services)?;
    system.start_level(cli.level).await?;

    let limit = Duration::from_secs(cli.max_seconds);
    let mut now = Duration::ZERO;
    let span = tracing::info_span!("play", level = cli.level);
    let won = async {
        while now < limit {
            now += tick_period;
            system.client.tick(now).await?;
            play_turn(&system.client, capacity).await?;
            if system.client.latest().is_game_won {
                return Ok::<bool, anyhow::Error>(true);
            }
        }
        Ok(false)
    }
    .instrument(span)
    .await?;

    let last = system.client.latest();
    system.shutdown().await?;

    if won {
        info!(score = last.score, elapsed_s = last.time_elapsed.as_secs(), "Level won");
    } else {
        warn!(score = last.score, "Gave up");
    }
    println!(
        "level {}: {} in {}s, score {}, banked points {}, high score {}",
        cli.level,
        if won { "won" } else { "not won" },
        last.time_elapsed.as_secs(),
        last.score,
        store.points().await?,
        store.high_score(cli.level).await?,
    );
    Ok(())
}

// =============================================================================
// Scripted player
// =============================================================================

/// Work on the first unfinished process: select it once the pool can finish it, then
/// collect everything it still needs. Discards surplus when the pool is clogged.
async fn play_turn(client: &GameClient, capacity: usize) -> Result<()> {
    let state = client.latest();
    let Some(target) = state.processes.iter().find(|p| !p.is_completed).cloned() else {
        return Ok(());
    };

    if state.current_process != Some(target.id) {
        if !pool_can_finish(&target, &state) {
            if state.resource_instances.len() >= capacity {
                if let Some(junk) = surplus_instance(&target, &state) {
                    client.discard(junk).await?;
                }
            }
            return Ok(());
        }
        client.select_process(target.id).await?;
    }

    loop {
        let state = client.latest();
        let Some(next) = needed_instance(&state) else {
            break;
        };
        client.collect(next).await?;
    }
    Ok(())
}

fn pool_can_finish(process: &Process, state: &GameState) -> bool {
    process.is_satisfied_by(&state.resource_instances)
}

fn needed_instance(state: &GameState) -> Option<InstanceId> {
    let process = state.current()?;
    state
        .resource_instances
        .iter()
        .filter(|i| i.is_available_at(state.time_elapsed))
        .find(|i| {
            let held = state
                .collected_resources
                .iter()
                .filter(|c| c.kind_id() == i.kind_id())
                .count();
            held < process.required_count(i.kind_id())
        })
        .map(|i| i.instance_id)
}

/// First pool instance beyond what `process` can use.
fn surplus_instance(process: &Process, state: &GameState) -> Option<InstanceId> {
    let mut seen: HashMap<&KindId, usize> = HashMap::new();
    state
        .resource_instances
        .iter()
        .find(|i| {
            let count = seen.entry(i.kind_id()).or_default();
            *count += 1;
            *count > process.required_count(i.kind_id())
        })
        .map(|i| i.instance_id)
}
