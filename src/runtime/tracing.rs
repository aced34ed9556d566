//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! Log lines use the compact format without the crate/module prefix (`with_target(false)`);
//! the actor loop tags its lines with `machine_type` instead.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Commits, spawns, completions and wins
//! RUST_LOG=info cargo run
//!
//! # Every dispatched action, including absorbed no-ops
//! RUST_LOG=debug cargo run
//!
//! # Clock ticks as well
//! RUST_LOG=trace cargo run
//!
//! # Only the engine
//! RUST_LOG=procalloc::engine=debug cargo run
//! ```
//!
//! ## What a level looks like
//!
//! ```text
//! INFO Level initialized level=1 processes=3 spawn_interval_ms=2000
//! INFO Resource spawned id=inst_1 kind=R1 pool=1
//! INFO select_process{id=ProcessId(1)}: Process selected id=process_1 returned=0 score=0
//! INFO Process completed process_id=process_1 score=100
//! INFO Feedback: process completed process_id=process_1 name=Process A
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
