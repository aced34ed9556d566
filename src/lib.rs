//! # procalloc
//!
//! > **A resource allocation game, run as a single-writer state machine.**
//!
//! Resources (CPU, Memory, Disk, ...) spawn into a bounded pool over time. The player
//! selects a process and collects the resource kinds it needs; a completed process
//! scores points and hands its resources back. Complete every process to win the level.
//!
//! ## 🏗️ Design Philosophy
//!
//! Players tap fast, and the clock ticks whenever it likes. Every input is therefore an
//! action sent to **one actor** that owns the game state. The actor applies actions one
//! at a time, so a transition always reads, computes and replaces the state before the
//! next one starts. No locks guard the state, and no input ever sees a half-applied
//! board.
//!
//! ## 🚀 Core Concepts
//!
//! ### Reducers behind an actor
//! [`StateActor<M: StateMachine>`](framework::StateActor) hosts any reducer. The game is
//! one such reducer, [`GameEngine`](engine::GameEngine). Each committed snapshot is an
//! immutable `Arc<GameState>`, published on a `watch` channel and to registered observers.
//!
//! ### Invalid actions are no-ops
//! Collecting a resource the current process does not need, selecting a finished
//! process, ticking backwards: all are absorbed silently. Errors are reserved for real
//! misuse (an unknown level) and for the collaborators (storage, a closed actor).
//!
//! ### Side effects after the commit
//! Transitions never do I/O. They emit events, and the actor hands those to
//! [`GameServices`](services::GameServices) once the new state is published. Persisting
//! a win runs on its own task and can never roll gameplay back.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine Room ([`framework`])
//! The generic actor, its client, the message types and mock helpers for tests.
//!
//! ### 2. The Rules ([`engine`], [`model`])
//! Catalog, process generator, pool capacity policy, score policy and the transition
//! function itself, over plain data types.
//!
//! ### 3. The Interface ([`clients`])
//! [`GameClient`](clients::GameClient) wraps the generic client with one method per
//! player input.
//!
//! ### 4. The Orchestrator ([`runtime`])
//! [`GameSystem`](runtime::GameSystem) spawns the actor and the
//! [`ClockDriver`](runtime::ClockDriver), wires the services and shuts everything down
//! in order.
//!
//! ### 5. The Outside World ([`services`], [`config`])
//! Score storage (in memory or a JSON file), feedback, and TOML configuration.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Watch a scripted player win level 1
//! RUST_LOG=info cargo run
//!
//! # Randomized level, reproducible, with persistent scores
//! cargo run -- --level 2 --seed 7 --store scores.json
//! ```

pub mod clients;
pub mod config;
pub mod engine;
pub mod framework;
pub mod model;
pub mod runtime;
pub mod services;
