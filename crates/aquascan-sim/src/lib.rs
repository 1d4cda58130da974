//! Simulation engine for AQUASCAN.
//!
//! Owns the hecs ECS world of swimmers and sonar units, runs the imaging
//! and evaluation systems per tick, and exposes the strategy-comparison
//! API: `tick(dt)`, swimmer add/remove, tuning, metrics, snapshots.
//! Completely headless, enabling deterministic testing.

pub mod engine;
pub mod metrics;
pub mod systems;
pub mod world_setup;

pub use aquascan_core as core;
pub use engine::Engine;
