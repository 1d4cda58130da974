//! Sweep planning for AQUASCAN.
//!
//! Implements the baseline full-sector planner, the track-driven adaptive
//! planner, the cycle-duration cost model, and the cross-sonar PSO
//! assignment. No ECS dependency — everything operates on plain data; the
//! sim crate applies decisions to its world.

pub mod adaptive;
pub mod cycle;
pub mod naive;
pub mod plan;
pub mod pso;

pub use aquascan_core as core;

#[cfg(test)]
mod tests;
