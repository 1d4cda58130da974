//! Simulation systems, run in a fixed order each tick (see `Engine::tick`).

pub mod imaging;
pub mod matching;
pub mod movement;
pub mod ping;
pub mod snapshot;
pub mod sweep;

use glam::DVec2;

/// One swimmer as sampled at the start of the sonar pass: the shared
/// read-only roster handed to the ping writer and the frame evaluation.
/// Always sorted by id.
#[derive(Debug, Clone, Copy)]
pub struct SwimmerSnap {
    pub id: u32,
    pub position: DVec2,
    pub entered_at: f64,
}
