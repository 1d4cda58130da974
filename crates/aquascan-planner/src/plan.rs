//! Planner input/output types.

use glam::DVec2;

use aquascan_core::components::{SonarUnit, SweepWindow};
use aquascan_core::constants::PLANNER_FLIP_TOLERANCE_DEG;
use aquascan_core::enums::SonarMode;
use aquascan_core::math::angle_diff_deg;

/// A Kalman-predicted target position, the only target information the
/// planners and the PSO are allowed to see.
#[derive(Debug, Clone, Copy)]
pub struct TrackEstimate {
    pub id: u32,
    pub position: DVec2,
}

/// Input to one sonar's per-tick planning step.
pub struct PlanContext<'a> {
    pub sonar: &'a SonarUnit,
    /// Absolute head angle (degrees).
    pub current_deg: f64,
    /// Last nonzero sweep direction, +1.0 or -1.0.
    pub last_dir: f64,
    /// Sweep bounds held from previous plans, if any.
    pub window: Option<SweepWindow>,
    pub now: f64,
    /// All predicted tracks.
    pub tracks: &'a [TrackEstimate],
    /// Swarm-assigned swimmer ids for this sonar; `None` or empty means the
    /// assignment is open and all tracks are considered.
    pub assigned: Option<&'a [u32]>,
}

/// Output of one planning step.
#[derive(Debug, Clone, Copy)]
pub struct PlanDecision {
    pub target_deg: f64,
    pub mode: SonarMode,
    pub scan_range_m: f64,
    /// Sweep direction after this step, +1.0 or -1.0.
    pub dir: f64,
    /// Sweep bounds to store for the next step (`None` clears them).
    pub window: Option<SweepWindow>,
}

/// Ping-pong direction update inside `[min_deg, max_deg]`: flip at either
/// bound (within the arrival tolerance), otherwise keep the previous
/// direction. A head exactly on the target keeps its stored direction, so
/// a zero signed difference can never stall the sweep.
pub fn pingpong_dir(current_deg: f64, min_deg: f64, max_deg: f64, last_dir: f64) -> f64 {
    if angle_diff_deg(max_deg, current_deg) < PLANNER_FLIP_TOLERANCE_DEG {
        -1.0
    } else if angle_diff_deg(current_deg, min_deg) < PLANNER_FLIP_TOLERANCE_DEG {
        1.0
    } else if last_dir < 0.0 {
        -1.0
    } else {
        1.0
    }
}
