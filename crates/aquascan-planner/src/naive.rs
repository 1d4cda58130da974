//! Baseline planner: bang-bang over the full sector at maximum range.

use aquascan_core::components::SonarUnit;
use aquascan_core::constants::MAX_RANGE_NAIVE;
use aquascan_core::enums::SonarMode;

use crate::plan::{pingpong_dir, PlanDecision};

/// Plan one step of the full-sector sweep.
pub fn plan(sonar: &SonarUnit, current_deg: f64, last_dir: f64) -> PlanDecision {
    let min_deg = sonar.sector_min_deg();
    let max_deg = sonar.sector_max_deg();
    let dir = pingpong_dir(current_deg, min_deg, max_deg, last_dir);
    PlanDecision {
        target_deg: if dir > 0.0 { max_deg } else { min_deg },
        mode: SonarMode::Scanning,
        scan_range_m: MAX_RANGE_NAIVE,
        dir,
        window: None,
    }
}
