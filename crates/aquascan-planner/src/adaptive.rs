//! Track-driven adaptive planner.
//!
//! Narrows the sweep to the bearing span of the sonar's assigned tracks
//! (padded), shortens the commanded range to the farthest track (padded),
//! and holds the previous bounds under a hysteresis rule so the head is not
//! re-targeted mid-sweep by every small track movement. With no usable
//! tracks the planner degrades to the baseline full-sector sweep.

use aquascan_core::components::SweepWindow;
use aquascan_core::constants::{
    MAX_RANGE_NAIVE, OPT_MIN_SCAN_RANGE_M, OPT_SWEEP_MAX_HOLD_SEC, OPT_SWEEP_MIN_DEG,
    OPT_SWEEP_REPLAN_DEG, PLANNER_FLIP_TOLERANCE_DEG, SWEEP_HALF_WIDTH_DEG, TARGET_PADDING_ANGLE,
    TARGET_PADDING_RANGE,
};
use aquascan_core::enums::SonarMode;
use aquascan_core::math::angle_diff_deg;
use aquascan_core::types::Position;

use crate::plan::{pingpong_dir, PlanContext, PlanDecision};

const SECTOR_SPAN_DEG: f64 = 2.0 * SWEEP_HALF_WIDTH_DEG;

/// Plan one step of the adaptive sweep.
pub fn plan(ctx: &PlanContext) -> PlanDecision {
    let sonar = ctx.sonar;
    let abs_min = sonar.sector_min_deg();

    // Assigned tracks, or every track while the assignment is open; either
    // way only bearings inside the sector are usable.
    let mut rel_bearings: Vec<f64> = Vec::new();
    let mut max_range = 0.0_f64;
    for track in ctx.tracks {
        if let Some(ids) = ctx.assigned {
            if !ids.is_empty() && !ids.contains(&track.id) {
                continue;
            }
        }
        let pos = Position(track.position);
        let bearing = sonar.position.bearing_deg_to(&pos);
        if !sonar.covers_bearing(bearing) {
            continue;
        }
        rel_bearings.push(sonar.relative_bearing_deg(bearing));
        max_range = max_range.max(sonar.position.range_to(&pos));
    }

    if rel_bearings.is_empty() {
        return degrade_to_full_sector(ctx);
    }

    let desired = desired_window(&rel_bearings, ctx.now);
    let window = match ctx.window {
        Some(stored) if !should_replan(ctx, &stored, &desired) => stored,
        _ => SweepWindow {
            min_deg: abs_min + desired.min_deg,
            max_deg: abs_min + desired.max_deg,
            updated_at: ctx.now,
        },
    };

    let scan_range_m =
        (max_range + TARGET_PADDING_RANGE).clamp(OPT_MIN_SCAN_RANGE_M, MAX_RANGE_NAIVE);
    let dir = pingpong_dir(ctx.current_deg, window.min_deg, window.max_deg, ctx.last_dir);
    PlanDecision {
        target_deg: if dir > 0.0 {
            window.max_deg
        } else {
            window.min_deg
        },
        mode: SonarMode::Scanning,
        scan_range_m,
        dir,
        window: Some(window),
    }
}

/// Sector-relative desired bounds from padded track bearings, with the
/// minimum width enforced and the width preserved when clamping.
fn desired_window(rel_bearings: &[f64], now: f64) -> SweepWindow {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for rel in rel_bearings {
        lo = lo.min(*rel);
        hi = hi.max(*rel);
    }
    lo -= TARGET_PADDING_ANGLE;
    hi += TARGET_PADDING_ANGLE;

    let min_width = OPT_SWEEP_MIN_DEG.max(2.0 * TARGET_PADDING_ANGLE);
    if hi - lo < min_width {
        let center = (lo + hi) / 2.0;
        lo = center - min_width / 2.0;
        hi = center + min_width / 2.0;
    }
    if lo < 0.0 {
        hi = (hi - lo).min(SECTOR_SPAN_DEG);
        lo = 0.0;
    }
    if hi > SECTOR_SPAN_DEG {
        lo = (lo - (hi - SECTOR_SPAN_DEG)).max(0.0);
        hi = SECTOR_SPAN_DEG;
    }
    SweepWindow {
        min_deg: lo,
        max_deg: hi,
        updated_at: now,
    }
}

/// Hysteresis: keep the stored bounds unless the head has arrived at the
/// stored target, left the bounds, or the desired bounds drifted far enough
/// for long enough.
fn should_replan(ctx: &PlanContext, stored: &SweepWindow, desired: &SweepWindow) -> bool {
    let abs_min = ctx.sonar.sector_min_deg();
    let tol = PLANNER_FLIP_TOLERANCE_DEG;

    let reached_bound = angle_diff_deg(stored.max_deg, ctx.current_deg).abs() < tol
        || angle_diff_deg(ctx.current_deg, stored.min_deg).abs() < tol;
    if reached_bound {
        return true;
    }

    let center = (stored.min_deg + stored.max_deg) / 2.0;
    let half = (stored.max_deg - stored.min_deg) / 2.0;
    if angle_diff_deg(ctx.current_deg, center).abs() > half + tol {
        return true;
    }

    let drift = angle_diff_deg(abs_min + desired.min_deg, stored.min_deg)
        .abs()
        .max(angle_diff_deg(abs_min + desired.max_deg, stored.max_deg).abs());
    drift >= OPT_SWEEP_REPLAN_DEG && ctx.now - stored.updated_at >= OPT_SWEEP_MAX_HOLD_SEC
}

/// No usable tracks: sweep the full sector at maximum range and park the
/// stored bounds on the sector itself.
fn degrade_to_full_sector(ctx: &PlanContext) -> PlanDecision {
    let min_deg = ctx.sonar.sector_min_deg();
    let max_deg = ctx.sonar.sector_max_deg();
    let window = match ctx.window {
        // Keep the original stamp so a later track burst is not held back.
        Some(stored)
            if (stored.min_deg - min_deg).abs() < 1e-9
                && (stored.max_deg - max_deg).abs() < 1e-9 =>
        {
            stored
        }
        _ => SweepWindow {
            min_deg,
            max_deg,
            updated_at: ctx.now,
        },
    };
    let dir = pingpong_dir(ctx.current_deg, min_deg, max_deg, ctx.last_dir);
    PlanDecision {
        target_deg: if dir > 0.0 { max_deg } else { min_deg },
        mode: SonarMode::Scanning,
        scan_range_m: MAX_RANGE_NAIVE,
        dir,
        window: Some(window),
    }
}
