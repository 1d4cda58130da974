//! Tests for the sweep planners and the PSO assignment.

use glam::DVec2;

use aquascan_core::components::{SonarUnit, SweepWindow};
use aquascan_core::constants::*;
use aquascan_core::enums::SonarMode;
use aquascan_core::types::Position;

use crate::adaptive;
use crate::naive;
use crate::plan::{pingpong_dir, PlanContext, TrackEstimate};
use crate::pso;

fn corner_sonar() -> SonarUnit {
    SonarUnit {
        id: 0,
        position: Position::new(0.0, 0.0),
        mount_deg: 45.0,
    }
}

fn all_sonars() -> Vec<SonarUnit> {
    vec![
        corner_sonar(),
        SonarUnit {
            id: 1,
            position: Position::new(POOL_WIDTH, 0.0),
            mount_deg: 135.0,
        },
        SonarUnit {
            id: 2,
            position: Position::new(POOL_WIDTH, POOL_LENGTH),
            mount_deg: 225.0,
        },
        SonarUnit {
            id: 3,
            position: Position::new(0.0, POOL_LENGTH),
            mount_deg: 315.0,
        },
    ]
}

fn ctx<'a>(
    sonar: &'a SonarUnit,
    current_deg: f64,
    last_dir: f64,
    window: Option<SweepWindow>,
    now: f64,
    tracks: &'a [TrackEstimate],
) -> PlanContext<'a> {
    PlanContext {
        sonar,
        current_deg,
        last_dir,
        window,
        now,
        tracks,
        assigned: None,
    }
}

// ---- Ping-pong direction ----

#[test]
fn test_pingpong_flips_at_bounds() {
    assert_eq!(pingpong_dir(89.5, 0.0, 90.0, 1.0), -1.0);
    assert_eq!(pingpong_dir(0.5, 0.0, 90.0, -1.0), 1.0);
    assert_eq!(pingpong_dir(45.0, 0.0, 90.0, 1.0), 1.0);
    assert_eq!(pingpong_dir(45.0, 0.0, 90.0, -1.0), -1.0);
}

#[test]
fn test_pingpong_keeps_direction_on_exact_arrival() {
    // Head exactly on a bound: the signed difference is 0, which must not
    // stall the sweep — the flip happens via the tolerance test.
    assert_eq!(pingpong_dir(90.0, 0.0, 90.0, 1.0), -1.0);
    assert_eq!(pingpong_dir(0.0, 0.0, 90.0, -1.0), 1.0);
}

#[test]
fn test_pingpong_recovers_from_outside_bounds() {
    assert_eq!(pingpong_dir(95.0, 0.0, 90.0, 1.0), -1.0);
    assert_eq!(pingpong_dir(-5.0, 0.0, 90.0, -1.0), 1.0);
}

// ---- Naive planner ----

#[test]
fn test_naive_bang_bang_full_sector() {
    let sonar = corner_sonar();
    let decision = naive::plan(&sonar, 45.0, 1.0);
    assert_eq!(decision.target_deg, 90.0);
    assert_eq!(decision.mode, SonarMode::Scanning);
    assert_eq!(decision.scan_range_m, MAX_RANGE_NAIVE);

    let at_top = naive::plan(&sonar, 89.8, 1.0);
    assert_eq!(at_top.target_deg, 0.0);
    assert_eq!(at_top.dir, -1.0);
}

#[test]
fn test_naive_wraparound_sector() {
    let sonar = SonarUnit {
        id: 3,
        position: Position::new(0.0, POOL_LENGTH),
        mount_deg: 315.0,
    };
    let decision = naive::plan(&sonar, 359.5, 1.0);
    assert_eq!(decision.target_deg, 270.0);
    assert_eq!(decision.dir, -1.0);
}

// ---- Adaptive planner ----

#[test]
fn test_adaptive_without_tracks_degrades_to_naive() {
    let sonar = corner_sonar();
    let tracks: Vec<TrackEstimate> = Vec::new();
    let decision = adaptive::plan(&ctx(&sonar, 45.0, 1.0, None, 0.0, &tracks));
    let baseline = naive::plan(&sonar, 45.0, 1.0);
    assert_eq!(decision.target_deg, baseline.target_deg);
    assert_eq!(decision.scan_range_m, MAX_RANGE_NAIVE);
    let window = decision.window.unwrap();
    assert_eq!(window.min_deg, 0.0);
    assert_eq!(window.max_deg, 90.0);
}

#[test]
fn test_adaptive_narrows_to_padded_track_span() {
    let sonar = corner_sonar();
    // Bearings 20 deg and 70 deg at ranges 10 m and 20 m.
    let tracks = vec![
        TrackEstimate {
            id: 1,
            position: DVec2::new(10.0 * 20f64.to_radians().cos(), 10.0 * 20f64.to_radians().sin()),
        },
        TrackEstimate {
            id: 2,
            position: DVec2::new(20.0 * 70f64.to_radians().cos(), 20.0 * 70f64.to_radians().sin()),
        },
    ];
    let decision = adaptive::plan(&ctx(&sonar, 45.0, 1.0, None, 0.0, &tracks));
    let window = decision.window.unwrap();
    assert!((window.min_deg - 14.0).abs() < 1e-6, "min {}", window.min_deg);
    assert!((window.max_deg - 76.0).abs() < 1e-6, "max {}", window.max_deg);
    assert!((decision.scan_range_m - 25.0).abs() < 1e-6);
    assert_eq!(decision.target_deg, window.max_deg);
}

#[test]
fn test_adaptive_enforces_minimum_width_and_clamps() {
    let sonar = corner_sonar();
    // Single track hugging the sector start at bearing 2 deg.
    let tracks = vec![TrackEstimate {
        id: 1,
        position: DVec2::new(15.0 * 2f64.to_radians().cos(), 15.0 * 2f64.to_radians().sin()),
    }];
    let decision = adaptive::plan(&ctx(&sonar, 45.0, -1.0, None, 0.0, &tracks));
    let window = decision.window.unwrap();
    let width = window.max_deg - window.min_deg;
    assert!(window.min_deg >= 0.0);
    assert!(width >= OPT_SWEEP_MIN_DEG.max(2.0 * TARGET_PADDING_ANGLE) - 1e-6);
}

#[test]
fn test_adaptive_hysteresis_holds_fresh_bounds() {
    let sonar = corner_sonar();
    let stored = SweepWindow {
        min_deg: 30.0,
        max_deg: 60.0,
        updated_at: 10.0,
    };
    // Desired bounds drift well past OPT_SWEEP_REPLAN_DEG, but the hold has
    // not elapsed and the head is mid-window.
    let tracks = vec![TrackEstimate {
        id: 1,
        position: DVec2::new(20.0 * 75f64.to_radians().cos(), 20.0 * 75f64.to_radians().sin()),
    }];
    let decision = adaptive::plan(&ctx(&sonar, 45.0, 1.0, Some(stored), 10.5, &tracks));
    let window = decision.window.unwrap();
    assert_eq!(window.min_deg, 30.0);
    assert_eq!(window.max_deg, 60.0);

    // Once the hold expires the drifted bounds are adopted.
    let decision = adaptive::plan(&ctx(&sonar, 45.0, 1.0, Some(stored), 12.0, &tracks));
    let window = decision.window.unwrap();
    assert!(window.max_deg > 60.0, "max {}", window.max_deg);
}

#[test]
fn test_adaptive_replans_when_head_reaches_bound() {
    let sonar = corner_sonar();
    let stored = SweepWindow {
        min_deg: 30.0,
        max_deg: 60.0,
        updated_at: 10.0,
    };
    let tracks = vec![TrackEstimate {
        id: 1,
        position: DVec2::new(20.0 * 75f64.to_radians().cos(), 20.0 * 75f64.to_radians().sin()),
    }];
    let decision = adaptive::plan(&ctx(&sonar, 59.5, 1.0, Some(stored), 10.2, &tracks));
    let window = decision.window.unwrap();
    assert!(window.max_deg > 60.0, "max {}", window.max_deg);
    assert_eq!(window.updated_at, 10.2);
}

#[test]
fn test_adaptive_ignores_out_of_sector_and_unassigned_tracks() {
    let sonar = corner_sonar();
    let tracks = vec![
        // Behind the mount — not coverable from (0, 0).
        TrackEstimate {
            id: 1,
            position: DVec2::new(-5.0, -5.0),
        },
        TrackEstimate {
            id: 2,
            position: DVec2::new(10.0, 25.0),
        },
    ];
    let assigned = vec![1u32];
    let decision = adaptive::plan(&PlanContext {
        sonar: &sonar,
        current_deg: 45.0,
        last_dir: 1.0,
        window: None,
        now: 0.0,
        tracks: &tracks,
        assigned: Some(&assigned),
    });
    // Only track 1 is assigned and it is out of sector: full-sector fallback.
    assert_eq!(decision.scan_range_m, MAX_RANGE_NAIVE);
    let window = decision.window.unwrap();
    assert_eq!(window.min_deg, 0.0);
    assert_eq!(window.max_deg, 90.0);
}

// ---- PSO assignment ----

#[test]
fn test_pso_is_deterministic_and_total() {
    let sonars = all_sonars();
    let tracks = vec![
        TrackEstimate {
            id: 10,
            position: DVec2::new(3.0, 4.0),
        },
        TrackEstimate {
            id: 11,
            position: DVec2::new(17.0, 5.0),
        },
        TrackEstimate {
            id: 12,
            position: DVec2::new(17.0, 46.0),
        },
        TrackEstimate {
            id: 13,
            position: DVec2::new(3.0, 45.0),
        },
    ];
    let a = pso::assign(1337, 4.0, &sonars, &tracks);
    let b = pso::assign(1337, 4.0, &sonars, &tracks);
    assert_eq!(a, b);

    let mut assigned: Vec<u32> = a.values().flatten().copied().collect();
    assigned.sort_unstable();
    assert_eq!(assigned, vec![10, 11, 12, 13]);
}

#[test]
fn test_pso_spreads_corner_targets() {
    let sonars = all_sonars();
    let tracks = vec![
        TrackEstimate {
            id: 10,
            position: DVec2::new(3.0, 4.0),
        },
        TrackEstimate {
            id: 11,
            position: DVec2::new(17.0, 5.0),
        },
        TrackEstimate {
            id: 12,
            position: DVec2::new(17.0, 46.0),
        },
        TrackEstimate {
            id: 13,
            position: DVec2::new(3.0, 45.0),
        },
    ];
    let assignments = pso::assign(1337, 4.0, &sonars, &tracks);
    // Four targets in four different corners: piling several onto one sonar
    // can only raise the slowest cycle, so the swarm spreads the load.
    let max_per_sonar = assignments.values().map(|ids| ids.len()).max().unwrap();
    assert!(
        max_per_sonar <= 2,
        "swarm left {max_per_sonar} targets on one sonar: {assignments:?}"
    );
}

#[test]
fn test_pso_empty_tracks_yield_empty_map() {
    let sonars = all_sonars();
    assert!(pso::assign(1337, 0.0, &sonars, &[]).is_empty());
}

#[test]
fn test_pso_same_bucket_same_result() {
    let sonars = all_sonars();
    let tracks = vec![TrackEstimate {
        id: 5,
        position: DVec2::new(10.0, 25.0),
    }];
    // Same replan bucket (floor(now / interval)) must reuse the stream.
    let a = pso::assign(42, 0.81, &sonars, &tracks);
    let b = pso::assign(42, 1.59, &sonars, &tracks);
    assert_eq!(a, b);
    let total: usize = a.values().map(|ids| ids.len()).sum();
    assert_eq!(total, 1);
}
