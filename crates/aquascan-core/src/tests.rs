//! Cross-module tests for the core vocabulary: sector geometry, frame
//! buffer lifecycle, and view serialization.

use glam::DVec2;

use crate::components::{FrameBuffer, SonarUnit, SweepState};
use crate::constants::*;
use crate::state::{EngineSnapshot, EvalMetrics};
use crate::types::Position;

fn corner_sonars() -> Vec<SonarUnit> {
    vec![
        SonarUnit {
            id: 0,
            position: Position::new(0.0, 0.0),
            mount_deg: 45.0,
        },
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

#[test]
fn test_every_corner_sector_covers_the_pool() {
    let sonars = corner_sonars();
    let probes = [
        Position::new(0.5, 0.5),
        Position::new(19.5, 0.5),
        Position::new(10.0, 25.0),
        Position::new(0.5, 49.5),
        Position::new(19.5, 49.5),
    ];
    for sonar in &sonars {
        for probe in &probes {
            let bearing = sonar.position.bearing_deg_to(probe);
            assert!(
                sonar.covers_bearing(bearing),
                "sonar {} should cover bearing {bearing:.1}",
                sonar.id
            );
        }
    }
}

#[test]
fn test_sector_wraparound_of_fourth_corner() {
    // Sonar 3's sector is [270, 360]; a bearing of 359 deg is inside,
    // 200 deg is not.
    let sonar = &corner_sonars()[3];
    assert!(sonar.covers_bearing(359.0));
    assert!(sonar.covers_bearing(271.0));
    assert!(!sonar.covers_bearing(200.0));
    let rel = sonar.relative_bearing_deg(359.0);
    assert!((rel - 89.0).abs() < 1e-9, "relative bearing {rel}");
}

#[test]
fn test_frame_buffer_carries_background_forward() {
    let mut frame = FrameBuffer::new(IMAGING_BACKGROUND_WARMUP_FRAMES);
    frame.background[FrameBuffer::idx(10, 20)] = 1.5;
    frame.intensity[FrameBuffer::idx(10, 20)] = 9.0;
    frame.observed[10] = true;

    frame.begin_frame(3.25);
    assert_eq!(frame.intensity[FrameBuffer::idx(10, 20)], 1.5);
    assert_eq!(frame.observed_columns(), 0);
    assert_eq!(frame.frame_id, 1);
    assert_eq!(frame.started_at, 3.25);
}

#[test]
fn test_vis_buffers_are_capped() {
    let mut sweep = SweepState::new(45.0, MAX_RANGE_NAIVE);
    for i in 0..40 {
        sweep.push_detected(DVec2::new(i as f64, 0.0));
        sweep.push_matched(DVec2::new(0.0, i as f64));
    }
    assert_eq!(sweep.detected_points.len(), VIS_POINT_BUFFER);
    assert_eq!(sweep.matched_points.len(), VIS_POINT_BUFFER);
    // Oldest entries are the ones evicted.
    assert_eq!(sweep.detected_points[0].x, 25.0);
}

#[test]
fn test_views_round_trip_through_json() {
    let snapshot = EngineSnapshot::default();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: EngineSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(serde_json::to_string(&back).unwrap(), json);

    let metrics = EvalMetrics::default();
    let json = serde_json::to_string(&metrics).unwrap();
    let back: EvalMetrics = serde_json::from_str(&json).unwrap();
    assert_eq!(metrics, back);
}

#[test]
fn test_frame_geometry_constants_are_consistent() {
    assert_eq!(IMAGING_ANGLE_STEP_DEG, 1.0);
    assert!((IMAGING_RANGE_STEP_M - 50.0 / 256.0).abs() < 1e-12);
    assert_eq!(FrameBuffer::CELLS, 90 * 256);
}
