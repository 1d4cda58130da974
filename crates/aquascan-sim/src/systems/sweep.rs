//! Per-sonar sweep state machine: mode transitions, frame boundaries,
//! head motion, and ping emission cadence.
//!
//! Per tick and per sonar, in order: the planner's decision is compared
//! against the running sweep to detect a frame boundary, the finalized
//! frame (if any) goes through the detection pipeline, the decision is
//! adopted, and the head moves — emitting pings from the accumulator while
//! scanning, or slewing silently otherwise.

use aquascan_core::components::{FrameBuffer, SonarUnit, SweepState};
use aquascan_core::constants::{SCAN_STEP_ANGLE, SLEW_SPEED};
use aquascan_core::enums::SonarMode;
use aquascan_core::math::move_toward_deg;
use aquascan_core::tuning::Tuning;
use aquascan_planner::cycle::ping_interval;
use aquascan_planner::plan::PlanDecision;

use crate::systems::imaging::{self, Candidate};
use crate::systems::ping;
use crate::systems::SwimmerSnap;

/// A finalized frame, handed back to the engine for evaluation.
#[derive(Debug)]
pub struct FrameOutcome {
    pub sonar_id: u32,
    pub frame_time: f64,
    pub candidates: Vec<Candidate>,
}

/// Advance one sonar by `dt` under the planner's `decision`. Returns the
/// finalized frame when this tick closed a scan segment (at most one per
/// sonar per tick).
#[allow(clippy::too_many_arguments)]
pub fn run_sonar(
    unit: &SonarUnit,
    sweep: &mut SweepState,
    frame: &mut FrameBuffer,
    decision: &PlanDecision,
    tuning: &Tuning,
    seed: u32,
    t0: f64,
    dt: f64,
    swimmers: &[SwimmerSnap],
) -> Option<FrameOutcome> {
    let was_scanning = sweep.mode == SonarMode::Scanning;
    let boundary = was_scanning
        && (decision.mode != SonarMode::Scanning
            || (decision.target_deg - sweep.target_deg).abs() > 1e-9);

    let mut outcome = None;
    if boundary {
        // Scan segments that never received a ping produce no frame.
        if frame.observed_columns() > 0 {
            let candidates = imaging::finalize_frame(
                frame,
                unit,
                tuning,
                seed,
                t0,
                swimmers.len(),
            );
            outcome = Some(FrameOutcome {
                sonar_id: unit.id,
                frame_time: t0,
                candidates,
            });
            sweep.cycle_duration = t0 - sweep.last_scan_time;
            sweep.last_scan_time = t0;
        }
        frame.begin_frame(t0);
    }

    // Adopt the decision.
    if was_scanning && decision.mode != SonarMode::Scanning {
        sweep.ping_accumulator = 0.0;
    }
    sweep.mode = decision.mode;
    sweep.target_deg = decision.target_deg;
    sweep.scan_range_m = decision.scan_range_m;
    sweep.window = decision.window;
    if decision.dir != 0.0 {
        sweep.last_dir = decision.dir;
    }

    // Move the head, emitting pings while scanning.
    match sweep.mode {
        SonarMode::Scanning => {
            let interval = ping_interval(sweep.scan_range_m);
            let speed = SCAN_STEP_ANGLE / interval;
            let start = sweep.current_deg;

            let mut acc = sweep.ping_accumulator + dt;
            while acc >= interval {
                acc -= interval;
                let elapsed = dt - acc;
                let angle = move_toward_deg(start, sweep.target_deg, speed * elapsed);
                ping::write_column(
                    frame,
                    unit,
                    tuning,
                    swimmers,
                    seed,
                    angle,
                    sweep.scan_range_m,
                    t0 + elapsed,
                );
            }
            sweep.ping_accumulator = acc;
            sweep.current_deg = move_toward_deg(start, sweep.target_deg, speed * dt);
        }
        SonarMode::Slewing => {
            sweep.current_deg =
                move_toward_deg(sweep.current_deg, sweep.target_deg, SLEW_SPEED * dt);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquascan_core::constants::{MAX_RANGE_NAIVE, PING360_PROCESSING_OVERHEAD_S};
    use aquascan_core::types::Position;
    use aquascan_planner::naive;

    fn unit() -> SonarUnit {
        SonarUnit {
            id: 0,
            position: Position::new(0.0, 0.0),
            mount_deg: 45.0,
        }
    }

    fn tick(
        unit: &SonarUnit,
        sweep: &mut SweepState,
        frame: &mut FrameBuffer,
        t0: f64,
        dt: f64,
    ) -> Option<FrameOutcome> {
        let decision = naive::plan(unit, sweep.current_deg, sweep.last_dir);
        run_sonar(
            unit,
            sweep,
            frame,
            &decision,
            &Tuning::default(),
            1337,
            t0,
            dt,
            &[],
        )
    }

    #[test]
    fn test_scanning_speed_is_acoustically_limited() {
        let unit = unit();
        let mut sweep = SweepState::new(45.0, MAX_RANGE_NAIVE);
        let mut frame = FrameBuffer::new(0);
        tick(&unit, &mut sweep, &mut frame, 0.0, 0.1);
        let interval = 2.0 * MAX_RANGE_NAIVE / 1500.0 + PING360_PROCESSING_OVERHEAD_S;
        let expected = 45.0 + SCAN_STEP_ANGLE / interval * 0.1;
        assert!((sweep.current_deg - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ping_cadence_matches_round_trip_time() {
        let unit = unit();
        let mut sweep = SweepState::new(45.0, MAX_RANGE_NAIVE);
        let mut frame = FrameBuffer::new(0);
        // One second of scanning at 50 m: interval is ~68.7 ms, so 14 pings.
        let mut t = 0.0;
        for _ in 0..20 {
            tick(&unit, &mut sweep, &mut frame, t, 0.05);
            t += 0.05;
        }
        let interval = 2.0 * MAX_RANGE_NAIVE / 1500.0 + PING360_PROCESSING_OVERHEAD_S;
        let expected = (1.0 / interval) as usize;
        assert_eq!(frame.observed_columns(), expected.min(90));
    }

    #[test]
    fn test_sweep_stays_inside_sector_and_flips() {
        let unit = unit();
        let mut sweep = SweepState::new(45.0, MAX_RANGE_NAIVE);
        let mut frame = FrameBuffer::new(0);
        let mut t = 0.0;
        let mut seen_down = false;
        for _ in 0..2000 {
            tick(&unit, &mut sweep, &mut frame, t, 0.05);
            t += 0.05;
            assert!(
                (-1.0..=91.0).contains(&sweep.current_deg),
                "head left the sector: {}",
                sweep.current_deg
            );
            if sweep.last_dir < 0.0 {
                seen_down = true;
            }
        }
        assert!(seen_down, "sweep never flipped in 100 s");
    }

    #[test]
    fn test_frame_boundary_on_target_flip() {
        let unit = unit();
        let mut sweep = SweepState::new(45.0, MAX_RANGE_NAIVE);
        let mut frame = FrameBuffer::new(0);
        let mut t = 0.0;
        let mut frames = 0;
        let mut last_frame_time = 0.0;
        for _ in 0..4000 {
            if let Some(outcome) = tick(&unit, &mut sweep, &mut frame, t, 0.05) {
                frames += 1;
                assert_eq!(outcome.sonar_id, unit.id);
                last_frame_time = outcome.frame_time;
            }
            t += 0.05;
        }
        // 200 s of full-sector sweeping at ~6.2 s per leg.
        assert!(
            (25..=40).contains(&frames),
            "unexpected frame count {frames}"
        );
        assert!(last_frame_time > 0.0);
        assert!(sweep.cycle_duration > 5.0 && sweep.cycle_duration < 8.0);
    }

    #[test]
    fn test_slewing_emits_no_pings() {
        let unit = unit();
        let mut sweep = SweepState::new(45.0, MAX_RANGE_NAIVE);
        let mut frame = FrameBuffer::new(0);
        let decision = PlanDecision {
            target_deg: 90.0,
            mode: SonarMode::Slewing,
            scan_range_m: MAX_RANGE_NAIVE,
            dir: 1.0,
            window: None,
        };
        run_sonar(
            &unit,
            &mut sweep,
            &mut frame,
            &decision,
            &Tuning::default(),
            1337,
            0.0,
            0.1,
            &[],
        );
        assert_eq!(frame.observed_columns(), 0);
        assert!((sweep.current_deg - 49.5).abs() < 1e-9, "45 deg/s slew");
        assert_eq!(sweep.ping_accumulator, 0.0);
    }
}
