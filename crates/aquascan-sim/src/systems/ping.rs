//! Ping writer: renders one bearing column of the polar frame.
//!
//! Each ping overwrites its angle column with the noise floor, impulsive
//! speckle, an occasional surface-wave band, the static wall and lane-line
//! reflections of the pool, range-shifted multipath ghosts, and the echoes
//! of every swimmer inside the beam. Ghosts and speckle are there to
//! generate realistic false alarms for the detection pipeline.
//!
//! Two streams feed a column: `ping` (noise floor, speckle, target echoes)
//! and `dyn` (weak bands and ghost range offsets), both keyed by sonar,
//! frame, millisecond bucket, and angle bin.

use glam::DVec2;

use aquascan_core::components::{FrameBuffer, SonarUnit};
use aquascan_core::constants::*;
use aquascan_core::math::{angle_diff_deg, dir_from_deg};
use aquascan_core::rng::StreamRng;
use aquascan_core::tuning::Tuning;
use aquascan_core::types::{time_bucket_ms, Position};

use crate::systems::SwimmerSnap;

const RAY_EPS: f64 = 1e-6;

/// Write the column for a ping emitted at `angle_deg` and time `t`.
pub fn write_column(
    frame: &mut FrameBuffer,
    sonar: &SonarUnit,
    tuning: &Tuning,
    swimmers: &[SwimmerSnap],
    seed: u32,
    angle_deg: f64,
    scan_range_m: f64,
    t: f64,
) {
    let rel = angle_diff_deg(angle_deg, sonar.sector_min_deg());
    let a_idx = ((rel / IMAGING_ANGLE_STEP_DEG).floor() as isize)
        .clamp(0, IMAGING_FRAME_ANGLE_BINS as isize - 1) as usize;
    let r_max = ((scan_range_m / IMAGING_RANGE_STEP_M).floor() as usize)
        .min(IMAGING_RANGE_BINS - 1);

    let tb = time_bucket_ms(t).to_string();
    let sonar_id = sonar.id.to_string();
    let frame_id = frame.frame_id.to_string();
    let a_str = a_idx.to_string();
    let mut rng = StreamRng::stream(seed, &["ping", &sonar_id, &frame_id, &tb, &a_str]);
    let mut rng_dyn = StreamRng::stream(seed, &["dyn", &sonar_id, &frame_id, &tb, &a_str]);

    let start = FrameBuffer::idx(a_idx, 0);
    let column = &mut frame.intensity[start..start + r_max + 1];

    // Noise floor plus impulsive speckle.
    let noise_std = IMAGING_NOISE_STD as f64 * tuning.noise_scale;
    for cell in column.iter_mut() {
        let mut value = rng.gaussian(IMAGING_NOISE_FLOOR as f64, noise_std).max(0.0);
        if rng.chance(tuning.speckle_prob) {
            let u = rng.next_f64();
            value += IMAGING_SPECKLE_STRENGTH as f64
                * ((1.0 / (1.0 - u)).powf(1.0 / IMAGING_SPECKLE_SHAPE) - 1.0);
        }
        *cell = value as f32;
    }

    // Occasional surface-wave / multipath band along the column.
    if rng_dyn.chance(IMAGING_WEAK_BAND_PROB) {
        let center = rng_dyn.next_f64() * r_max as f64;
        add_gaussian(
            column,
            center,
            IMAGING_WEAK_BAND_SIGMA_BINS,
            IMAGING_WEAK_BAND_STRENGTH,
        );
    }

    let dir = dir_from_deg(angle_deg);
    let origin = sonar.position.0;

    // Wall reflection and its ghost.
    if let Some(wall_dist) = wall_distance(origin, dir) {
        if wall_dist <= scan_range_m {
            add_gaussian(
                column,
                wall_dist / IMAGING_RANGE_STEP_M,
                IMAGING_WALL_ECHO_SIGMA_BINS,
                IMAGING_WALL_ECHO_STRENGTH,
            );
            let ghost_range = wall_dist
                + IMAGING_GHOST_RANGE_OFFSET_M * (0.6 + 0.8 * rng_dyn.next_f64());
            add_gaussian(
                column,
                ghost_range / IMAGING_RANGE_STEP_M,
                IMAGING_WALL_ECHO_SIGMA_BINS,
                IMAGING_WALL_ECHO_STRENGTH * IMAGING_GHOST_REL_STRENGTH,
            );
        }
    }

    // Lane lines: POOL_LANE_COUNT - 1 vertical lines across the pool.
    for lane in 1..POOL_LANE_COUNT {
        let x = POOL_WIDTH * lane as f64 / POOL_LANE_COUNT as f64;
        if dir.x.abs() < RAY_EPS {
            continue;
        }
        let t_hit = (x - origin.x) / dir.x;
        if t_hit <= RAY_EPS || t_hit > scan_range_m {
            continue;
        }
        let y = origin.y + t_hit * dir.y;
        if !(0.0..=POOL_LENGTH).contains(&y) {
            continue;
        }
        add_gaussian(
            column,
            t_hit / IMAGING_RANGE_STEP_M,
            IMAGING_LANE_ECHO_SIGMA_BINS,
            IMAGING_LANE_ECHO_STRENGTH,
        );
    }

    // Target echoes with beam taper, each with a range-shifted ghost.
    let fov_half = IMAGING_FOV_DEG / 2.0;
    for snap in swimmers {
        let pos = Position(snap.position);
        let bearing = sonar.position.bearing_deg_to(&pos);
        let d_theta = angle_diff_deg(bearing, angle_deg);
        if d_theta.abs() > fov_half {
            continue;
        }
        let dist = sonar.position.range_to(&pos);
        if dist > scan_range_m {
            continue;
        }
        let taper = (-0.5 * (d_theta / fov_half) * (d_theta / fov_half)).exp();
        let amp = IMAGING_ECHO_STRENGTH as f64
            * (-dist / IMAGING_ECHO_ATTENUATION_M).exp()
            * taper;
        add_gaussian(
            column,
            dist / IMAGING_RANGE_STEP_M,
            IMAGING_BLOB_RADIUS_BINS,
            amp as f32,
        );
        let ghost_range =
            dist + IMAGING_GHOST_RANGE_OFFSET_M * (0.6 + 0.8 * rng_dyn.next_f64());
        add_gaussian(
            column,
            ghost_range / IMAGING_RANGE_STEP_M,
            IMAGING_BLOB_RADIUS_BINS,
            amp as f32 * IMAGING_GHOST_REL_STRENGTH,
        );
    }

    frame.observed[a_idx] = true;
}

/// Distance along the ray from `origin` in direction `dir` to the first
/// pool edge, if any.
fn wall_distance(origin: DVec2, dir: DVec2) -> Option<f64> {
    let mut best: Option<f64> = None;
    let mut consider = |t: f64, along: f64, lo: f64, hi: f64| {
        if t > RAY_EPS && (lo..=hi).contains(&along) {
            best = Some(best.map_or(t, |b: f64| b.min(t)));
        }
    };
    if dir.x.abs() > RAY_EPS {
        for x in [0.0, POOL_WIDTH] {
            let t = (x - origin.x) / dir.x;
            consider(t, origin.y + t * dir.y, 0.0, POOL_LENGTH);
        }
    }
    if dir.y.abs() > RAY_EPS {
        for y in [0.0, POOL_LENGTH] {
            let t = (y - origin.y) / dir.y;
            consider(t, origin.x + t * dir.x, 0.0, POOL_WIDTH);
        }
    }
    best
}

/// Accumulate a radial Gaussian bump onto the column, truncated at 4 sigma.
fn add_gaussian(column: &mut [f32], center_bin: f64, sigma_bins: f64, amplitude: f32) {
    if amplitude <= 0.0 {
        return;
    }
    let lo = ((center_bin - 4.0 * sigma_bins).floor().max(0.0)) as usize;
    let hi = ((center_bin + 4.0 * sigma_bins).ceil() as usize).min(column.len().saturating_sub(1));
    for (r, cell) in column.iter_mut().enumerate().take(hi + 1).skip(lo) {
        let z = (r as f64 - center_bin) / sigma_bins;
        *cell += amplitude * (-0.5 * z * z).exp() as f32;
    }
}
