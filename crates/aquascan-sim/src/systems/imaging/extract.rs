//! Cluster statistics, physical-plausibility filtering, and candidate
//! construction.

use glam::DVec2;

use aquascan_core::components::{FrameBuffer, SonarUnit};
use aquascan_core::constants::*;
use aquascan_core::math::dir_from_deg;
use aquascan_core::rng::StreamRng;
use aquascan_core::tuning::Tuning;
use aquascan_core::types::time_bucket_ms;

/// Inclusive polar-bin bounding box of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolarBox {
    pub a_min: usize,
    pub a_max: usize,
    pub r_min: usize,
    pub r_max: usize,
}

/// Per-cluster aggregates over the subtracted frame.
#[derive(Debug, Clone, Copy)]
pub struct ClusterStats {
    pub cells: u32,
    /// Cells also set in the large-kernel mask.
    pub overlap_cells: u32,
    pub sum_intensity: f64,
    /// Amplitude-weighted centroid in continuous bins (cell centers at +0.5).
    pub centroid_a: f64,
    pub centroid_r: f64,
    pub bbox: PolarBox,
}

/// A surviving detection at frame finalization.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    /// Cartesian position in pool coordinates, jitter applied and clamped.
    pub position: DVec2,
    /// Absolute bearing of the centroid (degrees).
    pub angle_deg: f64,
    /// Range of the centroid (meters).
    pub range_m: f64,
    /// Measurement standard deviation handed to the tracker (meters).
    pub meas_sigma: f64,
    pub bbox: PolarBox,
    pub sum_intensity: f64,
}

/// Aggregate the labeled cells of `frame` into per-cluster statistics.
pub fn cluster_stats(frame: &FrameBuffer, n_clusters: u32) -> Vec<ClusterStats> {
    let mut stats: Vec<ClusterStats> = (0..n_clusters)
        .map(|_| ClusterStats {
            cells: 0,
            overlap_cells: 0,
            sum_intensity: 0.0,
            centroid_a: 0.0,
            centroid_r: 0.0,
            bbox: PolarBox {
                a_min: usize::MAX,
                a_max: 0,
                r_min: usize::MAX,
                r_max: 0,
            },
        })
        .collect();

    for a_idx in 0..IMAGING_FRAME_ANGLE_BINS {
        for r_idx in 0..IMAGING_RANGE_BINS {
            let idx = FrameBuffer::idx(a_idx, r_idx);
            let label = frame.labels[idx];
            if label <= 0 {
                continue;
            }
            let s = &mut stats[label as usize - 1];
            let weight = frame.subtracted[idx] as f64;
            s.cells += 1;
            s.overlap_cells += frame.mask_large[idx] as u32;
            s.sum_intensity += weight;
            s.centroid_a += weight * (a_idx as f64 + 0.5);
            s.centroid_r += weight * (r_idx as f64 + 0.5);
            s.bbox.a_min = s.bbox.a_min.min(a_idx);
            s.bbox.a_max = s.bbox.a_max.max(a_idx);
            s.bbox.r_min = s.bbox.r_min.min(r_idx);
            s.bbox.r_max = s.bbox.r_max.max(r_idx);
        }
    }

    for s in &mut stats {
        if s.sum_intensity > 0.0 {
            s.centroid_a /= s.sum_intensity;
            s.centroid_r /= s.sum_intensity;
        } else if s.cells > 0 {
            // Degenerate all-zero weights: fall back to the bbox center.
            s.centroid_a = (s.bbox.a_min + s.bbox.a_max) as f64 / 2.0 + 0.5;
            s.centroid_r = (s.bbox.r_min + s.bbox.r_max) as f64 / 2.0 + 0.5;
        }
    }
    stats
}

/// Physical-plausibility gate: small/large kernel agreement plus
/// human-scale extent and aspect in meters.
pub fn passes_physical_filter(s: &ClusterStats) -> bool {
    if s.cells == 0 {
        return false;
    }
    if (s.overlap_cells as f64) < AQUASCAN_DENOISE_OVERLAP_MIN * s.cells as f64 {
        return false;
    }
    let angle_span_deg = (s.bbox.a_max - s.bbox.a_min + 1) as f64 * IMAGING_ANGLE_STEP_DEG;
    let range_at_centroid = s.centroid_r * IMAGING_RANGE_STEP_M;
    let cross_range = range_at_centroid * angle_span_deg.to_radians();
    let range_extent = (s.bbox.r_max - s.bbox.r_min + 1) as f64 * IMAGING_RANGE_STEP_M;
    if !(AQUASCAN_MIN_CROSS_RANGE_M..=AQUASCAN_MAX_CROSS_RANGE_M).contains(&cross_range) {
        return false;
    }
    if !(AQUASCAN_MIN_RANGE_EXTENT_M..=AQUASCAN_MAX_RANGE_EXTENT_M).contains(&range_extent) {
        return false;
    }
    let aspect = cross_range / range_extent;
    (AQUASCAN_MIN_ASPECT..=AQUASCAN_MAX_ASPECT).contains(&aspect)
}

/// Convert surviving clusters into candidates: polar centroid to absolute
/// pool coordinates, measurement sigma from the range/noise model, and a
/// per-candidate jitter drawn from the `meas` stream.
#[allow(clippy::too_many_arguments)]
pub fn build_candidates(
    survivors: &[ClusterStats],
    frame: &FrameBuffer,
    sonar: &SonarUnit,
    tuning: &Tuning,
    threshold: f64,
    seed: u32,
    frame_time: f64,
) -> Vec<Candidate> {
    let tb = time_bucket_ms(frame_time).to_string();
    let sonar_id = sonar.id.to_string();
    let frame_id = frame.frame_id.to_string();
    let abs_min = sonar.sector_min_deg();

    survivors
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let angle_deg = abs_min + s.centroid_a * IMAGING_ANGLE_STEP_DEG;
            let range_m = s.centroid_r * IMAGING_RANGE_STEP_M;

            let quant_range = IMAGING_RANGE_STEP_M / 12f64.sqrt();
            let quant_arc = range_m * IMAGING_ANGLE_STEP_DEG.to_radians() / 12f64.sqrt();
            let quant_std = (quant_range * quant_range + quant_arc * quant_arc).sqrt();
            let noise_sigma = AQUASCAN_NOISE_TO_MEAS_SIGMA_M
                * (IMAGING_NOISE_STD as f64 * tuning.noise_scale / threshold.max(0.05));
            let meas_sigma = AQUASCAN_MEAS_SIGMA_BASE
                + AQUASCAN_MEAS_SIGMA_PER_M * range_m
                + quant_std
                + noise_sigma;

            let mut rng = StreamRng::stream(
                seed,
                &["meas", &sonar_id, &frame_id, &tb, &i.to_string()],
            );
            let jitter_sigma = meas_sigma * AQUASCAN_MEAS_JITTER_SCALE;
            let jitter = DVec2::new(
                rng.gaussian(0.0, jitter_sigma),
                rng.gaussian(0.0, jitter_sigma),
            );

            let position = (sonar.position.0 + dir_from_deg(angle_deg) * range_m + jitter)
                .clamp(DVec2::ZERO, DVec2::new(POOL_WIDTH, POOL_LENGTH));

            Candidate {
                position,
                angle_deg,
                range_m,
                meas_sigma,
                bbox: s.bbox,
                sum_intensity: s.sum_intensity,
            }
        })
        .collect()
}
