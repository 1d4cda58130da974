//! Weak-echo elimination and the edge-aware 1-D majority filters.

use aquascan_core::components::FrameBuffer;
use aquascan_core::constants::{
    AQUASCAN_WEAK_ECHO_MIN, AQUASCAN_WEAK_ECHO_PERCENTILE, AQUASCAN_WEAK_ECHO_SAMPLE_STRIDE,
    IMAGING_FRAME_ANGLE_BINS, IMAGING_RANGE_BINS,
};
use aquascan_core::math::percentile;

/// Effective detection threshold: the tuned floor, a hard minimum, or the
/// high quantile of a strided sample of the subtracted frame, whichever is
/// largest. The quantile adapts the floor to whatever residual energy the
/// background model is leaving behind.
pub fn weak_echo_threshold(subtracted: &[f32], tuned_floor: f64) -> f64 {
    let sample: Vec<f64> = subtracted
        .iter()
        .step_by(AQUASCAN_WEAK_ECHO_SAMPLE_STRIDE)
        .map(|v| *v as f64)
        .collect();
    let quantile = percentile(&sample, AQUASCAN_WEAK_ECHO_PERCENTILE);
    tuned_floor.max(AQUASCAN_WEAK_ECHO_MIN.max(quantile))
}

/// `mask = subtracted >= threshold`.
pub fn apply_threshold(frame: &mut FrameBuffer, threshold: f64) {
    let threshold = threshold as f32;
    for (out, value) in frame.mask.iter_mut().zip(&frame.subtracted) {
        *out = (*value >= threshold) as u8;
    }
}

/// Range-direction edge-aware majority filter with an odd window.
///
/// Each output cell is 1 iff the number of set cells in the window
/// truncated to the column exceeds half the truncated window length. The
/// count is maintained as a sliding sum along each angle row.
pub fn majority_filter_rows(src: &[u8], dst: &mut [u8], window: usize) {
    debug_assert!(window % 2 == 1);
    let half = window / 2;
    for a_idx in 0..IMAGING_FRAME_ANGLE_BINS {
        let row_start = a_idx * IMAGING_RANGE_BINS;
        let row = &src[row_start..row_start + IMAGING_RANGE_BINS];
        let out = &mut dst[row_start..row_start + IMAGING_RANGE_BINS];

        let mut sum: u32 = row.iter().take(half + 1).map(|v| *v as u32).sum();
        let mut lo = 0usize;
        let mut hi = half;
        for r in 0..IMAGING_RANGE_BINS {
            let len = (hi - lo + 1) as u32;
            out[r] = (sum > len / 2) as u8;

            // Slide: the next window is [r+1-half, r+1+half] truncated.
            if hi + 1 < IMAGING_RANGE_BINS {
                hi += 1;
                sum += row[hi] as u32;
            }
            if r + 1 > half {
                sum -= row[lo] as u32;
                lo += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_row(input: &[u8], window: usize) -> Vec<u8> {
        let mut src = vec![0u8; IMAGING_FRAME_ANGLE_BINS * IMAGING_RANGE_BINS];
        let mut dst = src.clone();
        src[..input.len()].copy_from_slice(input);
        majority_filter_rows(&src, &mut dst, window);
        dst[..input.len()].to_vec()
    }

    #[test]
    fn test_isolated_cell_is_removed() {
        let mut input = vec![0u8; 16];
        input[8] = 1;
        let out = run_row(&input, 3);
        assert!(out.iter().all(|v| *v == 0));
    }

    #[test]
    fn test_solid_run_survives_with_eroded_ends() {
        let mut input = vec![0u8; 16];
        for cell in input.iter_mut().take(11).skip(4) {
            *cell = 1;
        }
        let out = run_row(&input, 3);
        // Interior of the run survives; singleton neighborhoods at the run
        // ends hold a majority too (2 of 3).
        for (r, v) in out.iter().enumerate() {
            let expected = (4..=10).contains(&r) as u8;
            assert_eq!(*v, expected, "bin {r}");
        }
    }

    #[test]
    fn test_edge_windows_use_truncated_length() {
        // Two set cells at the column start: window at r=0 is [0, 1],
        // truncated length 2, majority needs > 1.
        let mut input = vec![0u8; 8];
        input[0] = 1;
        input[1] = 1;
        let out = run_row(&input, 3);
        assert_eq!(out[0], 1);
        assert_eq!(out[1], 1);
        assert_eq!(out[2], 0);
    }

    #[test]
    fn test_larger_window_suppresses_short_runs() {
        let mut input = vec![0u8; 32];
        for cell in input.iter_mut().take(13).skip(10) {
            *cell = 1;
        }
        let small = run_row(&input, 3);
        let large = run_row(&input, 9);
        assert!(small.iter().any(|v| *v == 1));
        assert!(large.iter().all(|v| *v == 0), "3-run cannot win a 9-window");
    }

    #[test]
    fn test_threshold_uses_tuned_floor_on_quiet_frames() {
        let subtracted = vec![0.0f32; IMAGING_FRAME_ANGLE_BINS * IMAGING_RANGE_BINS];
        let threshold = weak_echo_threshold(&subtracted, 1.05);
        assert_eq!(threshold, 1.05);
        // With a tiny tuned floor the hard minimum takes over.
        let threshold = weak_echo_threshold(&subtracted, 0.0);
        assert_eq!(threshold, AQUASCAN_WEAK_ECHO_MIN);
    }

    #[test]
    fn test_threshold_follows_hot_frames() {
        let subtracted = vec![3.0f32; IMAGING_FRAME_ANGLE_BINS * IMAGING_RANGE_BINS];
        let threshold = weak_echo_threshold(&subtracted, 1.05);
        assert_eq!(threshold, 3.0);
    }
}
