//! Per-cell EMA background model with warmup and positive-deviation slack.

use aquascan_core::components::FrameBuffer;
use aquascan_core::constants::{
    IMAGING_BACKGROUND_ALPHA, IMAGING_BACKGROUND_UPDATE_SLACK, IMAGING_RANGE_BINS,
    IMAGING_WARMUP_ALPHA,
};

/// Warmup shortcut: blend the whole frame into the background with the
/// faster alpha and consume one warmup frame. Unobserved columns are a
/// no-op because they carry the background already.
pub fn warmup_blend(frame: &mut FrameBuffer) {
    let alpha = IMAGING_WARMUP_ALPHA;
    for (bg, intensity) in frame.background.iter_mut().zip(&frame.intensity) {
        *bg = (1.0 - alpha) * *bg + alpha * *intensity;
    }
    frame.warmup_left = frame.warmup_left.saturating_sub(1);
}

/// `subtracted = max(0, intensity - background)`.
pub fn subtract(frame: &mut FrameBuffer) {
    for ((out, intensity), bg) in frame
        .subtracted
        .iter_mut()
        .zip(&frame.intensity)
        .zip(&frame.background)
    {
        *out = (intensity - bg).max(0.0);
    }
}

/// Steady-state background update over the observed columns. Cells more
/// than the slack above the background are left alone, so moving targets
/// do not burn into the model.
pub fn update(frame: &mut FrameBuffer) {
    let alpha = IMAGING_BACKGROUND_ALPHA;
    for (a_idx, observed) in frame.observed.iter().enumerate() {
        if !observed {
            continue;
        }
        let start = a_idx * IMAGING_RANGE_BINS;
        for i in start..start + IMAGING_RANGE_BINS {
            let intensity = frame.intensity[i];
            let bg = frame.background[i];
            if intensity <= bg + IMAGING_BACKGROUND_UPDATE_SLACK {
                frame.background[i] = (1.0 - alpha) * bg + alpha * intensity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquascan_core::components::FrameBuffer;

    #[test]
    fn test_warmup_converges_to_intensity() {
        let mut frame = FrameBuffer::new(10);
        frame.intensity.fill(2.0);
        for _ in 0..10 {
            warmup_blend(&mut frame);
        }
        assert_eq!(frame.warmup_left, 0);
        assert!((frame.background[0] - 2.0).abs() < 0.05);
    }

    #[test]
    fn test_subtract_is_nonnegative() {
        let mut frame = FrameBuffer::new(0);
        frame.intensity[0] = 1.0;
        frame.background[0] = 3.0;
        frame.intensity[1] = 3.0;
        frame.background[1] = 1.0;
        subtract(&mut frame);
        assert_eq!(frame.subtracted[0], 0.0);
        assert_eq!(frame.subtracted[1], 2.0);
    }

    #[test]
    fn test_update_respects_slack_and_observation() {
        let mut frame = FrameBuffer::new(0);
        frame.observed[0] = true;
        // Within slack: pulled toward intensity.
        frame.intensity[FrameBuffer::idx(0, 0)] = 0.5;
        // Above slack: left untouched.
        frame.intensity[FrameBuffer::idx(0, 1)] = 5.0;
        // Unobserved column: left untouched.
        frame.intensity[FrameBuffer::idx(1, 0)] = 0.5;
        update(&mut frame);
        assert!(frame.background[FrameBuffer::idx(0, 0)] > 0.0);
        assert_eq!(frame.background[FrameBuffer::idx(0, 1)], 0.0);
        assert_eq!(frame.background[FrameBuffer::idx(1, 0)], 0.0);
    }
}
