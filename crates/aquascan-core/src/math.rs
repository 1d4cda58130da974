//! Angle and small statistics helpers shared by the imaging pipeline,
//! planners, and metric roll-up.

use glam::DVec2;

/// Normalize an absolute angle to [0, 360).
pub fn normalize_deg(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Signed angular difference `a - b`, normalized to [-180, 180).
pub fn angle_diff_deg(a: f64, b: f64) -> f64 {
    (a - b + 180.0).rem_euclid(360.0) - 180.0
}

/// Unit direction vector of an angle in degrees.
pub fn dir_from_deg(deg: f64) -> DVec2 {
    let r = deg.to_radians();
    DVec2::new(r.cos(), r.sin())
}

/// Move `current` toward `target` by at most `step` (all degrees, along the
/// short signed difference). Snaps on arrival.
pub fn move_toward_deg(current: f64, target: f64, step: f64) -> f64 {
    let diff = angle_diff_deg(target, current);
    if diff.abs() <= step {
        target
    } else {
        current + step.copysign(diff)
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linearly interpolated quantile of unsorted data, `q` in [0, 1].
/// Returns 0 for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_diff_wraps() {
        assert!((angle_diff_deg(350.0, 10.0) - (-20.0)).abs() < 1e-9);
        assert!((angle_diff_deg(10.0, 350.0) - 20.0).abs() < 1e-9);
        assert!((angle_diff_deg(180.0, 0.0) - (-180.0)).abs() < 1e-9);
    }

    #[test]
    fn test_move_toward_snaps() {
        assert!((move_toward_deg(44.5, 45.0, 2.0) - 45.0).abs() < 1e-9);
        assert!((move_toward_deg(0.0, 90.0, 30.0) - 30.0).abs() < 1e-9);
        // Shortest path across the wraparound.
        assert!((move_toward_deg(359.0, 2.0, 1.0) - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_interpolates() {
        let v = [4.0, 1.0, 3.0, 2.0];
        assert!((percentile(&v, 0.0) - 1.0).abs() < 1e-9);
        assert!((percentile(&v, 1.0) - 4.0).abs() < 1e-9);
        assert!((percentile(&v, 0.5) - 2.5).abs() < 1e-9);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }
}
