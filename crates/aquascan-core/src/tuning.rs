//! Runtime-settable detection tuning.
//!
//! Every field has a fixed admissible interval; out-of-range values are
//! silently clamped when a patch is applied, never rejected.

use serde::{Deserialize, Serialize};

use crate::constants::{
    AQUASCAN_KERNEL_CAP, AQUASCAN_KERNEL_HARD_CAP, AQUASCAN_KERNEL_MIN,
    TUNING_DEFAULT_DBSCAN_EPS_BINS, TUNING_DEFAULT_DBSCAN_MIN_PTS, TUNING_DEFAULT_NOISE_SCALE,
    TUNING_DEFAULT_SPECKLE_PROB, TUNING_DEFAULT_THRESHOLD,
};

/// The active tuning of one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Noise-floor standard-deviation multiplier, clamped to [0, 5].
    pub noise_scale: f64,
    /// Per-cell speckle probability, clamped to [0, 0.5].
    pub speckle_prob: f64,
    /// Weak-echo elimination threshold floor, clamped to [0, 10].
    pub threshold: f64,
    /// DBSCAN radius in polar bins, clamped to [0.5, 12].
    pub dbscan_eps_bins: f64,
    /// DBSCAN core-point minimum, clamped to [2, 200].
    pub dbscan_min_pts: u32,
    /// Adaptive-kernel cap, clamped to [3, 13] and rounded down to odd.
    pub kernel_cap: u32,
}

/// A partial tuning update; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TuningPatch {
    pub noise_scale: Option<f64>,
    pub speckle_prob: Option<f64>,
    pub threshold: Option<f64>,
    pub dbscan_eps_bins: Option<f64>,
    pub dbscan_min_pts: Option<u32>,
    pub kernel_cap: Option<u32>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            noise_scale: TUNING_DEFAULT_NOISE_SCALE,
            speckle_prob: TUNING_DEFAULT_SPECKLE_PROB,
            threshold: TUNING_DEFAULT_THRESHOLD,
            dbscan_eps_bins: TUNING_DEFAULT_DBSCAN_EPS_BINS,
            dbscan_min_pts: TUNING_DEFAULT_DBSCAN_MIN_PTS,
            kernel_cap: AQUASCAN_KERNEL_CAP,
        }
    }
}

impl Tuning {
    /// Merge a patch, then clamp every field into its admissible interval.
    /// Returns the resulting tuning.
    pub fn apply(&mut self, patch: &TuningPatch) -> Tuning {
        if let Some(v) = patch.noise_scale {
            self.noise_scale = v;
        }
        if let Some(v) = patch.speckle_prob {
            self.speckle_prob = v;
        }
        if let Some(v) = patch.threshold {
            self.threshold = v;
        }
        if let Some(v) = patch.dbscan_eps_bins {
            self.dbscan_eps_bins = v;
        }
        if let Some(v) = patch.dbscan_min_pts {
            self.dbscan_min_pts = v;
        }
        if let Some(v) = patch.kernel_cap {
            self.kernel_cap = v;
        }
        self.clamp();
        *self
    }

    fn clamp(&mut self) {
        self.noise_scale = self.noise_scale.clamp(0.0, 5.0);
        self.speckle_prob = self.speckle_prob.clamp(0.0, 0.5);
        self.threshold = self.threshold.clamp(0.0, 10.0);
        self.dbscan_eps_bins = self.dbscan_eps_bins.clamp(0.5, 12.0);
        self.dbscan_min_pts = self.dbscan_min_pts.clamp(2, 200);
        self.kernel_cap = self
            .kernel_cap
            .clamp(AQUASCAN_KERNEL_MIN, AQUASCAN_KERNEL_HARD_CAP);
        if self.kernel_cap % 2 == 0 {
            self.kernel_cap -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_clamps_all_fields() {
        let mut tuning = Tuning::default();
        let merged = tuning.apply(&TuningPatch {
            noise_scale: Some(9.0),
            speckle_prob: Some(-1.0),
            threshold: Some(42.0),
            dbscan_eps_bins: Some(0.0),
            dbscan_min_pts: Some(1),
            kernel_cap: Some(99),
        });
        assert_eq!(merged.noise_scale, 5.0);
        assert_eq!(merged.speckle_prob, 0.0);
        assert_eq!(merged.threshold, 10.0);
        assert_eq!(merged.dbscan_eps_bins, 0.5);
        assert_eq!(merged.dbscan_min_pts, 2);
        assert_eq!(merged.kernel_cap, 13);
    }

    #[test]
    fn test_kernel_cap_rounds_down_to_odd() {
        let mut tuning = Tuning::default();
        tuning.apply(&TuningPatch {
            kernel_cap: Some(8),
            ..Default::default()
        });
        assert_eq!(tuning.kernel_cap, 7);
        tuning.apply(&TuningPatch {
            kernel_cap: Some(2),
            ..Default::default()
        });
        assert_eq!(tuning.kernel_cap, 3);
    }

    #[test]
    fn test_absent_fields_keep_values() {
        let mut tuning = Tuning::default();
        tuning.apply(&TuningPatch {
            threshold: Some(1.8),
            ..Default::default()
        });
        assert_eq!(tuning.threshold, 1.8);
        assert_eq!(tuning.noise_scale, TUNING_DEFAULT_NOISE_SCALE);
    }
}
