//! Serializable engine views: the per-tick snapshot and the sliding-window
//! evaluation metrics.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::{SonarMode, Strategy};
use crate::types::SimTime;

/// Complete externally visible engine state; built by the snapshot system,
/// sorted by id everywhere so equal states serialize identically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub time: SimTime,
    pub strategy: Strategy,
    pub swimmers: Vec<SwimmerView>,
    pub sonars: Vec<SonarView>,
    /// Optimized-strategy swimmer assignment per sonar, `(sonar_id, swimmer_ids)`.
    pub assignments: Vec<(u32, Vec<u32>)>,
}

/// One swimmer, as visible to the outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwimmerView {
    pub id: u32,
    pub position: DVec2,
    pub velocity: DVec2,
    pub entered_at: f64,
}

/// One sonar head, as visible to the outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SonarView {
    pub id: u32,
    pub position: DVec2,
    pub mount_deg: f64,
    pub current_deg: f64,
    pub target_deg: f64,
    pub mode: SonarMode,
    pub scan_range_m: f64,
    pub cycle_duration_s: f64,
    pub frame_id: u64,
    pub detected_points: Vec<DVec2>,
    pub matched_points: Vec<DVec2>,
}

/// Sliding-window evaluation metrics, as returned by the engine's
/// `metrics` query. All values are nonnegative; rates and ratios are 0
/// when undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub active_swimmers: u32,
    pub avg_aoi_sec: f64,
    pub p90_aoi_sec: f64,
    pub avg_scan_rate_hz: f64,
    pub avg_revisit_interval_sec: f64,
    pub tracking_rmse_m: f64,
    pub p90_tracking_error_m: f64,
    pub false_alarms_per_sec: f64,
    pub detection_hit_rate: f64,
    pub avg_localization_error_m: f64,
    pub p90_localization_error_m: f64,
    pub avg_time_to_first_detection_sec: f64,
    pub p90_time_to_first_detection_sec: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub mdr: f64,
    pub mean_iou: f64,
    /// Frames per second, averaged over sonars.
    pub fps: f64,
    /// Fraction of current swimmers with at least one update in the window.
    pub tracking_rate: f64,
}
