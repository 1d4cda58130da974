//! Cycle-duration cost model of an adaptive sweep.
//!
//! Estimates how long one sonar needs for a full out-and-back pass over a
//! set of targets: per-target padded scan intervals are merged, gaps between
//! merged intervals are crossed at the mechanical slew rate, and each merged
//! interval is scanned at the ping rate its range allows.

use aquascan_core::constants::{
    MAX_RANGE_NAIVE, MIN_PING_INTERVAL_S, OPT_MIN_SCAN_RANGE_M, PING360_PROCESSING_OVERHEAD_S,
    SCAN_STEP_ANGLE, SLEW_SPEED, SPEED_OF_SOUND, SWEEP_HALF_WIDTH_DEG, TARGET_PADDING_ANGLE,
    TARGET_PADDING_RANGE,
};

/// One target as seen by a sonar: sector-relative bearing and distance.
#[derive(Debug, Clone, Copy)]
pub struct ScanTarget {
    pub rel_bearing_deg: f64,
    pub range_m: f64,
}

/// Acoustic round-trip time for a commanded range.
pub fn round_trip_time(range_m: f64) -> f64 {
    2.0 * range_m / SPEED_OF_SOUND
}

/// Seconds between pings at a commanded range.
pub fn ping_interval(range_m: f64) -> f64 {
    MIN_PING_INTERVAL_S.max(round_trip_time(range_m) + PING360_PROCESSING_OVERHEAD_S)
}

/// Head rotation speed while scanning at a commanded range (deg/s).
pub fn scan_speed(range_m: f64) -> f64 {
    SCAN_STEP_ANGLE / ping_interval(range_m)
}

/// Estimated out-and-back duration over the targets (seconds); 0 with no
/// targets.
pub fn cycle_duration(targets: &[ScanTarget]) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let span = 2.0 * SWEEP_HALF_WIDTH_DEG;

    // Padded per-target intervals, sorted by start.
    let mut intervals: Vec<(f64, f64, f64)> = targets
        .iter()
        .map(|t| {
            let start = (t.rel_bearing_deg - TARGET_PADDING_ANGLE).max(0.0);
            let end = (t.rel_bearing_deg + TARGET_PADDING_ANGLE).min(span);
            let range =
                (t.range_m + TARGET_PADDING_RANGE).clamp(OPT_MIN_SCAN_RANGE_M, MAX_RANGE_NAIVE);
            (start, end, range)
        })
        .collect();
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Merge overlapping intervals; a merged interval scans at the speed its
    // farthest target allows.
    let mut merged: Vec<(f64, f64, f64)> = Vec::with_capacity(intervals.len());
    for (start, end, range) in intervals {
        match merged.last_mut() {
            Some((_, m_end, m_range)) if start <= *m_end => {
                *m_end = m_end.max(end);
                *m_range = m_range.max(range);
            }
            _ => merged.push((start, end, range)),
        }
    }

    let mut one_way = 0.0;
    let mut prev_end = merged[0].0;
    for (start, end, range) in &merged {
        one_way += (start - prev_end) / SLEW_SPEED;
        one_way += (end - start) / scan_speed(*range);
        prev_end = *end;
    }
    2.0 * one_way
}
