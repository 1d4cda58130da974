//! Sliding-window evaluation buffers and the metric roll-up.
//!
//! Every entry is tagged with its simulation time and pruned to a fixed
//! retention horizon; `compute` answers a `metrics(window)` query from
//! whatever is retained. The engine owns one store per instance, next to
//! the world, the same way the teacher sim owns its score state.

use std::collections::{BTreeMap, HashMap, VecDeque};

use aquascan_core::constants::{
    METRICS_RETENTION_SEC, SONAR_COUNT, UPDATE_DEDUPE_BUCKET_MS,
};
use aquascan_core::math::{mean, percentile};
use aquascan_core::state::EvalMetrics;
use aquascan_core::types::time_bucket_ms;

use crate::systems::matching::PaperStats;
use crate::systems::SwimmerSnap;

/// Timestamped evaluation buffers for one engine instance.
#[derive(Debug, Default)]
pub struct MetricStore {
    false_alarms: VecDeque<(f64, u32)>,
    /// `(t, opportunities, hits)` per finalized frame.
    det_stats: VecDeque<(f64, u32, u32)>,
    /// `(t, tp, fp, fn, iou_sum)` per finalized frame.
    paper: VecDeque<(f64, PaperStats)>,
    frame_times: BTreeMap<u32, VecDeque<f64>>,
    loc_errors: VecDeque<(f64, f64)>,
    track_errors: VecDeque<(f64, f64)>,
    last_seen: HashMap<u32, f64>,
    update_times: HashMap<u32, VecDeque<f64>>,
    /// Last dedupe bucket per swimmer, collapsing same-instant updates
    /// from different sonars into one event.
    last_bucket: HashMap<u32, u64>,
    first_detection: HashMap<u32, f64>,
}

impl MetricStore {
    pub fn new() -> Self {
        let mut store = Self::default();
        for sonar_id in 0..SONAR_COUNT as u32 {
            store.frame_times.insert(sonar_id, VecDeque::new());
        }
        store
    }

    pub fn record_frame(&mut self, sonar_id: u32, t: f64) {
        self.frame_times.entry(sonar_id).or_default().push_back(t);
    }

    pub fn record_false_alarms(&mut self, t: f64, count: u32) {
        self.false_alarms.push_back((t, count));
    }

    pub fn record_detection_stats(&mut self, t: f64, opportunities: u32, hits: u32) {
        self.det_stats.push_back((t, opportunities, hits));
    }

    pub fn record_paper(&mut self, t: f64, stats: PaperStats) {
        self.paper.push_back((t, stats));
    }

    pub fn record_localization_error(&mut self, t: f64, error_m: f64) {
        self.loc_errors.push_back((t, error_m));
    }

    pub fn record_tracking_error(&mut self, t: f64, error_m: f64) {
        self.track_errors.push_back((t, error_m));
    }

    /// Record an accepted distance match for a swimmer.
    pub fn record_update(&mut self, swimmer_id: u32, t: f64) {
        self.last_seen.insert(swimmer_id, t);
        self.first_detection.entry(swimmer_id).or_insert(t);
        let bucket = time_bucket_ms(t) / UPDATE_DEDUPE_BUCKET_MS;
        if self.last_bucket.insert(swimmer_id, bucket) != Some(bucket) {
            self.update_times.entry(swimmer_id).or_default().push_back(t);
        }
    }

    /// Drop everything older than the retention horizon.
    pub fn prune(&mut self, now: f64) {
        let cutoff = now - METRICS_RETENTION_SEC;
        prune_deque(&mut self.false_alarms, cutoff, |e| e.0);
        prune_deque(&mut self.det_stats, cutoff, |e| e.0);
        prune_deque(&mut self.paper, cutoff, |e| e.0);
        prune_deque(&mut self.loc_errors, cutoff, |e| e.0);
        prune_deque(&mut self.track_errors, cutoff, |e| e.0);
        for times in self.frame_times.values_mut() {
            prune_deque(times, cutoff, |t| *t);
        }
        for times in self.update_times.values_mut() {
            prune_deque(times, cutoff, |t| *t);
        }
    }

    /// Forget a removed swimmer's per-swimmer state.
    pub fn remove_swimmer(&mut self, swimmer_id: u32) {
        self.last_seen.remove(&swimmer_id);
        self.update_times.remove(&swimmer_id);
        self.last_bucket.remove(&swimmer_id);
        self.first_detection.remove(&swimmer_id);
    }

    /// Roll up the metrics over the trailing `window` seconds at `now`.
    pub fn compute(&self, window: f64, now: f64, roster: &[SwimmerSnap]) -> EvalMetrics {
        let window = window.clamp(f64::MIN_POSITIVE, METRICS_RETENTION_SEC);
        let cutoff = now - window;

        let mut metrics = EvalMetrics {
            active_swimmers: roster.len() as u32,
            ..Default::default()
        };

        // Age of information per current swimmer; never-seen swimmers age
        // from their entry time.
        let aoi: Vec<f64> = roster
            .iter()
            .map(|s| now - self.last_seen.get(&s.id).copied().unwrap_or(s.entered_at))
            .collect();
        metrics.avg_aoi_sec = mean(&aoi);
        metrics.p90_aoi_sec = percentile(&aoi, 0.9);

        // Update cadence.
        let mut revisit_gaps: Vec<f64> = Vec::new();
        let mut update_counts: Vec<f64> = Vec::new();
        let mut tracked = 0u32;
        for snap in roster {
            let times: Vec<f64> = self
                .update_times
                .get(&snap.id)
                .map(|q| q.iter().copied().filter(|t| *t >= cutoff).collect())
                .unwrap_or_default();
            update_counts.push(times.len() as f64);
            if !times.is_empty() {
                tracked += 1;
            }
            for pair in times.windows(2) {
                revisit_gaps.push(pair[1] - pair[0]);
            }
        }
        metrics.avg_scan_rate_hz = mean(&update_counts) / window;
        metrics.avg_revisit_interval_sec = mean(&revisit_gaps);
        if !roster.is_empty() {
            metrics.tracking_rate = tracked as f64 / roster.len() as f64;
        }

        // Tracking and localization error.
        let track_errors: Vec<f64> = windowed(&self.track_errors, cutoff);
        if !track_errors.is_empty() {
            let mse = track_errors.iter().map(|e| e * e).sum::<f64>() / track_errors.len() as f64;
            metrics.tracking_rmse_m = mse.sqrt();
            metrics.p90_tracking_error_m = percentile(&track_errors, 0.9);
        }
        let loc_errors: Vec<f64> = windowed(&self.loc_errors, cutoff);
        metrics.avg_localization_error_m = mean(&loc_errors);
        metrics.p90_localization_error_m = percentile(&loc_errors, 0.9);

        // False alarms and detection opportunities.
        let false_alarms: u32 = self
            .false_alarms
            .iter()
            .filter(|(t, _)| *t >= cutoff)
            .map(|(_, n)| n)
            .sum();
        metrics.false_alarms_per_sec = false_alarms as f64 / window;
        let (mut opportunities, mut hits) = (0u32, 0u32);
        for (t, opp, hit) in &self.det_stats {
            if *t >= cutoff {
                opportunities += opp;
                hits += hit;
            }
        }
        if opportunities > 0 {
            metrics.detection_hit_rate = hits as f64 / opportunities as f64;
        }

        // Paper-style detection tallies.
        let (mut tp, mut fp, mut fn_, mut iou_sum) = (0u32, 0u32, 0u32, 0.0f64);
        for (t, stats) in &self.paper {
            if *t >= cutoff {
                tp += stats.tp;
                fp += stats.fp;
                fn_ += stats.fn_;
                iou_sum += stats.iou_sum;
            }
        }
        if tp + fp > 0 {
            metrics.precision = tp as f64 / (tp + fp) as f64;
        }
        if tp + fn_ > 0 {
            metrics.recall = tp as f64 / (tp + fn_) as f64;
            metrics.mdr = fn_ as f64 / (tp + fn_) as f64;
        }
        if metrics.precision + metrics.recall > 0.0 {
            metrics.f1 = 2.0 * metrics.precision * metrics.recall
                / (metrics.precision + metrics.recall);
        }
        if tp > 0 {
            metrics.mean_iou = iou_sum / tp as f64;
        }

        // Frames per second, averaged over sonars.
        let fps: Vec<f64> = self
            .frame_times
            .values()
            .map(|times| times.iter().filter(|t| **t >= cutoff).count() as f64 / window)
            .collect();
        metrics.fps = mean(&fps);

        // Time to first detection over swimmers that entered in the window;
        // undetected swimmers are censored at `now`.
        let ttfd: Vec<f64> = roster
            .iter()
            .filter(|s| s.entered_at >= cutoff)
            .map(|s| {
                self.first_detection
                    .get(&s.id)
                    .map(|t| t - s.entered_at)
                    .unwrap_or(now - s.entered_at)
            })
            .collect();
        metrics.avg_time_to_first_detection_sec = mean(&ttfd);
        metrics.p90_time_to_first_detection_sec = percentile(&ttfd, 0.9);

        metrics
    }
}

fn prune_deque<T>(queue: &mut VecDeque<T>, cutoff: f64, time_of: impl Fn(&T) -> f64) {
    while let Some(front) = queue.front() {
        if time_of(front) < cutoff {
            queue.pop_front();
        } else {
            break;
        }
    }
}

fn windowed(entries: &VecDeque<(f64, f64)>, cutoff: f64) -> Vec<f64> {
    entries
        .iter()
        .filter(|(t, _)| *t >= cutoff)
        .map(|(_, v)| *v)
        .collect()
}
