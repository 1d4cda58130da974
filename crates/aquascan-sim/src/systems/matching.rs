//! Candidate-to-truth association at frame finalization.
//!
//! Two independent matchings run per frame: an IoU matching over polar
//! bounding boxes (the paper metric, feeding precision/recall/F1/MDR) and a
//! Cartesian distance matching (the tracker metric, feeding the Kalman
//! updates and the localization statistics). Both are greedy and
//! one-to-one.

use glam::DVec2;

use aquascan_core::components::SonarUnit;
use aquascan_core::constants::*;

use crate::systems::imaging::Candidate;

/// One swimmer visible to a finalized frame.
#[derive(Debug, Clone, Copy)]
pub struct GroundTruth {
    pub id: u32,
    pub position: DVec2,
    pub bearing_deg: f64,
    pub range_m: f64,
}

/// Per-frame IoU-matching tallies.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaperStats {
    pub tp: u32,
    pub fp: u32,
    pub fn_: u32,
    pub iou_sum: f64,
}

/// Axis-aligned box in continuous polar-bin coordinates.
#[derive(Debug, Clone, Copy)]
struct BinBox {
    a_lo: f64,
    a_hi: f64,
    r_lo: f64,
    r_hi: f64,
}

impl BinBox {
    fn iou(&self, other: &BinBox) -> f64 {
        let a_overlap = (self.a_hi.min(other.a_hi) - self.a_lo.max(other.a_lo)).max(0.0);
        let r_overlap = (self.r_hi.min(other.r_hi) - self.r_lo.max(other.r_lo)).max(0.0);
        let inter = a_overlap * r_overlap;
        if inter <= 0.0 {
            return 0.0;
        }
        let area_a = (self.a_hi - self.a_lo) * (self.r_hi - self.r_lo);
        let area_b = (other.a_hi - other.a_lo) * (other.r_hi - other.r_lo);
        inter / (area_a + area_b - inter)
    }
}

fn candidate_box(candidate: &Candidate) -> BinBox {
    BinBox {
        a_lo: candidate.bbox.a_min as f64,
        a_hi: candidate.bbox.a_max as f64 + 1.0,
        r_lo: candidate.bbox.r_min as f64,
        r_hi: candidate.bbox.r_max as f64 + 1.0,
    }
}

/// Ground-truth box: the swimmer's angular subtense (at least the beam
/// FOV) and physical diameter (at least the blob radius), centered on its
/// true polar position.
fn truth_box(truth: &GroundTruth, sonar: &SonarUnit) -> BinBox {
    let rel_deg = sonar.relative_bearing_deg(truth.bearing_deg);
    let a_center = rel_deg / IMAGING_ANGLE_STEP_DEG;
    let r_center = truth.range_m / IMAGING_RANGE_STEP_M;

    let half_diameter = SIM_SWIMMER_DIAMETER_M / 2.0;
    let subtense_deg = (half_diameter / truth.range_m.max(half_diameter))
        .atan()
        .to_degrees();
    let a_half = (IMAGING_FOV_DEG / 2.0).max(subtense_deg) / IMAGING_ANGLE_STEP_DEG;
    let r_half = IMAGING_BLOB_RADIUS_BINS.max(half_diameter / IMAGING_RANGE_STEP_M);

    BinBox {
        a_lo: a_center - a_half,
        a_hi: a_center + a_half,
        r_lo: r_center - r_half,
        r_hi: r_center + r_half,
    }
}

/// IoU matching: greedy by descending IoU, gated by the IoU threshold and
/// the Cartesian match radius.
pub fn iou_match(
    candidates: &[Candidate],
    truths: &[GroundTruth],
    sonar: &SonarUnit,
) -> PaperStats {
    let truth_boxes: Vec<BinBox> = truths.iter().map(|t| truth_box(t, sonar)).collect();

    let mut pairs: Vec<(f64, usize, usize)> = Vec::new();
    for (ci, candidate) in candidates.iter().enumerate() {
        let c_box = candidate_box(candidate);
        for (ti, truth) in truths.iter().enumerate() {
            if candidate.position.distance(truth.position) > MATCH_GATE_RADIUS_M {
                continue;
            }
            let iou = c_box.iou(&truth_boxes[ti]);
            if iou >= AQUASCAN_IOU_MATCH_THRESHOLD {
                pairs.push((iou, ci, ti));
            }
        }
    }
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut cand_used = vec![false; candidates.len()];
    let mut truth_used = vec![false; truths.len()];
    let mut stats = PaperStats::default();
    for (iou, ci, ti) in pairs {
        if cand_used[ci] || truth_used[ti] {
            continue;
        }
        cand_used[ci] = true;
        truth_used[ti] = true;
        stats.tp += 1;
        stats.iou_sum += iou;
    }
    stats.fp = cand_used.iter().filter(|u| !**u).count() as u32;
    stats.fn_ = truth_used.iter().filter(|u| !**u).count() as u32;
    stats
}

/// Distance matching: greedy by ascending distance inside the gate.
/// Returns `(candidate index, truth index, distance)` per accepted pair.
pub fn distance_match(
    candidates: &[Candidate],
    truths: &[GroundTruth],
) -> Vec<(usize, usize, f64)> {
    let mut pairs: Vec<(f64, usize, usize)> = Vec::new();
    for (ci, candidate) in candidates.iter().enumerate() {
        for (ti, truth) in truths.iter().enumerate() {
            let dist = candidate.position.distance(truth.position);
            if dist <= MATCH_GATE_RADIUS_M {
                pairs.push((dist, ci, ti));
            }
        }
    }
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut cand_used = vec![false; candidates.len()];
    let mut truth_used = vec![false; truths.len()];
    let mut accepted = Vec::new();
    for (dist, ci, ti) in pairs {
        if cand_used[ci] || truth_used[ti] {
            continue;
        }
        cand_used[ci] = true;
        truth_used[ti] = true;
        accepted.push((ci, ti, dist));
    }
    accepted
}
