//! Frame finalization: background handling, weak-echo elimination, the
//! adaptive dual-kernel denoise search, clustering, and candidate
//! extraction.

pub mod background;
pub mod dbscan;
pub mod denoise;
pub mod extract;

use log::debug;

use aquascan_core::components::{FrameBuffer, SonarUnit};
use aquascan_core::constants::IMAGING_MAX_CLUSTERS_PER_PING;
use aquascan_core::tuning::Tuning;

pub use extract::Candidate;

/// Run the detection pipeline on a completed frame and return the surviving
/// candidates. Also advances the background model (warmup or steady-state).
pub fn finalize_frame(
    frame: &mut FrameBuffer,
    sonar: &SonarUnit,
    tuning: &Tuning,
    seed: u32,
    frame_time: f64,
    swimmer_count: usize,
) -> Vec<Candidate> {
    // Warmup shortcut: an empty pool seeds the background and emits nothing.
    if frame.warmup_left > 0 && swimmer_count == 0 {
        background::warmup_blend(frame);
        return Vec::new();
    }

    background::subtract(frame);
    let threshold = denoise::weak_echo_threshold(&frame.subtracted, tuning.threshold);
    denoise::apply_threshold(frame, threshold);

    // Adaptive dual-kernel search: grow the small kernel until a plausible
    // cluster set survives. The small kernel preserves swimmer-sized blobs;
    // the larger cross-check kernel votes down elongated noise streaks.
    let cap = tuning.kernel_cap as usize;
    let min_pts = tuning.dbscan_min_pts as usize;
    let mut survivors: Vec<extract::ClusterStats> = Vec::new();
    let mut kernel = 3usize;
    while kernel <= cap {
        denoise::majority_filter_rows(&frame.mask, &mut frame.mask_small, kernel);
        denoise::majority_filter_rows(&frame.mask, &mut frame.mask_large, cap.min(kernel + 4));

        let n = dbscan::cluster(
            &frame.mask_small,
            &mut frame.labels,
            tuning.dbscan_eps_bins,
            min_pts,
        );
        let stats = extract::cluster_stats(frame, n);
        survivors = stats
            .into_iter()
            .filter(extract::passes_physical_filter)
            .collect();
        if !survivors.is_empty() {
            break;
        }
        kernel += 2;
    }

    let candidates = if survivors.is_empty() {
        Vec::new()
    } else {
        survivors.sort_by(|a, b| {
            b.sum_intensity
                .total_cmp(&a.sum_intensity)
                .then(a.bbox.a_min.cmp(&b.bbox.a_min))
                .then(a.bbox.r_min.cmp(&b.bbox.r_min))
        });
        survivors.truncate(IMAGING_MAX_CLUSTERS_PER_PING);
        extract::build_candidates(
            &survivors, frame, sonar, tuning, threshold, seed, frame_time,
        )
    };

    background::update(frame);
    debug!(
        "sonar {} frame {}: kernel {}, {} candidate(s), threshold {:.2}",
        sonar.id,
        frame.frame_id,
        kernel.min(cap),
        candidates.len(),
        threshold
    );
    candidates
}
