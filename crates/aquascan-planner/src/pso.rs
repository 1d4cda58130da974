//! Particle-swarm assignment of tracked swimmers to sonars.
//!
//! One continuous decision variable per track in `[0, m-1]`, rounded to a
//! sonar index. The cost is the slowest sonar's estimated cycle duration
//! plus a fixed penalty per out-of-sector assignment, so the swarm balances
//! load while respecting sector coverage. Streams are keyed by the replan
//! bucket and the track count, which makes every replan reproducible.

use std::collections::HashMap;

use rand::Rng;

use aquascan_core::components::SonarUnit;
use aquascan_core::constants::{
    PSO_COGNITIVE, PSO_INERTIA, PSO_INVALID_PENALTY, PSO_ITERATIONS, PSO_SOCIAL, PSO_SWARM_SIZE,
    PSO_UPDATE_INTERVAL,
};
use aquascan_core::rng::StreamRng;
use aquascan_core::types::Position;

use crate::cycle::{cycle_duration, ScanTarget};
use crate::plan::TrackEstimate;

/// How one sonar sees one track: coverage flag plus the scan geometry.
#[derive(Debug, Clone, Copy)]
struct Visibility {
    covered: bool,
    target: ScanTarget,
}

/// Assign tracks to sonars; returns `sonar_id -> swimmer ids` (ascending).
/// Empty input yields an empty map.
pub fn assign(
    seed: u32,
    now: f64,
    sonars: &[SonarUnit],
    tracks: &[TrackEstimate],
) -> HashMap<u32, Vec<u32>> {
    if tracks.is_empty() || sonars.is_empty() {
        return HashMap::new();
    }

    let vis = visibility(sonars, tracks);
    let m = sonars.len();
    let dims = tracks.len();
    let hi = (m - 1) as f64;

    let bucket = (now / PSO_UPDATE_INTERVAL).floor() as i64;
    let mut rng = StreamRng::stream(
        seed,
        &["pso", &bucket.to_string(), &tracks.len().to_string()],
    );

    let mut positions: Vec<Vec<f64>> = Vec::with_capacity(PSO_SWARM_SIZE);
    let mut velocities: Vec<Vec<f64>> = Vec::with_capacity(PSO_SWARM_SIZE);
    for _ in 0..PSO_SWARM_SIZE {
        positions.push((0..dims).map(|_| rng.gen_range(0.0..=hi.max(1e-9))).collect());
        velocities.push((0..dims).map(|_| rng.gen_range(-0.5..0.5) * hi.max(1.0)).collect());
    }

    let mut best_positions = positions.clone();
    let mut best_costs: Vec<f64> = positions
        .iter()
        .map(|p| cost(p, &vis, sonars, tracks))
        .collect();
    let mut g_best = 0;
    for i in 1..PSO_SWARM_SIZE {
        if best_costs[i] < best_costs[g_best] {
            g_best = i;
        }
    }
    let mut g_best_position = best_positions[g_best].clone();
    let mut g_best_cost = best_costs[g_best];

    for _ in 0..PSO_ITERATIONS {
        for i in 0..PSO_SWARM_SIZE {
            for d in 0..dims {
                let r1: f64 = rng.gen();
                let r2: f64 = rng.gen();
                velocities[i][d] = PSO_INERTIA * velocities[i][d]
                    + PSO_COGNITIVE * r1 * (best_positions[i][d] - positions[i][d])
                    + PSO_SOCIAL * r2 * (g_best_position[d] - positions[i][d]);
                positions[i][d] = (positions[i][d] + velocities[i][d]).clamp(0.0, hi);
            }
            let c = cost(&positions[i], &vis, sonars, tracks);
            if c < best_costs[i] {
                best_costs[i] = c;
                best_positions[i] = positions[i].clone();
                if c < g_best_cost {
                    g_best_cost = c;
                    g_best_position = positions[i].clone();
                }
            }
        }
    }

    decode(&g_best_position, &vis, sonars, tracks)
}

/// Precompute per-sonar, per-track coverage and scan geometry.
fn visibility(sonars: &[SonarUnit], tracks: &[TrackEstimate]) -> Vec<Vec<Visibility>> {
    sonars
        .iter()
        .map(|sonar| {
            tracks
                .iter()
                .map(|track| {
                    let pos = Position(track.position);
                    let bearing = sonar.position.bearing_deg_to(&pos);
                    Visibility {
                        covered: sonar.covers_bearing(bearing),
                        target: ScanTarget {
                            rel_bearing_deg: sonar.relative_bearing_deg(bearing),
                            range_m: sonar.position.range_to(&pos),
                        },
                    }
                })
                .collect()
        })
        .collect()
}

/// Slowest-sonar cycle duration plus the invalid-assignment penalty.
fn cost(
    position: &[f64],
    vis: &[Vec<Visibility>],
    sonars: &[SonarUnit],
    tracks: &[TrackEstimate],
) -> f64 {
    let mut per_sonar: Vec<Vec<ScanTarget>> = vec![Vec::new(); sonars.len()];
    let mut invalid = 0u32;
    for (d, _track) in tracks.iter().enumerate() {
        let idx = decode_index(position[d], sonars.len());
        let v = vis[idx][d];
        if v.covered {
            per_sonar[idx].push(v.target);
        } else {
            invalid += 1;
        }
    }
    let slowest = per_sonar
        .iter()
        .map(|targets| cycle_duration(targets))
        .fold(0.0, f64::max);
    slowest + PSO_INVALID_PENALTY * invalid as f64
}

fn decode_index(value: f64, m: usize) -> usize {
    (value.round() as usize).min(m - 1)
}

/// Decode the best particle into the assignment map. A track whose rounded
/// sonar cannot cover it falls back to the closest sonar.
fn decode(
    position: &[f64],
    vis: &[Vec<Visibility>],
    sonars: &[SonarUnit],
    tracks: &[TrackEstimate],
) -> HashMap<u32, Vec<u32>> {
    let mut assignments: HashMap<u32, Vec<u32>> = HashMap::new();
    for (d, track) in tracks.iter().enumerate() {
        let mut idx = decode_index(position[d], sonars.len());
        if !vis[idx][d].covered {
            idx = closest_sonar(vis, d);
        }
        assignments.entry(sonars[idx].id).or_default().push(track.id);
    }
    for ids in assignments.values_mut() {
        ids.sort_unstable();
    }
    assignments
}

fn closest_sonar(vis: &[Vec<Visibility>], track_idx: usize) -> usize {
    let mut best = 0;
    for (idx, per_track) in vis.iter().enumerate() {
        if per_track[track_idx].target.range_m < vis[best][track_idx].target.range_m {
            best = idx;
        }
    }
    best
}
