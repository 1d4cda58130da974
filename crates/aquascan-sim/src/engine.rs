//! Simulation engine — the core of the study.
//!
//! `Engine` owns the hecs ECS world, the per-swimmer Kalman tracks, the
//! metric buffers, and the PSO assignment state. Two instances (one per
//! strategy) are meant to run in lockstep on a shared seed so their metric
//! histories are directly comparable. Completely headless.

use std::collections::HashMap;

use hecs::{Entity, World};
use log::debug;

use aquascan_core::components::{FrameBuffer, SonarUnit, Swimmer, SweepState};
use aquascan_core::constants::{MAX_RANGE_NAIVE, MAX_TICK_DT, PSO_UPDATE_INTERVAL};
use aquascan_core::enums::Strategy;
use aquascan_core::kalman::TrackFilter;
use aquascan_core::state::{EngineSnapshot, EvalMetrics, SonarView, SwimmerView};
use aquascan_core::tuning::{Tuning, TuningPatch};
use aquascan_core::types::{Position, SimTime, Velocity};
use aquascan_planner::plan::{PlanContext, TrackEstimate};
use aquascan_planner::{adaptive, naive, pso};

use crate::metrics::MetricStore;
use crate::systems::matching::{self, GroundTruth};
use crate::systems::sweep::{self, FrameOutcome};
use crate::systems::{movement, snapshot, SwimmerSnap};
use crate::world_setup::{self, SwimmerSpec};

/// The simulation engine. Owns the ECS world and all evaluation state.
pub struct Engine {
    strategy: Strategy,
    seed: u32,
    world: World,
    time: SimTime,
    tuning: Tuning,
    sonar_entities: Vec<Entity>,
    /// `(id, entity)` sorted by id; the stable iteration order.
    swimmer_entities: Vec<(u32, Entity)>,
    next_swimmer_id: u32,
    tracks: HashMap<u32, TrackFilter>,
    assignments: HashMap<u32, Vec<u32>>,
    last_pso_time: f64,
    last_pso_track_count: usize,
    metrics: MetricStore,
}

impl Engine {
    /// Create an engine with the given sweep strategy and seed.
    pub fn new(strategy: Strategy, seed: u32) -> Self {
        let mut world = World::new();
        let sonar_entities = world_setup::spawn_sonars(&mut world);
        Self {
            strategy,
            seed,
            world,
            time: SimTime::default(),
            tuning: Tuning::default(),
            sonar_entities,
            swimmer_entities: Vec::new(),
            next_swimmer_id: 0,
            tracks: HashMap::new(),
            assignments: HashMap::new(),
            last_pso_time: f64::NEG_INFINITY,
            last_pso_track_count: 0,
            metrics: MetricStore::new(),
        }
    }

    /// Merge a tuning patch (clamped per field) and return the result.
    pub fn set_tuning(&mut self, patch: &TuningPatch) -> Tuning {
        self.tuning.apply(patch)
    }

    pub fn tuning(&self) -> Tuning {
        self.tuning
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn time(&self) -> f64 {
        self.time.elapsed_secs
    }

    pub fn sim_time(&self) -> SimTime {
        self.time
    }

    /// Current swimmer assignment per sonar (optimized strategy only;
    /// empty otherwise or with no tracks).
    pub fn optimized_assignments(&self) -> &HashMap<u32, Vec<u32>> {
        &self.assignments
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct mutable world access, for tests that inject state mid-run.
    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Add a swimmer; omit the spec for a seeded random spawn.
    pub fn add_swimmer(&mut self, spec: Option<SwimmerSpec>) -> SwimmerView {
        let id = self.next_swimmer_id;
        self.next_swimmer_id += 1;
        let entity = world_setup::spawn_swimmer(
            &mut self.world,
            self.seed,
            id,
            self.time.elapsed_secs,
            spec,
        );
        self.swimmer_entities.push((id, entity));
        let pos = self.world.get::<&Position>(entity).unwrap().0;
        let vel = self.world.get::<&Velocity>(entity).unwrap().0;
        SwimmerView {
            id,
            position: pos,
            velocity: vel,
            entered_at: self.time.elapsed_secs,
        }
    }

    /// Remove a swimmer and its evaluation state; `false` for unknown ids.
    pub fn remove_swimmer_by_id(&mut self, id: u32) -> bool {
        let Some(index) = self.swimmer_entities.iter().position(|(sid, _)| *sid == id) else {
            return false;
        };
        let (_, entity) = self.swimmer_entities.remove(index);
        let _ = self.world.despawn(entity);
        self.tracks.remove(&id);
        self.metrics.remove_swimmer(id);
        true
    }

    /// Advance the simulation by `dt` seconds. Non-positive `dt` is a
    /// no-op; oversized steps are clamped.
    pub fn tick(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let dt = dt.min(MAX_TICK_DT);
        let t0 = self.time.elapsed_secs;

        movement::run(&mut self.world, t0, dt);
        let roster = self.collect_roster();
        let estimates = self.track_estimates(t0);

        for entity in self.sonar_entities.clone() {
            let outcome = self.run_sonar(entity, &roster, &estimates, t0, dt);
            if let Some(outcome) = outcome {
                self.process_frame(entity, outcome, &roster);
            }
        }

        if self.strategy == Strategy::Optimized {
            self.maybe_run_pso(t0, &estimates);
        }

        self.metrics.prune(t0 + dt);
        self.time.advance(dt);
    }

    /// Roll up the evaluation metrics over the trailing `window_sec`.
    pub fn metrics(&self, window_sec: f64) -> EvalMetrics {
        let roster = self.collect_roster();
        self.metrics
            .compute(window_sec, self.time.elapsed_secs, &roster)
    }

    /// Build the complete serializable view of the engine.
    pub fn snapshot(&self) -> EngineSnapshot {
        snapshot::build_snapshot(&self.world, self.time, self.strategy, &self.assignments)
    }

    pub fn swimmers(&self) -> Vec<SwimmerView> {
        self.snapshot().swimmers
    }

    pub fn sonars(&self) -> Vec<SonarView> {
        self.snapshot().sonars
    }

    /// Plan and advance one sonar; returns a finalized frame, if any.
    fn run_sonar(
        &mut self,
        entity: Entity,
        roster: &[SwimmerSnap],
        estimates: &[TrackEstimate],
        t0: f64,
        dt: f64,
    ) -> Option<FrameOutcome> {
        let unit = *self.world.get::<&SonarUnit>(entity).unwrap();
        let (current_deg, last_dir, window) = {
            let sweep = self.world.get::<&SweepState>(entity).unwrap();
            (sweep.current_deg, sweep.last_dir, sweep.window)
        };

        let decision = match self.strategy {
            Strategy::Naive => naive::plan(&unit, current_deg, last_dir),
            Strategy::Optimized => adaptive::plan(&PlanContext {
                sonar: &unit,
                current_deg,
                last_dir,
                window,
                now: t0,
                tracks: estimates,
                assigned: self.assignments.get(&unit.id).map(|ids| ids.as_slice()),
            }),
        };

        let (sweep, frame) = self
            .world
            .query_one_mut::<(&mut SweepState, &mut FrameBuffer)>(entity)
            .unwrap();
        sweep::run_sonar(
            &unit,
            sweep,
            frame,
            &decision,
            &self.tuning,
            self.seed,
            t0,
            dt,
            roster,
        )
    }

    /// Evaluate a finalized frame: matchings, tracker updates, metrics,
    /// and the visualization FIFOs.
    fn process_frame(&mut self, entity: Entity, outcome: FrameOutcome, roster: &[SwimmerSnap]) {
        let unit = *self.world.get::<&SonarUnit>(entity).unwrap();
        let t = outcome.frame_time;
        self.metrics.record_frame(outcome.sonar_id, t);

        // Ground truth: every swimmer inside the 90 deg sector and within
        // MAX_RANGE_NAIVE at frame-end time, independent of the angular
        // window and range the sweep actually covered.
        let truths: Vec<GroundTruth> = roster
            .iter()
            .filter_map(|snap| {
                let pos = Position(snap.position);
                let bearing = unit.position.bearing_deg_to(&pos);
                if !unit.covers_bearing(bearing) {
                    return None;
                }
                let range = unit.position.range_to(&pos);
                if range > MAX_RANGE_NAIVE {
                    return None;
                }
                Some(GroundTruth {
                    id: snap.id,
                    position: snap.position,
                    bearing_deg: bearing,
                    range_m: range,
                })
            })
            .collect();

        let paper = matching::iou_match(&outcome.candidates, &truths, &unit);
        self.metrics.record_paper(t, paper);

        let accepted = matching::distance_match(&outcome.candidates, &truths);
        let unmatched = outcome.candidates.len() - accepted.len();
        self.metrics.record_false_alarms(t, unmatched as u32);
        self.metrics
            .record_detection_stats(t, truths.len() as u32, accepted.len() as u32);

        for (ci, ti, error) in &accepted {
            let candidate = &outcome.candidates[*ci];
            let truth = &truths[*ti];
            self.metrics.record_update(truth.id, t);
            self.metrics.record_localization_error(t, *error);

            let track = self
                .tracks
                .entry(truth.id)
                .or_insert_with(|| TrackFilter::new(candidate.position, candidate.meas_sigma, t));
            track.predict_to(t);
            track.update(candidate.position, candidate.meas_sigma);
            self.metrics
                .record_tracking_error(t, track.position().distance(truth.position));
        }

        let mut sweep = self.world.get::<&mut SweepState>(entity).unwrap();
        for candidate in &outcome.candidates {
            sweep.push_detected(candidate.position);
        }
        for (ci, _, _) in &accepted {
            sweep.push_matched(outcome.candidates[*ci].position);
        }
    }

    /// Replan the swarm assignment on the update interval or whenever the
    /// track count changes.
    fn maybe_run_pso(&mut self, now: f64, estimates: &[TrackEstimate]) {
        let track_count = estimates.len();
        let due = now - self.last_pso_time >= PSO_UPDATE_INTERVAL
            || track_count != self.last_pso_track_count;
        if !due {
            return;
        }
        let units: Vec<SonarUnit> = self
            .sonar_entities
            .iter()
            .map(|e| *self.world.get::<&SonarUnit>(*e).unwrap())
            .collect();
        self.assignments = pso::assign(self.seed, now, &units, estimates);
        self.last_pso_time = now;
        self.last_pso_track_count = track_count;
        debug!(
            "pso replan at {now:.2}s: {} track(s) over {} sonar(s)",
            track_count,
            self.assignments.len()
        );
    }

    /// Sample all swimmers, sorted by id.
    fn collect_roster(&self) -> Vec<SwimmerSnap> {
        let mut roster: Vec<SwimmerSnap> = self
            .world
            .query::<(&Swimmer, &Position)>()
            .iter()
            .map(|(_, (swimmer, pos))| SwimmerSnap {
                id: swimmer.id,
                position: pos.0,
                entered_at: swimmer.entered_at,
            })
            .collect();
        roster.sort_by_key(|s| s.id);
        roster
    }

    /// Kalman-predicted positions of all tracks at `now`, sorted by id.
    /// The planners and the PSO see targets only through these.
    fn track_estimates(&self, now: f64) -> Vec<TrackEstimate> {
        let mut ids: Vec<u32> = self.tracks.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
            .map(|id| TrackEstimate {
                id,
                position: self.tracks[&id].predicted_position(now),
            })
            .collect()
    }
}
