//! Snapshot system: queries the ECS world and builds a complete
//! serializable `EngineSnapshot`. Read-only; never modifies the world.

use std::collections::HashMap;

use hecs::World;

use aquascan_core::components::{FrameBuffer, SonarUnit, Swimmer, SweepState};
use aquascan_core::enums::Strategy;
use aquascan_core::state::{EngineSnapshot, SonarView, SwimmerView};
use aquascan_core::types::{Position, SimTime, Velocity};

/// Build the full snapshot of the current world state.
pub fn build_snapshot(
    world: &World,
    time: SimTime,
    strategy: Strategy,
    assignments: &HashMap<u32, Vec<u32>>,
) -> EngineSnapshot {
    let mut assignments: Vec<(u32, Vec<u32>)> = assignments
        .iter()
        .map(|(sonar_id, ids)| (*sonar_id, ids.clone()))
        .collect();
    assignments.sort_by_key(|(sonar_id, _)| *sonar_id);

    EngineSnapshot {
        time,
        strategy,
        swimmers: build_swimmers(world),
        sonars: build_sonars(world),
        assignments,
    }
}

fn build_swimmers(world: &World) -> Vec<SwimmerView> {
    let mut swimmers: Vec<SwimmerView> = world
        .query::<(&Swimmer, &Position, &Velocity)>()
        .iter()
        .map(|(_, (swimmer, pos, vel))| SwimmerView {
            id: swimmer.id,
            position: pos.0,
            velocity: vel.0,
            entered_at: swimmer.entered_at,
        })
        .collect();
    swimmers.sort_by_key(|s| s.id);
    swimmers
}

fn build_sonars(world: &World) -> Vec<SonarView> {
    let mut sonars: Vec<SonarView> = world
        .query::<(&SonarUnit, &SweepState, &FrameBuffer)>()
        .iter()
        .map(|(_, (unit, sweep, frame))| SonarView {
            id: unit.id,
            position: unit.position.0,
            mount_deg: unit.mount_deg,
            current_deg: sweep.current_deg,
            target_deg: sweep.target_deg,
            mode: sweep.mode,
            scan_range_m: sweep.scan_range_m,
            cycle_duration_s: sweep.cycle_duration,
            frame_id: frame.frame_id,
            detected_points: sweep.detected_points.iter().copied().collect(),
            matched_points: sweep.matched_points.iter().copied().collect(),
        })
        .collect();
    sonars.sort_by_key(|s| s.id);
    sonars
}
