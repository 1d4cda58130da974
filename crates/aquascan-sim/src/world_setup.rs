//! Entity spawn factories for setting up the simulation world.
//!
//! Creates the four corner sonar units with their frame buffers, and
//! swimmer entities with kinematics drawn from per-swimmer named streams.

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;

use aquascan_core::components::{FrameBuffer, Maneuver, SonarUnit, Swimmer, SweepState};
use aquascan_core::constants::*;
use aquascan_core::math::dir_from_deg;
use aquascan_core::rng::StreamRng;
use aquascan_core::types::{Position, Velocity};

/// Caller-specified initial swimmer state; omit for a random spawn.
#[derive(Debug, Clone, Copy)]
pub struct SwimmerSpec {
    pub position: DVec2,
    pub velocity: DVec2,
}

/// Spawn the four corner sonars, mounted pointing inward. Returns the
/// entities in sonar-id order.
pub fn spawn_sonars(world: &mut World) -> Vec<Entity> {
    let mounts = [
        (Position::new(0.0, 0.0), 45.0),
        (Position::new(POOL_WIDTH, 0.0), 135.0),
        (Position::new(POOL_WIDTH, POOL_LENGTH), 225.0),
        (Position::new(0.0, POOL_LENGTH), 315.0),
    ];
    mounts
        .iter()
        .enumerate()
        .map(|(id, (position, mount_deg))| {
            world.spawn((
                SonarUnit {
                    id: id as u32,
                    position: *position,
                    mount_deg: *mount_deg,
                },
                SweepState::new(*mount_deg, MAX_RANGE_NAIVE),
                FrameBuffer::new(IMAGING_BACKGROUND_WARMUP_FRAMES),
            ))
        })
        .collect()
}

/// Spawn one swimmer. With no spec, position and velocity come from the
/// swimmer's `spawn` stream; the maneuver parameters always come from the
/// `maneuver` stream so a caller-specified swimmer still wanders.
pub fn spawn_swimmer(
    world: &mut World,
    seed: u32,
    id: u32,
    now: f64,
    spec: Option<SwimmerSpec>,
) -> Entity {
    let spec = spec.unwrap_or_else(|| {
        let mut rng = StreamRng::stream(seed, &["spawn", &id.to_string()]);
        let position = DVec2::new(
            rng.gen_range(0.0..POOL_WIDTH),
            rng.gen_range(0.0..POOL_LENGTH),
        );
        let speed = rng.gen_range(SWIMMER_SPEED_MIN..SWIMMER_SPEED_MAX);
        let heading_deg: f64 = rng.gen_range(0.0..360.0);
        SwimmerSpec {
            position,
            velocity: dir_from_deg(heading_deg) * speed,
        }
    });

    let mut rng = StreamRng::stream(seed, &["maneuver", &id.to_string()]);
    let maneuver = Maneuver {
        omega: rng.gen_range(MANEUVER_OMEGA_MIN..MANEUVER_OMEGA_MAX),
        phase: rng.gen_range(0.0..std::f64::consts::TAU),
        amp: rng.gen_range(MANEUVER_AMP_MIN..MANEUVER_AMP_MAX),
    };

    world.spawn((
        Swimmer {
            id,
            entered_at: now,
        },
        Position(spec.position.clamp(
            DVec2::ZERO,
            DVec2::new(POOL_WIDTH, POOL_LENGTH),
        )),
        Velocity(spec.velocity),
        maneuver,
    ))
}
