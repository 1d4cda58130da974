//! Swimmer kinematics: sinusoidal maneuvering, integration, wall bounces.

use glam::DVec2;
use hecs::World;

use aquascan_core::components::Maneuver;
use aquascan_core::constants::{POOL_LENGTH, POOL_WIDTH};
use aquascan_core::types::{Position, Velocity};

/// Advance every swimmer by `dt`, starting from simulation time `t0`.
///
/// The velocity direction is first rotated by the maneuver turn rate
/// `amp * sin(omega * (t + phase))`, then the position is integrated and
/// bounced off the pool walls. Swimmers are independent of each other.
pub fn run(world: &mut World, t0: f64, dt: f64) {
    for (_entity, (maneuver, pos, vel)) in
        world.query_mut::<(&Maneuver, &mut Position, &mut Velocity)>()
    {
        let turn = maneuver.amp * (maneuver.omega * (t0 + maneuver.phase)).sin() * dt;
        let (sin, cos) = turn.sin_cos();
        let v = vel.0;
        vel.0 = DVec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos);

        pos.0 += vel.0 * dt;

        if pos.0.x <= 0.0 {
            pos.0.x = 0.0;
            vel.0.x = vel.0.x.abs();
        } else if pos.0.x >= POOL_WIDTH {
            pos.0.x = POOL_WIDTH;
            vel.0.x = -vel.0.x.abs();
        }
        if pos.0.y <= 0.0 {
            pos.0.y = 0.0;
            vel.0.y = vel.0.y.abs();
        } else if pos.0.y >= POOL_LENGTH {
            pos.0.y = POOL_LENGTH;
            vel.0.y = -vel.0.y.abs();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(world: &mut World, pos: DVec2, vel: DVec2, amp: f64) -> hecs::Entity {
        world.spawn((
            Maneuver {
                omega: 0.3,
                phase: 0.0,
                amp,
            },
            Position(pos),
            Velocity(vel),
        ))
    }

    #[test]
    fn test_straight_swimmer_integrates() {
        let mut world = World::new();
        let e = spawn(&mut world, DVec2::new(10.0, 10.0), DVec2::new(0.0, 1.2), 0.0);
        for _ in 0..10 {
            run(&mut world, 0.0, 0.1);
        }
        let pos = world.get::<&Position>(e).unwrap().0;
        assert!((pos.y - 11.2).abs() < 1e-9);
        assert!((pos.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_wall_bounce_reflects_velocity() {
        let mut world = World::new();
        let e = spawn(&mut world, DVec2::new(0.05, 10.0), DVec2::new(-1.0, 0.0), 0.0);
        run(&mut world, 0.0, 0.1);
        let pos = world.get::<&Position>(e).unwrap().0;
        let vel = world.get::<&Velocity>(e).unwrap().0;
        assert_eq!(pos.x, 0.0);
        assert!(vel.x > 0.0, "x velocity should flip inward");
    }

    #[test]
    fn test_maneuver_preserves_speed() {
        let mut world = World::new();
        let e = spawn(&mut world, DVec2::new(10.0, 25.0), DVec2::new(0.9, 0.5), 0.4);
        let speed0 = world.get::<&Velocity>(e).unwrap().speed();
        let mut t = 0.0;
        for _ in 0..50 {
            run(&mut world, t, 0.05);
            t += 0.05;
        }
        let speed1 = world.get::<&Velocity>(e).unwrap().speed();
        assert!((speed0 - speed1).abs() < 1e-9, "rotation must not change speed");
    }
}
