//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::math::normalize_deg;

/// 2-D position in pool space (meters). x = across, y = along the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

/// 2-D velocity (m/s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec2);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each `tick` call that advances).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    /// Range to another position in meters.
    pub fn range_to(&self, other: &Position) -> f64 {
        self.0.distance(other.0)
    }

    /// Bearing to another position in degrees (0 = +x, counter-clockwise,
    /// normalized to [0, 360)).
    pub fn bearing_deg_to(&self, other: &Position) -> f64 {
        let d = other.0 - self.0;
        normalize_deg(d.y.atan2(d.x).to_degrees())
    }
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    /// Speed magnitude (m/s).
    pub fn speed(&self) -> f64 {
        self.0.length()
    }

    /// Heading in degrees (0 = +x, counter-clockwise).
    pub fn heading_deg(&self) -> f64 {
        normalize_deg(self.0.y.atan2(self.0.x).to_degrees())
    }
}

impl SimTime {
    /// Advance by one tick of size `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Millisecond bucket of a simulation timestamp, used both to salt RNG
/// stream keys and to deduplicate update events across sonars.
pub fn time_bucket_ms(t: f64) -> u64 {
    (t.max(0.0) * 1000.0).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearing_quadrants() {
        let origin = Position::new(0.0, 0.0);
        assert!((origin.bearing_deg_to(&Position::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((origin.bearing_deg_to(&Position::new(0.0, 2.0)) - 90.0).abs() < 1e-9);
        assert!((origin.bearing_deg_to(&Position::new(-3.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((origin.bearing_deg_to(&Position::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_bucket_floors() {
        assert_eq!(time_bucket_ms(0.0), 0);
        assert_eq!(time_bucket_ms(1.2345), 1234);
        assert_eq!(time_bucket_ms(-0.5), 0);
    }
}
