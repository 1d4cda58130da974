//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Sweep scheduling strategy of an engine instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Full-sector bang-bang sweep at maximum range.
    #[default]
    Naive,
    /// Track-driven adaptive sweep coordinated across sonars by PSO.
    Optimized,
}

/// Motion mode of a sonar head.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SonarMode {
    /// Emitting pings, rotating at the acoustically limited speed.
    #[default]
    Scanning,
    /// Repositioning at the mechanical slew rate, not emitting.
    Slewing,
}
