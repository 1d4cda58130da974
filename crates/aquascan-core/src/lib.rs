//! Core types and definitions for the AQUASCAN multi-sonar scanning study.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, constants, tuning, the named-stream RNG, the track filter,
//! and the serializable engine views. It has no dependency on the ECS or
//! any runtime framework.

pub mod components;
pub mod constants;
pub mod enums;
pub mod kalman;
pub mod math;
pub mod rng;
pub mod state;
pub mod tuning;
pub mod types;

#[cfg(test)]
mod tests;
