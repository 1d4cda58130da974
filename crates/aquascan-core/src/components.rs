//! ECS components for hecs entities.
//!
//! Components are plain data; behavior lives in the sim crate's systems.
//! `Position` and `Velocity` from `types` are used as components as well.

use std::collections::VecDeque;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::{
    IMAGING_FRAME_ANGLE_BINS, IMAGING_RANGE_BINS, SWEEP_HALF_WIDTH_DEG, VIS_POINT_BUFFER,
};
use crate::enums::SonarMode;
use crate::math::angle_diff_deg;
use crate::types::Position;

/// Identity of a swimmer entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Swimmer {
    /// Stable id, unique for the engine's lifetime.
    pub id: u32,
    /// Simulation time at which the swimmer entered the pool.
    pub entered_at: f64,
}

/// Sinusoidal maneuver parameters: the velocity direction is perturbed each
/// tick by `amp * sin(omega * (t + phase)) * dt`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Maneuver {
    pub omega: f64,
    pub phase: f64,
    pub amp: f64,
}

/// Fixed mounting of one sonar: corner position and inward mount bearing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SonarUnit {
    pub id: u32,
    pub position: Position,
    /// Mount bearing in degrees; the sector is `mount ± 45°`.
    pub mount_deg: f64,
}

impl SonarUnit {
    /// Lower absolute bound of the mechanical sector (degrees).
    pub fn sector_min_deg(&self) -> f64 {
        self.mount_deg - SWEEP_HALF_WIDTH_DEG
    }

    /// Upper absolute bound of the mechanical sector (degrees).
    pub fn sector_max_deg(&self) -> f64 {
        self.mount_deg + SWEEP_HALF_WIDTH_DEG
    }

    /// Whether an absolute bearing falls inside the sector.
    pub fn covers_bearing(&self, bearing_deg: f64) -> bool {
        angle_diff_deg(bearing_deg, self.mount_deg).abs() <= SWEEP_HALF_WIDTH_DEG
    }

    /// Bearing relative to the sector start, in `[0, 90]` when covered.
    pub fn relative_bearing_deg(&self, bearing_deg: f64) -> f64 {
        angle_diff_deg(bearing_deg, self.sector_min_deg())
    }
}

/// Sweep bounds the adaptive planner is currently holding, with the time
/// they were last recomputed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SweepWindow {
    pub min_deg: f64,
    pub max_deg: f64,
    pub updated_at: f64,
}

/// Mutable motion state of one sonar head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepState {
    /// Absolute head angle (degrees).
    pub current_deg: f64,
    /// Commanded sweep target (degrees).
    pub target_deg: f64,
    pub mode: SonarMode,
    /// Commanded maximum range (meters).
    pub scan_range_m: f64,
    /// Seconds accumulated toward the next ping while scanning.
    pub ping_accumulator: f64,
    /// Last nonzero sweep direction, +1.0 or -1.0.
    pub last_dir: f64,
    /// Time the last frame of this sonar was finalized.
    pub last_scan_time: f64,
    /// Duration of the last completed frame (seconds).
    pub cycle_duration: f64,
    /// Sweep bounds held by the adaptive planner, if any.
    pub window: Option<SweepWindow>,
    /// Recent candidate positions, for visualization (FIFO, capped).
    pub detected_points: VecDeque<DVec2>,
    /// Recent matched candidate positions, for visualization (FIFO, capped).
    pub matched_points: VecDeque<DVec2>,
}

impl SweepState {
    /// Initial state: head parked on the mount bearing, scanning outward.
    pub fn new(mount_deg: f64, scan_range_m: f64) -> Self {
        Self {
            current_deg: mount_deg,
            target_deg: mount_deg + SWEEP_HALF_WIDTH_DEG,
            mode: SonarMode::Scanning,
            scan_range_m,
            ping_accumulator: 0.0,
            last_dir: 1.0,
            last_scan_time: 0.0,
            cycle_duration: 0.0,
            window: None,
            detected_points: VecDeque::new(),
            matched_points: VecDeque::new(),
        }
    }

    /// Push onto a capped visualization FIFO.
    pub fn push_detected(&mut self, p: DVec2) {
        if self.detected_points.len() == VIS_POINT_BUFFER {
            self.detected_points.pop_front();
        }
        self.detected_points.push_back(p);
    }

    pub fn push_matched(&mut self, p: DVec2) {
        if self.matched_points.len() == VIS_POINT_BUFFER {
            self.matched_points.pop_front();
        }
        self.matched_points.push_back(p);
    }
}

/// Per-sonar polar frame storage, reused across frames.
///
/// Layout: `index = a_idx * IMAGING_RANGE_BINS + r_idx`. The background
/// persists across frames; everything else is scratch for the frame being
/// accumulated or for the detection pipeline.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub intensity: Vec<f32>,
    pub background: Vec<f32>,
    pub subtracted: Vec<f32>,
    pub mask: Vec<u8>,
    pub mask_small: Vec<u8>,
    pub mask_large: Vec<u8>,
    /// Cluster labels: 0 unvisited, -1 noise, >= 1 cluster id.
    pub labels: Vec<i32>,
    /// Whether each angle column received at least one ping this frame.
    pub observed: Vec<bool>,
    /// Frames still to be consumed solely for background seeding.
    pub warmup_left: u32,
    /// Monotonically increasing frame counter, salts RNG streams.
    pub frame_id: u64,
    /// Simulation time the current frame began.
    pub started_at: f64,
}

impl FrameBuffer {
    pub const CELLS: usize = IMAGING_FRAME_ANGLE_BINS * IMAGING_RANGE_BINS;

    pub fn new(warmup_frames: u32) -> Self {
        Self {
            intensity: vec![0.0; Self::CELLS],
            background: vec![0.0; Self::CELLS],
            subtracted: vec![0.0; Self::CELLS],
            mask: vec![0; Self::CELLS],
            mask_small: vec![0; Self::CELLS],
            mask_large: vec![0; Self::CELLS],
            labels: vec![0; Self::CELLS],
            observed: vec![false; IMAGING_FRAME_ANGLE_BINS],
            warmup_left: warmup_frames,
            frame_id: 0,
            started_at: 0.0,
        }
    }

    #[inline]
    pub fn idx(a_idx: usize, r_idx: usize) -> usize {
        a_idx * IMAGING_RANGE_BINS + r_idx
    }

    /// Start a new frame: unobserved columns carry the background forward so
    /// subtraction stays zero there.
    pub fn begin_frame(&mut self, now: f64) {
        self.intensity.copy_from_slice(&self.background);
        self.observed.fill(false);
        self.frame_id += 1;
        self.started_at = now;
    }

    /// Number of angle columns observed this frame.
    pub fn observed_columns(&self) -> usize {
        self.observed.iter().filter(|o| **o).count()
    }
}
