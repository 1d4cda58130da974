//! Simulation constants and tuning parameters.

// --- Pool & swimmers ---

/// Pool width in meters (x axis).
pub const POOL_WIDTH: f64 = 20.0;

/// Pool length in meters (y axis).
pub const POOL_LENGTH: f64 = 50.0;

/// Number of swim lanes; lane lines sit between adjacent lanes.
pub const POOL_LANE_COUNT: usize = 5;

/// Effective swimmer diameter for ground-truth bbox construction (meters).
pub const SIM_SWIMMER_DIAMETER_M: f64 = 0.5;

/// Random-spawn swimmer speed range (m/s).
pub const SWIMMER_SPEED_MIN: f64 = 0.6;
pub const SWIMMER_SPEED_MAX: f64 = 1.4;

/// Maneuver turn-rate oscillation frequency range (rad/s).
pub const MANEUVER_OMEGA_MIN: f64 = 0.15;
pub const MANEUVER_OMEGA_MAX: f64 = 0.7;

/// Maneuver turn-rate amplitude range (rad/s).
pub const MANEUVER_AMP_MIN: f64 = 0.1;
pub const MANEUVER_AMP_MAX: f64 = 0.5;

/// Upper bound on a single tick's dt (seconds); larger requests are clamped.
pub const MAX_TICK_DT: f64 = 0.1;

// --- Sonar geometry & acoustics ---

/// Number of sonars, one per pool corner.
pub const SONAR_COUNT: usize = 4;

/// Half-width of each sonar's mechanical sector (degrees).
pub const SWEEP_HALF_WIDTH_DEG: f64 = 45.0;

/// Speed of sound in water (m/s).
pub const SPEED_OF_SOUND: f64 = 1500.0;

/// Mechanical rotation speed while not emitting (deg/s).
pub const SLEW_SPEED: f64 = 45.0;

/// Angular advance per ping while scanning (degrees).
pub const SCAN_STEP_ANGLE: f64 = 1.0;

/// Fixed per-ping processing overhead (seconds).
pub const PING360_PROCESSING_OVERHEAD_S: f64 = 0.002;

/// Lower bound on the ping interval (seconds).
pub const MIN_PING_INTERVAL_S: f64 = 0.01;

/// Commanded maximum range of the baseline strategy (meters).
pub const MAX_RANGE_NAIVE: f64 = 50.0;

// --- Polar imaging frame ---

/// Angle bins per frame (1 deg per bin over the 90 deg sector).
pub const IMAGING_FRAME_ANGLE_BINS: usize = 90;

/// Range bins per frame.
pub const IMAGING_RANGE_BINS: usize = 256;

/// Angular width of one bin (degrees).
pub const IMAGING_ANGLE_STEP_DEG: f64 =
    2.0 * SWEEP_HALF_WIDTH_DEG / IMAGING_FRAME_ANGLE_BINS as f64;

/// Radial depth of one bin (meters).
pub const IMAGING_RANGE_STEP_M: f64 = MAX_RANGE_NAIVE / IMAGING_RANGE_BINS as f64;

/// Per-ping horizontal field of view (degrees).
pub const IMAGING_FOV_DEG: f64 = 2.0;

// --- Ping synthesis ---

/// Mean of the additive noise floor.
pub const IMAGING_NOISE_FLOOR: f32 = 0.3;

/// Base standard deviation of the noise floor (scaled by tuning.noise_scale).
pub const IMAGING_NOISE_STD: f32 = 0.3;

/// Impulsive speckle amplitude scale.
pub const IMAGING_SPECKLE_STRENGTH: f32 = 2.2;

/// Shape exponent of the Pareto-like speckle draw.
pub const IMAGING_SPECKLE_SHAPE: f64 = 2.2;

/// Probability per ping of a surface-wave / multipath band.
pub const IMAGING_WEAK_BAND_PROB: f64 = 0.02;

/// Peak amplitude of a weak band.
pub const IMAGING_WEAK_BAND_STRENGTH: f32 = 0.9;

/// Radial sigma of a weak band (bins).
pub const IMAGING_WEAK_BAND_SIGMA_BINS: f64 = 5.0;

/// Wall reflection peak amplitude.
pub const IMAGING_WALL_ECHO_STRENGTH: f32 = 2.6;

/// Wall reflection radial sigma (bins).
pub const IMAGING_WALL_ECHO_SIGMA_BINS: f64 = 1.6;

/// Lane-line reflection peak amplitude.
pub const IMAGING_LANE_ECHO_STRENGTH: f32 = 1.2;

/// Lane-line reflection radial sigma (bins).
pub const IMAGING_LANE_ECHO_SIGMA_BINS: f64 = 1.1;

/// Multipath ghost amplitude relative to its parent echo.
pub const IMAGING_GHOST_REL_STRENGTH: f32 = 0.35;

/// Nominal ghost range offset (meters); jittered by 0.6 + 0.8 * U per echo.
pub const IMAGING_GHOST_RANGE_OFFSET_M: f64 = 3.0;

/// Target echo amplitude at zero range.
pub const IMAGING_ECHO_STRENGTH: f32 = 5.0;

/// Exponential attenuation length of target echoes (meters).
pub const IMAGING_ECHO_ATTENUATION_M: f64 = 60.0;

/// Radial sigma of a target blob (bins).
pub const IMAGING_BLOB_RADIUS_BINS: f64 = 2.0;

// --- Background model ---

/// EMA coefficient of the steady-state background update.
pub const IMAGING_BACKGROUND_ALPHA: f32 = 0.06;

/// Faster EMA coefficient used while seeding the background.
pub const IMAGING_WARMUP_ALPHA: f32 = 0.35;

/// Frames consumed solely to seed the background when the pool is empty.
pub const IMAGING_BACKGROUND_WARMUP_FRAMES: u32 = 10;

/// Positive deviation above background that blocks the steady-state update.
pub const IMAGING_BACKGROUND_UPDATE_SLACK: f32 = 0.6;

// --- Weak-echo elimination ---

/// Quantile of the strided subtracted-frame sample used as adaptive floor.
pub const AQUASCAN_WEAK_ECHO_PERCENTILE: f64 = 0.985;

/// Hard lower bound on the adaptive floor.
pub const AQUASCAN_WEAK_ECHO_MIN: f64 = 0.35;

/// Stride of the quantile sample over the subtracted frame.
pub const AQUASCAN_WEAK_ECHO_SAMPLE_STRIDE: usize = 7;

// --- Denoising & clustering ---

/// Paper guidance: majority-filter kernels above this size miss spikes.
pub const AQUASCAN_KERNEL_HARD_CAP: u32 = 13;

/// Smallest admissible majority-filter kernel.
pub const AQUASCAN_KERNEL_MIN: u32 = 3;

/// Default adaptive kernel cap.
pub const AQUASCAN_KERNEL_CAP: u32 = 11;

/// Minimum small/large mask overlap fraction for a plausible cluster.
pub const AQUASCAN_DENOISE_OVERLAP_MIN: f64 = 0.5;

/// Cross-range extent bounds of a plausible cluster (meters).
pub const AQUASCAN_MIN_CROSS_RANGE_M: f64 = 0.15;
pub const AQUASCAN_MAX_CROSS_RANGE_M: f64 = 4.0;

/// Radial extent bounds of a plausible cluster (meters).
pub const AQUASCAN_MIN_RANGE_EXTENT_M: f64 = 0.15;
pub const AQUASCAN_MAX_RANGE_EXTENT_M: f64 = 4.0;

/// Cross-range / range-extent aspect bounds of a plausible cluster.
pub const AQUASCAN_MIN_ASPECT: f64 = 0.15;
pub const AQUASCAN_MAX_ASPECT: f64 = 6.0;

/// Cap on surviving clusters per finalized frame.
pub const IMAGING_MAX_CLUSTERS_PER_PING: usize = 6;

// --- Measurement model ---

/// Range-independent measurement sigma (meters).
pub const AQUASCAN_MEAS_SIGMA_BASE: f64 = 0.2;

/// Range-proportional measurement sigma (meters per meter).
pub const AQUASCAN_MEAS_SIGMA_PER_M: f64 = 0.01;

/// Scale from normalized noise level to measurement sigma (meters).
pub const AQUASCAN_NOISE_TO_MEAS_SIGMA_M: f64 = 0.5;

/// Fraction of the measurement sigma applied as per-candidate jitter.
pub const AQUASCAN_MEAS_JITTER_SCALE: f64 = 0.25;

// --- Matching & evaluation ---

/// Cartesian gate of both matchers (meters).
pub const MATCH_GATE_RADIUS_M: f64 = 2.5;

/// Polar-bbox IoU gate of the paper matcher.
pub const AQUASCAN_IOU_MATCH_THRESHOLD: f64 = 0.1;

/// Update-event dedupe bucket across sonars (milliseconds).
pub const UPDATE_DEDUPE_BUCKET_MS: u64 = 1;

/// Retention horizon of every metric buffer (seconds).
pub const METRICS_RETENTION_SEC: f64 = 60.0;

/// Default query window of `metrics` (seconds).
pub const DEFAULT_METRICS_WINDOW_SEC: f64 = 10.0;

/// FIFO depth of the per-sonar visualization point buffers.
pub const VIS_POINT_BUFFER: usize = 15;

// --- Kalman tracker ---

/// Process-noise acceleration standard deviation (m/s^2).
pub const TRACK_ACCEL_STD: f64 = 0.5;

/// Initial velocity variance of a fresh track ((m/s)^2).
pub const TRACK_INIT_VEL_VAR: f64 = 25.0;

/// Floor of the initial position variance (m^2).
pub const TRACK_INIT_POS_VAR_MIN: f64 = 4.0;

/// Initial position variance gain applied to measSigma^2.
pub const TRACK_INIT_POS_VAR_GAIN: f64 = 9.0;

// --- Planner ---

/// Angular padding around predicted targets (degrees).
pub const TARGET_PADDING_ANGLE: f64 = 6.0;

/// Range padding beyond the farthest predicted target (meters).
pub const TARGET_PADDING_RANGE: f64 = 5.0;

/// Minimum width of an adaptive sweep (degrees).
pub const OPT_SWEEP_MIN_DEG: f64 = 10.0;

/// Desired-bound drift that, with the hold expired, forces a replan (degrees).
pub const OPT_SWEEP_REPLAN_DEG: f64 = 4.0;

/// Maximum age of stored sweep bounds before drift may replan (seconds).
pub const OPT_SWEEP_MAX_HOLD_SEC: f64 = 1.5;

/// Minimum commanded scan range of the adaptive planner (meters).
pub const OPT_MIN_SCAN_RANGE_M: f64 = 1.0;

/// Angular tolerance of sweep-target arrival tests (degrees).
pub const PLANNER_FLIP_TOLERANCE_DEG: f64 = 1.0;

// --- PSO assignment ---

/// Seconds between swarm replans.
pub const PSO_UPDATE_INTERVAL: f64 = 0.8;

/// Particles per swarm.
pub const PSO_SWARM_SIZE: usize = 24;

/// Velocity/position update iterations per replan.
pub const PSO_ITERATIONS: usize = 40;

/// Inertia weight.
pub const PSO_INERTIA: f64 = 0.72;

/// Cognitive (personal-best) acceleration coefficient.
pub const PSO_COGNITIVE: f64 = 1.49;

/// Social (global-best) acceleration coefficient.
pub const PSO_SOCIAL: f64 = 1.49;

/// Cost penalty per out-of-sector assignment.
pub const PSO_INVALID_PENALTY: f64 = 5.0;

// --- Default tuning ---

pub const TUNING_DEFAULT_NOISE_SCALE: f64 = 0.85;
pub const TUNING_DEFAULT_SPECKLE_PROB: f64 = 0.12;
pub const TUNING_DEFAULT_THRESHOLD: f64 = 1.05;
pub const TUNING_DEFAULT_DBSCAN_EPS_BINS: f64 = 2.5;
pub const TUNING_DEFAULT_DBSCAN_MIN_PTS: u32 = 5;
