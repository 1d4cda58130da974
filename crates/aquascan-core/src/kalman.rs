//! Constant-velocity Kalman filter over pool coordinates.
//!
//! State is `[x, y, vx, vy]` with a 4x4 covariance held as four 2x2 blocks
//! (position/velocity cross terms), which keeps the whole filter on
//! `glam::DMat2` algebra. Measurements are positions only; the innovation
//! covariance is therefore the 2x2 position block plus the measurement
//! variance, and a singular innovation aborts the update silently.

use glam::{DMat2, DVec2};
use serde::{Deserialize, Serialize};

use crate::constants::{
    TRACK_ACCEL_STD, TRACK_INIT_POS_VAR_GAIN, TRACK_INIT_POS_VAR_MIN, TRACK_INIT_VEL_VAR,
};

/// One swimmer's track filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackFilter {
    pos: DVec2,
    vel: DVec2,
    p_pp: DMat2,
    p_pv: DMat2,
    p_vp: DMat2,
    p_vv: DMat2,
    /// Timestamp of the current state estimate (sim seconds).
    t: f64,
}

impl TrackFilter {
    /// Initialize from a first accepted measurement.
    pub fn new(measurement: DVec2, meas_sigma: f64, t: f64) -> Self {
        let pos_var =
            TRACK_INIT_POS_VAR_MIN.max(TRACK_INIT_POS_VAR_GAIN * meas_sigma * meas_sigma);
        Self {
            pos: measurement,
            vel: DVec2::ZERO,
            p_pp: DMat2::from_diagonal(DVec2::splat(pos_var)),
            p_pv: DMat2::ZERO,
            p_vp: DMat2::ZERO,
            p_vv: DMat2::from_diagonal(DVec2::splat(TRACK_INIT_VEL_VAR)),
            t,
        }
    }

    pub fn position(&self) -> DVec2 {
        self.pos
    }

    pub fn velocity(&self) -> DVec2 {
        self.vel
    }

    pub fn timestamp(&self) -> f64 {
        self.t
    }

    /// Position extrapolated to `t` without touching the filter state.
    pub fn predicted_position(&self, t: f64) -> DVec2 {
        let dt = t - self.t;
        if dt <= 0.0 {
            self.pos
        } else {
            self.pos + self.vel * dt
        }
    }

    /// Advance the state estimate to time `t`. A non-positive elapsed time
    /// only moves the timestamp forward.
    pub fn predict_to(&mut self, t: f64) {
        let dt = t - self.t;
        if dt > 0.0 {
            self.predict_by(dt);
        }
        self.t = self.t.max(t);
    }

    /// Apply the constant-velocity transition for an arbitrary `dt`.
    /// Exposed separately so the transition itself stays testable in both
    /// directions; callers inside the engine go through [`predict_to`].
    ///
    /// [`predict_to`]: TrackFilter::predict_to
    pub fn predict_by(&mut self, dt: f64) {
        let sa2 = TRACK_ACCEL_STD * TRACK_ACCEL_STD;
        let q_pp = dt.powi(4) / 4.0 * sa2;
        let q_pv = dt.powi(3) / 2.0 * sa2;
        let q_vv = dt * dt * sa2;

        self.pos += self.vel * dt;

        // P' = F P F^T + Q with F = [[I, dt I], [0, I]], expanded per block.
        let p_pp = self.p_pp
            + (self.p_vp + self.p_pv) * dt
            + self.p_vv * (dt * dt)
            + DMat2::from_diagonal(DVec2::splat(q_pp));
        let p_pv = self.p_pv + self.p_vv * dt + DMat2::from_diagonal(DVec2::splat(q_pv));
        let p_vp = self.p_vp + self.p_vv * dt + DMat2::from_diagonal(DVec2::splat(q_pv));
        let p_vv = self.p_vv + DMat2::from_diagonal(DVec2::splat(q_vv));

        self.p_pp = p_pp;
        self.p_pv = p_pv;
        self.p_vp = p_vp;
        self.p_vv = p_vv;
        self.t += dt;
    }

    /// Fuse a position measurement with standard deviation `meas_sigma`.
    /// A singular innovation covariance leaves the state unchanged.
    pub fn update(&mut self, measurement: DVec2, meas_sigma: f64) {
        let r = DMat2::from_diagonal(DVec2::splat(meas_sigma * meas_sigma));
        let s = self.p_pp + r;
        if s.determinant().abs() < 1e-12 {
            return;
        }
        let s_inv = s.inverse();

        // K = P H^T S^-1 with H = [I 0]: the gain rows are the covariance
        // blocks of the first block column.
        let k_p = self.p_pp * s_inv;
        let k_v = self.p_vp * s_inv;

        let innovation = measurement - self.pos;
        self.pos += k_p * innovation;
        self.vel += k_v * innovation;

        // P' = (I - K H) P, expanded per block against the prior P.
        let p_pp = (DMat2::IDENTITY - k_p) * self.p_pp;
        let p_pv = (DMat2::IDENTITY - k_p) * self.p_pv;
        let p_vp = self.p_vp - k_v * self.p_pp;
        let p_vv = self.p_vv - k_v * self.p_pv;

        self.p_pp = p_pp;
        self.p_pv = p_pv;
        self.p_vp = p_vp;
        self.p_vv = p_vv;
    }
}
