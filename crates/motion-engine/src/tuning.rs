//! Motion tuning parameters
//!
//! The proportional-sign control law is pinned to these reference values.
//! They are fields rather than literals so a host can swap in a stricter
//! controller without touching the command contract.

use serde::{Deserialize, Serialize};

/// Maximum operating depth (m)
pub const MAX_DEPTH_M: f64 = 500.0;
/// Maximum commanded speed (m/s)
pub const MAX_SPEED_MS: f64 = 5.0;
/// Speed used when a move command omits one (m/s)
pub const DEFAULT_SPEED_MS: f64 = 2.5;

/// Forward thruster allocation for `move` (%)
pub const FORWARD_THRUST: f64 = 70.0;
/// Rotation thruster magnitude for `rotate` yaw error (%)
pub const ROTATION_THRUST: f64 = 50.0;
/// Vertical thruster magnitude for `rotate` pitch error (%)
pub const PITCH_THRUST: f64 = 30.0;
/// Lateral thruster magnitude for `rotate` roll setpoint (%)
pub const ROLL_THRUST: f64 = 20.0;
/// Vertical thruster magnitude for `depth` (%)
pub const DEPTH_THRUST: f64 = 60.0;

/// Vertical speed at 100 % vertical thrust (m/s, positive thrust rises)
pub const VERTICAL_RATE_MS: f64 = 2.0;
/// Yaw rate at 100 % rotation thrust (deg/s)
pub const YAW_RATE_DEG_S: f64 = 30.0;
/// Degrees of lat/lon travelled per second at full speed
pub const FORWARD_GAIN_DEG: f64 = 0.00001;
/// Per-tick pitch/roll decay factor
pub const STABILIZATION_DECAY: f64 = 0.95;
/// Depth under which an ascent counts as surfaced (m)
pub const SURFACE_THRESHOLD_M: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionTuning {
    pub max_depth: f64,
    pub max_speed: f64,
    pub default_speed: f64,
    pub forward_thrust: f64,
    pub rotation_thrust: f64,
    pub pitch_thrust: f64,
    pub roll_thrust: f64,
    pub depth_thrust: f64,
    pub vertical_rate: f64,
    pub yaw_rate: f64,
    pub forward_gain_deg: f64,
    pub stabilization_decay: f64,
    pub surface_threshold: f64,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH_M,
            max_speed: MAX_SPEED_MS,
            default_speed: DEFAULT_SPEED_MS,
            forward_thrust: FORWARD_THRUST,
            rotation_thrust: ROTATION_THRUST,
            pitch_thrust: PITCH_THRUST,
            roll_thrust: ROLL_THRUST,
            depth_thrust: DEPTH_THRUST,
            vertical_rate: VERTICAL_RATE_MS,
            yaw_rate: YAW_RATE_DEG_S,
            forward_gain_deg: FORWARD_GAIN_DEG,
            stabilization_decay: STABILIZATION_DECAY,
            surface_threshold: SURFACE_THRESHOLD_M,
        }
    }
}

impl MotionTuning {
    /// Override the depth envelope
    pub fn with_max_depth(mut self, max_depth: f64) -> Self {
        self.max_depth = max_depth.max(0.0);
        self
    }

    /// Override the speed envelope
    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed.max(0.0);
        self
    }
}
