//! ROV Common Types
//!
//! Snapshot types shared by the motion, telemetry and mission components.
//! Components exchange these by value; none of them holds a reference into
//! another component's state.

use serde::{Deserialize, Serialize};

pub mod geo;
pub mod ring;

pub use geo::{distance_3d, haversine_m, EARTH_RADIUS_M};
pub use ring::BoundedRing;

/// Vehicle position. `depth` is metres below the surface (positive down),
/// `altitude` is metres above the seabed when known.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub depth: f64,
    #[serde(default)]
    pub altitude: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64, depth: f64) -> Self {
        Self {
            lat,
            lon,
            depth,
            altitude: 0.0,
        }
    }
}

/// Vehicle attitude in degrees.
///
/// - `pitch` in [-90, 90]
/// - `yaw` in [0, 360)
/// - `roll` in [-180, 180]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Orientation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Orientation {
    /// Bring every axis back into its legal range.
    pub fn normalized(self) -> Self {
        Self {
            pitch: self.pitch.clamp(-90.0, 90.0),
            yaw: wrap_degrees(self.yaw),
            roll: self.roll.clamp(-180.0, 180.0),
        }
    }
}

/// Wrap an angle into [0, 360).
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest signed angular difference `to - from`, in (-180, 180].
pub fn angle_delta(from: f64, to: f64) -> f64 {
    let mut delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Sign of `value` as -1, 0 or 1. Unlike `f64::signum`, zero maps to zero.
pub fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
