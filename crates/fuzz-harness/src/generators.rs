//! Vehicle-domain generators for property-based testing

use proptest::prelude::*;
use rov_common::Position;

// ============================================================================
// Geodetic Generators
// ============================================================================

/// Latitude (-90 to 90 deg)
pub fn latitude() -> impl Strategy<Value = f64> {
    -90.0f64..=90.0
}

/// Longitude (-180 to 180 deg)
pub fn longitude() -> impl Strategy<Value = f64> {
    -180.0f64..=180.0
}

/// Depth inside the default vehicle envelope (0-500 m)
pub fn depth_m() -> impl Strategy<Value = f64> {
    0.0f64..=500.0
}

/// Depth setpoints including out-of-envelope requests (-100 to 2000 m)
pub fn depth_request() -> impl Strategy<Value = f64> {
    -100.0f64..=2000.0
}

/// Position inside the vehicle envelope
pub fn position() -> impl Strategy<Value = Position> {
    (latitude(), longitude(), depth_m()).prop_map(|(lat, lon, depth)| Position::new(lat, lon, depth))
}

/// Position within ~1 km of a coastal survey site, the scale missions fly at
pub fn survey_position() -> impl Strategy<Value = Position> {
    (36.79f64..36.81, -121.91f64..-121.89, depth_m())
        .prop_map(|(lat, lon, depth)| Position::new(lat, lon, depth))
}

// ============================================================================
// Tick / Load Generators
// ============================================================================

/// Tick length in seconds (10 ms to 2 s)
pub fn delta_t() -> impl Strategy<Value = f64> {
    0.01f64..=2.0
}

/// Thruster load percentage (0-100)
pub fn thruster_load() -> impl Strategy<Value = f64> {
    0.0f64..=100.0
}

/// Thruster load including out-of-range values (-50 to 250)
pub fn raw_thruster_load() -> impl Strategy<Value = f64> {
    -50.0f64..=250.0
}
