//! Geodesy helpers
//!
//! One distance routine for every component, so motion and mission agree on
//! what "within 5 m of a waypoint" means.

use std::f64::consts::PI;

use crate::Position;

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle surface distance between two positions in metres
pub fn haversine_m(a: &Position, b: &Position) -> f64 {
    let lat1_rad = a.lat * PI / 180.0;
    let lat2_rad = b.lat * PI / 180.0;
    let dlat = (b.lat - a.lat) * PI / 180.0;
    let dlon = (b.lon - a.lon) * PI / 180.0;

    let h = (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// 3D distance in metres: surface haversine combined with the depth difference
pub fn distance_3d(a: &Position, b: &Position) -> f64 {
    let surface = haversine_m(a, b);
    let vertical = b.depth - a.depth;
    (surface * surface + vertical * vertical).sqrt()
}
