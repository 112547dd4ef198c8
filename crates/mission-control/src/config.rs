//! Mission controller configuration

use serde::{Deserialize, Serialize};

/// Distance at which a waypoint counts as reached (m)
pub const ARRIVAL_RADIUS_M: f64 = 5.0;
/// Deepest waypoint accepted at upload (m)
pub const MAX_WAYPOINT_DEPTH_M: f64 = 1000.0;
pub const EVENT_RING_CAPACITY: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MissionConfig {
    pub arrival_radius: f64,
    pub max_waypoint_depth: f64,
    pub event_capacity: usize,
    /// Whether an upload may replace an active or paused mission
    pub replace_in_progress: bool,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            arrival_radius: ARRIVAL_RADIUS_M,
            max_waypoint_depth: MAX_WAYPOINT_DEPTH_M,
            event_capacity: EVENT_RING_CAPACITY,
            replace_in_progress: true,
        }
    }
}
