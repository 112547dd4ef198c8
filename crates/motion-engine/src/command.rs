//! Movement commands
//!
//! Wire form: `{"type": "move", "target": {...}, "speed": 2.0}`. Targets are
//! partial: any omitted axis keeps the vehicle's current value.

use rov_common::Position;
use serde::{Deserialize, Serialize};

/// Partial position setpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PositionTarget {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub depth: Option<f64>,
    pub altitude: Option<f64>,
}

impl PositionTarget {
    pub fn depth(depth: f64) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }
}

impl From<Position> for PositionTarget {
    fn from(pos: Position) -> Self {
        Self {
            lat: Some(pos.lat),
            lon: Some(pos.lon),
            depth: Some(pos.depth),
            altitude: Some(pos.altitude),
        }
    }
}

/// Partial attitude setpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct OrientationTarget {
    pub pitch: Option<f64>,
    pub yaw: Option<f64>,
    pub roll: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MovementCommand {
    /// Steer toward `target` at `speed` (m/s), descending/ascending if it carries a depth
    Move {
        #[serde(default)]
        target: PositionTarget,
        #[serde(default)]
        speed: Option<f64>,
    },
    /// Proportional-sign attitude correction
    Rotate {
        #[serde(default)]
        orientation: OrientationTarget,
    },
    /// Change depth to `target.depth`
    Depth {
        #[serde(default)]
        target: PositionTarget,
    },
    Hover,
    Surface,
    EmergencyStop,
}

impl MovementCommand {
    /// Move toward a full position
    pub fn move_to(target: Position, speed: f64) -> Self {
        MovementCommand::Move {
            target: target.into(),
            speed: Some(speed),
        }
    }

    pub fn depth(depth: f64) -> Self {
        MovementCommand::Depth {
            target: PositionTarget::depth(depth),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MovementCommand::Move { .. } => "move",
            MovementCommand::Rotate { .. } => "rotate",
            MovementCommand::Depth { .. } => "depth",
            MovementCommand::Hover => "hover",
            MovementCommand::Surface => "surface",
            MovementCommand::EmergencyStop => "emergency_stop",
        }
    }
}
