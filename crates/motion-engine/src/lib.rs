//! Motion Engine
//!
//! First-order motion model for a remotely operated underwater vehicle:
//! - Movement command interpretation (arms thrusters, never moves the vehicle)
//! - Tick integration of position, depth and heading
//! - Attitude auto-stabilization
//!
//! The engine never fails. Out-of-range setpoints are clamped to the nearest
//! legal value so a control loop cannot halt on bad input.

use rov_common::{Orientation, Position};
use serde::{Deserialize, Serialize};

pub mod command;
pub mod engine;
pub mod tuning;

#[cfg(feature = "driver")]
pub mod driver;

pub use command::{MovementCommand, OrientationTarget, PositionTarget};
pub use engine::MotionEngine;
pub use tuning::MotionTuning;

#[cfg(feature = "driver")]
pub use driver::{SharedMotionEngine, SimulationDriver};

/// Vehicle motion status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DroneStatus {
    #[default]
    Idle,
    Moving,
    Hovering,
    Ascending,
    Descending,
    Emergency,
}

/// Thruster command vector, each axis in [-100, 100] percent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ThrusterState {
    pub forward: f64,
    pub lateral: f64,
    pub vertical: f64,
    pub rotation: f64,
}

impl ThrusterState {
    pub const ZERO: ThrusterState = ThrusterState {
        forward: 0.0,
        lateral: 0.0,
        vertical: 0.0,
        rotation: 0.0,
    };

    /// Clamp every axis into [-100, 100]
    pub fn clamped(self) -> Self {
        Self {
            forward: clamp_percent(self.forward),
            lateral: clamp_percent(self.lateral),
            vertical: clamp_percent(self.vertical),
            rotation: clamp_percent(self.rotation),
        }
    }

    /// Mean absolute thruster command (0..100), used as the telemetry load scalar
    pub fn load(&self) -> f64 {
        let t = self.clamped();
        (t.forward.abs() + t.lateral.abs() + t.vertical.abs() + t.rotation.abs()) / 4.0
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-100.0, 100.0)
    }
}

/// Full vehicle motion snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DroneState {
    pub position: Position,
    pub orientation: Orientation,
    pub thrusters: ThrusterState,
    /// Commanded speed (m/s)
    pub speed: f64,
    /// Course over ground in degrees [0, 360)
    pub heading: f64,
    pub status: DroneStatus,
}

impl DroneState {
    pub fn at(position: Position) -> Self {
        Self {
            position,
            orientation: Orientation::default(),
            thrusters: ThrusterState::ZERO,
            speed: 0.0,
            heading: 0.0,
            status: DroneStatus::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thruster_load() {
        let t = ThrusterState {
            forward: 70.0,
            lateral: 0.0,
            vertical: -60.0,
            rotation: 0.0,
        };
        assert_eq!(t.load(), 32.5);
        assert_eq!(ThrusterState::ZERO.load(), 0.0);
    }

    #[test]
    fn test_thruster_clamp() {
        let t = ThrusterState {
            forward: 250.0,
            lateral: -101.0,
            vertical: f64::NAN,
            rotation: 50.0,
        }
        .clamped();
        assert_eq!(t.forward, 100.0);
        assert_eq!(t.lateral, -100.0);
        assert_eq!(t.vertical, 0.0);
        assert_eq!(t.rotation, 50.0);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&DroneStatus::Descending).unwrap();
        assert_eq!(json, "\"descending\"");
    }
}
