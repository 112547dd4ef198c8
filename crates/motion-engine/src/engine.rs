//! Motion integration
//!
//! `execute_command` only arms the thruster vector and status; `update_state`
//! is the single writer that advances the vehicle by one tick.

use rov_common::{angle_delta, distance_3d, sign, wrap_degrees, Position};
use tracing::{debug, warn};

use crate::{
    DroneState, DroneStatus, MotionTuning, MovementCommand, OrientationTarget, PositionTarget,
    ThrusterState,
};

/// Single-vehicle motion model
#[derive(Debug, Clone)]
pub struct MotionEngine {
    state: DroneState,
    tuning: MotionTuning,
    /// Depth the vertical thruster is driving toward, if any
    depth_target: Option<f64>,
}

impl Default for MotionEngine {
    fn default() -> Self {
        Self::new(MotionTuning::default())
    }
}

impl MotionEngine {
    /// Engine at the origin, on the surface
    pub fn new(tuning: MotionTuning) -> Self {
        Self::at(Position::default(), tuning)
    }

    /// Engine starting at `position` (depth clamped into the envelope)
    pub fn at(mut position: Position, tuning: MotionTuning) -> Self {
        position.depth = finite_or(position.depth, 0.0).clamp(0.0, tuning.max_depth);
        position.lat = finite_or(position.lat, 0.0).clamp(-90.0, 90.0);
        position.lon = wrap_longitude(finite_or(position.lon, 0.0));
        Self {
            state: DroneState::at(position),
            tuning,
            depth_target: None,
        }
    }

    /// Snapshot of the current motion state
    pub fn state(&self) -> DroneState {
        self.state
    }

    pub fn tuning(&self) -> &MotionTuning {
        &self.tuning
    }

    /// Depth the vehicle is currently driving toward
    pub fn depth_target(&self) -> Option<f64> {
        self.depth_target
    }

    /// 3D distance from the vehicle to `target` in metres
    pub fn distance_to(&self, target: &Position) -> f64 {
        distance_3d(&self.state.position, target)
    }

    /// Interpret a movement command. Arms thrusters and status for the next tick.
    ///
    /// While in emergency stop every command other than another emergency stop
    /// is ignored until [`MotionEngine::clear_emergency`] is called.
    pub fn execute_command(&mut self, command: &MovementCommand) {
        if self.state.status == DroneStatus::Emergency && *command != MovementCommand::EmergencyStop {
            warn!(command = command.name(), "Emergency stop latched - command ignored");
            return;
        }

        debug!(command = command.name(), "Executing movement command");

        match command {
            MovementCommand::Move { target, speed } => self.command_move(target, *speed),
            MovementCommand::Rotate { orientation } => self.command_rotate(orientation),
            MovementCommand::Depth { target } => {
                let depth = target.depth.unwrap_or(self.state.position.depth);
                self.command_depth(depth);
            }
            MovementCommand::Hover => {
                self.state.thrusters = ThrusterState::ZERO;
                self.state.status = DroneStatus::Hovering;
                self.depth_target = None;
            }
            MovementCommand::Surface => {
                self.state.thrusters = ThrusterState {
                    vertical: 100.0,
                    ..ThrusterState::ZERO
                };
                self.state.status = DroneStatus::Ascending;
                self.depth_target = Some(0.0);
            }
            MovementCommand::EmergencyStop => {
                warn!(
                    depth = self.state.position.depth,
                    "EMERGENCY STOP - all thrusters zeroed"
                );
                self.state.thrusters = ThrusterState::ZERO;
                self.state.speed = 0.0;
                self.state.status = DroneStatus::Emergency;
                self.depth_target = None;
            }
        }
    }

    /// Release the emergency latch. Returns false if no emergency was active.
    pub fn clear_emergency(&mut self) -> bool {
        if self.state.status != DroneStatus::Emergency {
            return false;
        }
        self.state.status = DroneStatus::Idle;
        debug!("Emergency latch cleared");
        true
    }

    fn command_move(&mut self, target: &PositionTarget, speed: Option<f64>) {
        let requested = finite_or(speed.unwrap_or(self.tuning.default_speed), 0.0);
        let speed = requested.clamp(0.0, self.tuning.max_speed);
        if speed != requested {
            warn!(requested, clamped = speed, "Move speed clamped");
        }

        let current = self.state.position;
        let dlat = target.lat.map_or(0.0, |lat| finite_or(lat, current.lat) - current.lat);
        let dlon = target.lon.map_or(0.0, |lon| finite_or(lon, current.lon) - current.lon);

        // No horizontal offset: keep the current heading
        if dlat != 0.0 || dlon != 0.0 {
            self.state.heading = wrap_degrees(dlon.atan2(dlat).to_degrees());
        }

        self.state.speed = speed;
        self.state.thrusters.forward = self.tuning.forward_thrust;
        self.state.status = DroneStatus::Moving;

        if let Some(depth) = target.depth {
            self.command_depth(depth);
        }
    }

    fn command_rotate(&mut self, target: &OrientationTarget) {
        let current = self.state.orientation;

        let yaw_error = target
            .yaw
            .filter(|yaw| yaw.is_finite())
            .map_or(0.0, |yaw| angle_delta(current.yaw, wrap_degrees(yaw)));
        let pitch_error = target
            .pitch
            .filter(|pitch| pitch.is_finite())
            .map_or(0.0, |pitch| pitch.clamp(-90.0, 90.0) - current.pitch);
        let roll = target
            .roll
            .filter(|roll| roll.is_finite())
            .map_or(0.0, |roll| roll.clamp(-180.0, 180.0));

        self.state.thrusters.rotation = sign(yaw_error) * self.tuning.rotation_thrust;
        self.state.thrusters.vertical = sign(pitch_error) * self.tuning.pitch_thrust;
        self.state.thrusters.lateral = sign(roll) * self.tuning.roll_thrust;
    }

    fn command_depth(&mut self, requested: f64) {
        let current = self.state.position.depth;
        let target = finite_or(requested, current).clamp(0.0, self.tuning.max_depth);
        if target != requested {
            warn!(requested, clamped = target, "Depth target clamped to envelope");
        }

        let delta = target - current;
        if delta > 0.0 {
            self.state.status = DroneStatus::Descending;
            self.state.thrusters.vertical = -self.tuning.depth_thrust;
            self.depth_target = Some(target);
        } else if delta < 0.0 {
            self.state.status = DroneStatus::Ascending;
            self.state.thrusters.vertical = self.tuning.depth_thrust;
            self.depth_target = Some(target);
        } else {
            self.state.status = DroneStatus::Hovering;
            self.state.thrusters.vertical = 0.0;
            self.depth_target = None;
        }
    }

    /// Advance the simulation by `dt` seconds. Non-positive or non-finite `dt` is a no-op.
    pub fn update_state(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let tuning = &self.tuning;
        let thrusters = self.state.thrusters.clamped();
        let previous_depth = self.state.position.depth;
        let mut position = self.state.position;
        let mut orientation = self.state.orientation;

        // Forward: flat-Earth increment along heading
        if thrusters.forward != 0.0 && self.state.speed > 0.0 && tuning.max_speed > 0.0 {
            let step = (self.state.speed / tuning.max_speed) * dt * tuning.forward_gain_deg;
            let heading_rad = self.state.heading.to_radians();
            position.lat = (position.lat + heading_rad.cos() * step).clamp(-90.0, 90.0);
            position.lon = wrap_longitude(position.lon + heading_rad.sin() * step);
        }

        // Vertical: positive thrust rises (depth decreases)
        position.depth = (position.depth + (thrusters.vertical / 100.0) * -tuning.vertical_rate * dt)
            .clamp(0.0, tuning.max_depth);

        // Rotation
        orientation.yaw = wrap_degrees(orientation.yaw + (thrusters.rotation / 100.0) * tuning.yaw_rate * dt);

        // Auto-stabilization toward level
        orientation.pitch *= tuning.stabilization_decay;
        orientation.roll *= tuning.stabilization_decay;

        self.state.position = position;
        self.state.orientation = orientation.normalized();

        self.settle_vertical(previous_depth);
    }

    /// Resolve surfacing and depth-hold arrival after integration
    fn settle_vertical(&mut self, previous_depth: f64) {
        let depth = self.state.position.depth;

        if depth < self.tuning.surface_threshold && self.state.status == DroneStatus::Ascending {
            self.state.status = DroneStatus::Idle;
            self.state.thrusters.vertical = 0.0;
            self.depth_target = None;
            debug!(depth, "Surfaced");
            return;
        }

        let Some(target) = self.depth_target else {
            return;
        };

        // Only a crossing during this tick counts as arrival
        let reached = (previous_depth < target && depth >= target)
            || (previous_depth > target && depth <= target);
        if reached {
            self.state.position.depth = target;
            self.state.thrusters.vertical = 0.0;
            self.depth_target = None;
            if matches!(self.state.status, DroneStatus::Ascending | DroneStatus::Descending) {
                self.state.status = DroneStatus::Hovering;
            }
            debug!(depth = target, "Depth target reached");
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
