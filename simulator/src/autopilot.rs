//! Waypoint Autopilot
//!
//! Flies the current mission one tick at a time:
//!
//! ```text
//! STANDBY -> TRANSIT -> HOLDING -> (next waypoint) TRANSIT ...
//!                          |
//!              last waypoint done -> RECOVERING -> STANDBY
//! ```
//!
//! A critical battery alert or a latched emergency stop aborts the mission.
//! The pilot only issues commands; the engine applies them on the next tick.

use mission_control::{MissionController, MissionStatus};
use motion_engine::{DroneState, DroneStatus, MovementCommand};
use rov_common::haversine_m;
use telemetry_monitor::{AlertType, TelemetryAlert};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum PilotMode {
    /// Not flying a mission
    Standby,
    /// Steering toward a waypoint
    Transit { waypoint_id: String },
    /// On station at a waypoint, counting down its duration (s)
    Holding { waypoint_id: String, remaining: f64 },
    /// Surfacing after the mission ended
    Recovering,
}

#[derive(Debug, Clone)]
pub struct Autopilot {
    mode: PilotMode,
    cruise_speed: f64,
    /// Horizontal distance under which the pilot stops translating and only
    /// trims depth (m)
    station_radius: f64,
}

impl Autopilot {
    pub fn new(cruise_speed: f64, arrival_radius: f64) -> Self {
        Self {
            mode: PilotMode::Standby,
            cruise_speed,
            station_radius: arrival_radius / 2.0,
        }
    }

    pub fn mode(&self) -> &PilotMode {
        &self.mode
    }

    /// Decide this tick's commands from the post-integration state
    pub fn step(
        &mut self,
        dt: f64,
        state: &DroneState,
        arrived: bool,
        alerts: &[TelemetryAlert],
        missions: &mut MissionController,
    ) -> Vec<MovementCommand> {
        let in_progress = missions.status().is_some_and(|s| s.is_in_progress());

        if in_progress && state.status == DroneStatus::Emergency {
            self.abort(missions, "Emergency stop");
            self.mode = PilotMode::Standby;
            return Vec::new();
        }

        let battery_critical = alerts
            .iter()
            .any(|a| a.is_critical() && a.alert_type == AlertType::Battery);
        if in_progress && battery_critical {
            self.abort(missions, "Critical battery");
            return self.recover();
        }

        match missions.status() {
            Some(MissionStatus::Active) => self.fly(dt, state, arrived, missions),
            Some(MissionStatus::Completed | MissionStatus::Aborted) if self.is_flying() => self.recover(),
            Some(_) | None if self.is_flying() => {
                self.mode = PilotMode::Standby;
                vec![MovementCommand::Hover]
            }
            _ => {
                if self.mode == PilotMode::Recovering && state.status == DroneStatus::Idle {
                    info!("Vehicle recovered at surface");
                    self.mode = PilotMode::Standby;
                }
                Vec::new()
            }
        }
    }

    fn fly(
        &mut self,
        dt: f64,
        state: &DroneState,
        arrived: bool,
        missions: &mut MissionController,
    ) -> Vec<MovementCommand> {
        let Some(waypoint) = missions.get_current_waypoint() else {
            return Vec::new();
        };

        if let PilotMode::Holding { waypoint_id, remaining } = &mut self.mode {
            if *waypoint_id == waypoint.id {
                *remaining -= dt;
                if *remaining > 0.0 {
                    return Vec::new();
                }
                if let Err(e) = missions.complete_waypoint() {
                    warn!(error = %e, waypoint_id = %waypoint.id, "Could not complete waypoint");
                }
                self.mode = PilotMode::Standby;
                if missions.status() == Some(MissionStatus::Completed) {
                    return self.recover();
                }
                return Vec::new();
            }
        }

        let hold_depth = MovementCommand::depth(waypoint.position.depth);

        if arrived {
            let remaining = waypoint.duration.unwrap_or(0.0);
            debug!(waypoint_id = %waypoint.id, hold_s = remaining, "On station");
            self.mode = PilotMode::Holding {
                waypoint_id: waypoint.id,
                remaining,
            };
            return vec![MovementCommand::Hover, hold_depth];
        }

        if !matches!(&self.mode, PilotMode::Transit { waypoint_id } if *waypoint_id == waypoint.id) {
            info!(waypoint_id = %waypoint.id, "Heading for waypoint");
        }
        let horizontal = haversine_m(&state.position, &waypoint.position);
        let target = waypoint.position;
        self.mode = PilotMode::Transit {
            waypoint_id: waypoint.id,
        };

        if horizontal <= self.station_radius {
            vec![MovementCommand::Hover, hold_depth]
        } else {
            vec![MovementCommand::move_to(target, self.cruise_speed)]
        }
    }

    fn recover(&mut self) -> Vec<MovementCommand> {
        self.mode = PilotMode::Recovering;
        vec![MovementCommand::Surface]
    }

    fn abort(&self, missions: &mut MissionController, reason: &str) {
        if let Err(e) = missions.abort_mission(Some(reason)) {
            warn!(error = %e, "Abort refused");
        }
    }

    fn is_flying(&self) -> bool {
        matches!(self.mode, PilotMode::Transit { .. } | PilotMode::Holding { .. })
    }
}
