//! Vehicle Kernel
//!
//! Composes motion, telemetry and mission control for one vehicle and runs them
//! in the fixed per-tick order:
//!
//! 1. `MotionEngine::update_state(dt)`
//! 2. `TelemetryMonitor::update_telemetry` with the new position and attitude
//! 3. `MissionController::waypoint_reached` with the new position
//! 4. Autopilot commands, applied to the engine for the next tick

use mission_control::MissionController;
use motion_engine::{DroneState, MotionEngine, MovementCommand};
use telemetry_monitor::{TelemetryAlert, TelemetryMonitor};
use tracing::trace;

use crate::autopilot::{Autopilot, PilotMode};
use crate::config::SimulatorConfig;

/// Outputs of one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    /// Simulated seconds since start
    pub elapsed: f64,
    pub state: DroneState,
    pub alerts: Vec<TelemetryAlert>,
    pub arrived: bool,
    /// Commands issued for the next tick
    pub commands: Vec<MovementCommand>,
}

pub struct VehicleKernel {
    engine: MotionEngine,
    monitor: TelemetryMonitor,
    missions: MissionController,
    autopilot: Autopilot,
    ticks: u64,
    elapsed: f64,
}

impl VehicleKernel {
    /// Build every component from one config. The telemetry depth alerts
    /// follow the motion envelope.
    pub fn new(config: &SimulatorConfig) -> Self {
        let telemetry = config.telemetry.clone().with_max_depth(config.motion.max_depth);
        Self {
            engine: MotionEngine::at(config.start_position, config.motion.clone()),
            monitor: TelemetryMonitor::new(telemetry),
            missions: MissionController::new(config.mission.clone()),
            autopilot: Autopilot::new(config.cruise_speed, config.mission.arrival_radius),
            ticks: 0,
            elapsed: 0.0,
        }
    }

    /// Swap in a pre-built monitor (e.g. with deterministic noise)
    pub fn with_monitor(mut self, monitor: TelemetryMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn tick(&mut self, dt: f64) -> TickReport {
        self.engine.update_state(dt);
        let state = self.engine.state();

        let alerts = self
            .monitor
            .update_telemetry(&state.position, &state.orientation, state.thrusters.load());
        let arrived = self.missions.waypoint_reached(&state.position);

        let commands = self
            .autopilot
            .step(dt, &state, arrived, &alerts, &mut self.missions);
        for command in &commands {
            self.engine.execute_command(command);
        }

        self.ticks += 1;
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }

        trace!(
            tick = self.ticks,
            depth = state.position.depth,
            status = ?state.status,
            "Tick"
        );

        TickReport {
            tick: self.ticks,
            elapsed: self.elapsed,
            state,
            alerts,
            arrived,
            commands,
        }
    }

    /// Operator command, applied on the next tick
    pub fn execute(&mut self, command: &MovementCommand) {
        self.engine.execute_command(command);
    }

    /// Latch the emergency stop. The autopilot aborts any running mission on
    /// the next tick.
    pub fn emergency_stop(&mut self) {
        self.engine.execute_command(&MovementCommand::EmergencyStop);
    }

    /// True once no mission is in flight and the pilot has recovered the vehicle
    pub fn is_settled(&self) -> bool {
        let mission_live = self
            .missions
            .status()
            .is_some_and(|s| !s.is_terminal());
        !mission_live && *self.autopilot.mode() == PilotMode::Standby
    }

    pub fn engine(&self) -> &MotionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MotionEngine {
        &mut self.engine
    }

    pub fn monitor(&self) -> &TelemetryMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut TelemetryMonitor {
        &mut self.monitor
    }

    pub fn missions(&self) -> &MissionController {
        &self.missions
    }

    pub fn missions_mut(&mut self) -> &mut MissionController {
        &mut self.missions
    }

    pub fn autopilot(&self) -> &Autopilot {
        &self.autopilot
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}
