//! Simulator configuration
//!
//! Loaded from a JSON file. Every section is optional and falls back to the
//! component defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use mission_control::MissionConfig;
use motion_engine::MotionTuning;
use rov_common::Position;
use serde::{Deserialize, Serialize};
use telemetry_monitor::TelemetryConfig;

/// Wall-clock tick period (ms)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
/// Launch point: Monterey Canyon head
pub const DEFAULT_START: Position = Position {
    lat: 36.8,
    lon: -121.9,
    depth: 0.0,
    altitude: 0.0,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub tick_interval_ms: u64,
    /// Simulated seconds per wall-clock second
    pub time_scale: f64,
    /// Transit speed the autopilot requests (m/s)
    pub cruise_speed: f64,
    pub start_position: Position,
    pub motion: MotionTuning,
    pub telemetry: TelemetryConfig,
    pub mission: MissionConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        let motion = MotionTuning::default();
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            time_scale: 1.0,
            cruise_speed: motion.default_speed,
            start_position: DEFAULT_START,
            motion,
            telemetry: TelemetryConfig::default(),
            mission: MissionConfig::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: Self =
            serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Simulated seconds advanced per tick
    pub fn dt(&self) -> f64 {
        let scale = if self.time_scale.is_finite() && self.time_scale > 0.0 {
            self.time_scale
        } else {
            1.0
        };
        self.tick_interval().as_secs_f64() * scale
    }
}
