//! ROV Telemetry Monitor
//!
//! Derives a synthetic sensor snapshot from each tick's motion output and raises
//! threshold alerts:
//! - Hydrostatic pressure and a thermocline temperature profile
//! - Battery drain driven by thruster load
//! - Communication link quality by depth band
//! - Environmental conditions (visibility, current, salinity)

use chrono::{DateTime, Utc};
use rov_common::Orientation;
use serde::{Deserialize, Serialize};

pub mod alerts;
pub mod config;
pub mod model;
pub mod monitor;
pub mod noise;

pub use alerts::{AlertSeverity, AlertType, TelemetryAlert};
pub use config::TelemetryConfig;
pub use monitor::{AlertCallback, TelemetryMonitor};
pub use noise::{NoiseSource, RandNoise, SilentNoise};

/// Full sensor snapshot for one tick
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryData {
    pub timestamp: DateTime<Utc>,
    /// Metres below surface
    pub depth: f64,
    /// Water temperature (Celsius)
    pub temperature: f64,
    /// Absolute pressure (bar)
    pub pressure: f64,
    pub orientation: Orientation,
    pub battery: BatteryStatus,
    pub communication: CommunicationStatus,
    pub environmental: EnvironmentalData,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatteryStatus {
    /// State of charge (0-100)
    pub level: f64,
    /// Pack voltage (V)
    pub voltage: f64,
    /// Draw (A)
    pub current: f64,
    /// Estimated endurance at the current draw (minutes)
    pub time_remaining: u32,
    pub charging: bool,
}

impl BatteryStatus {
    pub fn full() -> Self {
        Self {
            level: 100.0,
            voltage: model::battery_voltage(100.0),
            current: 0.0,
            time_remaining: 0,
            charging: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Tether,
    Acoustic,
    Satellite,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationStatus {
    /// Signal strength (0-100 %)
    pub signal_strength: f64,
    /// Round-trip latency (ms)
    pub latency: f64,
    /// Link throughput (kbps)
    pub data_rate: f64,
    pub connection_type: ConnectionType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalData {
    /// Horizontal visibility (m)
    pub visibility: f64,
    /// Water current speed (m/s)
    pub current_speed: f64,
    /// Direction the current flows toward (deg, 0-360)
    pub current_direction: f64,
    /// Salinity (ppt)
    pub salinity: f64,
    /// Turbidity (NTU)
    pub turbidity: f64,
}

impl Default for EnvironmentalData {
    fn default() -> Self {
        Self {
            visibility: model::visibility(0.0, model::INITIAL_TURBIDITY_NTU),
            current_speed: model::INITIAL_CURRENT_SPEED_MS,
            current_direction: model::INITIAL_CURRENT_DIRECTION_DEG,
            salinity: model::NOMINAL_SALINITY_PPT,
            turbidity: model::INITIAL_TURBIDITY_NTU,
        }
    }
}
