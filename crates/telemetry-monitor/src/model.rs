//! Sensor derivation rules
//!
//! Pure functions of depth and load. Noise is applied by the monitor on top of
//! these baselines.

use crate::{CommunicationStatus, ConnectionType};

/// Surface air pressure (bar)
pub const SURFACE_PRESSURE_BAR: f64 = 1.0;
/// Seawater density (kg/m^3)
pub const SEAWATER_DENSITY: f64 = 1025.0;
/// Gravitational acceleration (m/s^2)
pub const GRAVITY: f64 = 9.81;
/// Pascals per bar
pub const PA_PER_BAR: f64 = 100_000.0;

/// Surface water temperature (C)
pub const SURFACE_TEMPERATURE_C: f64 = 20.0;
/// Temperature below the thermocline (C)
pub const DEEP_TEMPERATURE_C: f64 = 4.0;
/// Bottom of the thermocline (m)
pub const THERMOCLINE_DEPTH_M: f64 = 100.0;
/// Noise amplitude applied below the thermocline (C)
pub const DEEP_TEMPERATURE_NOISE_C: f64 = 0.25;

/// Pack voltage at 0 % charge (V)
pub const BATTERY_MIN_VOLTAGE: f64 = 42.0;
/// Voltage span from empty to full (V)
pub const BATTERY_VOLTAGE_SPAN: f64 = 6.0;
/// Amps drawn per percent of thruster load
pub const AMPS_PER_LOAD_PCT: f64 = 0.5;

/// Tether band ends here (m)
pub const TETHER_LIMIT_M: f64 = 50.0;
/// Shallow acoustic band ends here (m)
pub const SHALLOW_ACOUSTIC_LIMIT_M: f64 = 200.0;

pub const NOMINAL_SALINITY_PPT: f64 = 35.0;
pub const INITIAL_TURBIDITY_NTU: f64 = 2.0;
pub const INITIAL_CURRENT_SPEED_MS: f64 = 0.3;
pub const INITIAL_CURRENT_DIRECTION_DEG: f64 = 90.0;

/// Best-case visibility at the surface in clear water (m)
const MAX_VISIBILITY_M: f64 = 20.0;
/// Visibility never reported below this (m)
const MIN_VISIBILITY_M: f64 = 1.0;

/// Hydrostatic pressure in bar, rounded to 2 decimals
pub fn pressure_bar(depth: f64) -> f64 {
    let raw = SURFACE_PRESSURE_BAR + SEAWATER_DENSITY * GRAVITY * depth / PA_PER_BAR;
    (raw * 100.0).round() / 100.0
}

/// Noise-free temperature: linear through the thermocline, constant below it
pub fn base_temperature(depth: f64) -> f64 {
    if depth <= THERMOCLINE_DEPTH_M {
        let frac = depth.max(0.0) / THERMOCLINE_DEPTH_M;
        SURFACE_TEMPERATURE_C - (SURFACE_TEMPERATURE_C - DEEP_TEMPERATURE_C) * frac
    } else {
        DEEP_TEMPERATURE_C
    }
}

/// Per-tick drain in percent
pub fn drain_per_tick(base: f64, per_load: f64, thruster_load: f64) -> f64 {
    base + thruster_load * per_load
}

pub fn battery_voltage(level: f64) -> f64 {
    BATTERY_MIN_VOLTAGE + (level / 100.0) * BATTERY_VOLTAGE_SPAN
}

pub fn battery_current(thruster_load: f64) -> f64 {
    thruster_load * AMPS_PER_LOAD_PCT
}

/// Endurance estimate in minutes; saturates when nothing drains
pub fn time_remaining(level: f64, drain: f64) -> u32 {
    if drain <= 0.0 {
        return u32::MAX;
    }
    ((level / drain) * 0.1).floor() as u32
}

/// Link characteristics for a depth band
pub fn communication(depth: f64) -> CommunicationStatus {
    if depth < TETHER_LIMIT_M {
        CommunicationStatus {
            signal_strength: 90.0 - depth * 0.2,
            latency: 50.0 + depth,
            data_rate: 2000.0 - depth * 10.0,
            connection_type: ConnectionType::Tether,
        }
    } else if depth <= SHALLOW_ACOUSTIC_LIMIT_M {
        CommunicationStatus {
            signal_strength: 70.0 - depth * 0.1,
            latency: 200.0 + depth * 2.0,
            data_rate: 100.0,
            connection_type: ConnectionType::Acoustic,
        }
    } else {
        CommunicationStatus {
            signal_strength: (50.0 - depth * 0.05).max(10.0),
            latency: 500.0 + depth * 3.0,
            data_rate: 50.0,
            connection_type: ConnectionType::Acoustic,
        }
    }
}

pub fn visibility(depth: f64, turbidity: f64) -> f64 {
    (MAX_VISIBILITY_M - depth * 0.05 - turbidity).max(MIN_VISIBILITY_M)
}
