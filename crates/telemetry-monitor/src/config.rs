//! Monitor configuration

use serde::{Deserialize, Serialize};

/// Default vehicle depth rating (m)
pub const DEFAULT_MAX_DEPTH_M: f64 = 500.0;
pub const BATTERY_WARNING_PCT: f64 = 20.0;
pub const BATTERY_CRITICAL_PCT: f64 = 10.0;
pub const DEPTH_WARNING_RATIO: f64 = 0.9;
pub const TEMPERATURE_MIN_C: f64 = -2.0;
pub const TEMPERATURE_MAX_C: f64 = 35.0;
pub const MIN_SIGNAL_PCT: f64 = 30.0;
pub const ALERT_RING_CAPACITY: usize = 50;
/// Idle drain per tick (%)
pub const BASE_DRAIN_PCT: f64 = 0.01;
/// Additional drain per tick per percent of thruster load (%)
pub const LOAD_DRAIN_PCT: f64 = 0.001;
/// Charge gained per tick while charging (%)
pub const CHARGE_RATE_PCT: f64 = 0.05;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    pub max_depth: f64,
    pub battery_warning: f64,
    pub battery_critical: f64,
    pub depth_warning_ratio: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub min_signal: f64,
    pub alert_capacity: usize,
    pub base_drain: f64,
    pub load_drain: f64,
    pub charge_rate: f64,
    /// Fixed RNG seed for reproducible runs; `None` seeds from the OS
    pub noise_seed: Option<u64>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH_M,
            battery_warning: BATTERY_WARNING_PCT,
            battery_critical: BATTERY_CRITICAL_PCT,
            depth_warning_ratio: DEPTH_WARNING_RATIO,
            temperature_min: TEMPERATURE_MIN_C,
            temperature_max: TEMPERATURE_MAX_C,
            min_signal: MIN_SIGNAL_PCT,
            alert_capacity: ALERT_RING_CAPACITY,
            base_drain: BASE_DRAIN_PCT,
            load_drain: LOAD_DRAIN_PCT,
            charge_rate: CHARGE_RATE_PCT,
            noise_seed: None,
        }
    }
}

impl TelemetryConfig {
    /// Match the depth rating the motion model clamps to
    pub fn with_max_depth(mut self, max_depth: f64) -> Self {
        self.max_depth = max_depth.max(0.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.noise_seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: TelemetryConfig = serde_json::from_str(r#"{"max_depth": 300.0}"#).unwrap();
        assert_eq!(config.max_depth, 300.0);
        assert_eq!(config.alert_capacity, 50);
        assert_eq!(config.battery_critical, 10.0);
        assert_eq!(config.noise_seed, None);
    }
}
