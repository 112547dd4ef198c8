//! Telemetry Monitor
//!
//! Owns the latest sensor snapshot, the battery accumulator and the alert ring.
//! Call [`TelemetryMonitor::update_telemetry`] once per tick with the position
//! and attitude the motion engine produced for that same tick.

use chrono::Utc;
use rov_common::{wrap_degrees, BoundedRing, Orientation, Position};
use tracing::{debug, error, warn};

use crate::alerts::{self, AlertSeverity, TelemetryAlert};
use crate::noise::{NoiseSource, RandNoise};
use crate::{model, BatteryStatus, EnvironmentalData, TelemetryConfig, TelemetryData};

/// Alert listener, invoked synchronously for every new alert
pub type AlertCallback = Box<dyn FnMut(&TelemetryAlert) + Send>;

// Random-walk step sizes per tick
const TURBIDITY_STEP_NTU: f64 = 0.1;
const MAX_TURBIDITY_NTU: f64 = 10.0;
const CURRENT_SPEED_STEP_MS: f64 = 0.05;
const MAX_CURRENT_SPEED_MS: f64 = 2.0;
const CURRENT_DIRECTION_STEP_DEG: f64 = 5.0;
const SALINITY_NOISE_PPT: f64 = 0.5;

pub struct TelemetryMonitor {
    config: TelemetryConfig,
    telemetry: TelemetryData,
    alerts: BoundedRing<TelemetryAlert>,
    listeners: Vec<AlertCallback>,
    noise: Box<dyn NoiseSource>,
}

impl TelemetryMonitor {
    /// Monitor with OS- or config-seeded noise
    pub fn new(config: TelemetryConfig) -> Self {
        let noise = RandNoise::new(config.noise_seed);
        Self::with_noise(config, noise)
    }

    pub fn with_noise(config: TelemetryConfig, noise: impl NoiseSource + 'static) -> Self {
        let telemetry = initial_telemetry(&config);
        Self {
            alerts: BoundedRing::new(config.alert_capacity),
            config,
            telemetry,
            listeners: Vec::new(),
            noise: Box::new(noise),
        }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Recompute the snapshot for one tick and evaluate alerts.
    ///
    /// `thruster_load` is clamped to 0..100. Returns the alerts raised this tick,
    /// which have already been pushed to the ring and delivered to listeners.
    pub fn update_telemetry(
        &mut self,
        position: &Position,
        orientation: &Orientation,
        thruster_load: f64,
    ) -> Vec<TelemetryAlert> {
        let load = if thruster_load.is_finite() {
            thruster_load.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let depth = if position.depth.is_finite() {
            position.depth.max(0.0)
        } else {
            self.telemetry.depth
        };

        let battery = self.step_battery(load);
        let temperature = self.temperature(depth);
        let environmental = self.step_environment(depth);

        self.telemetry = TelemetryData {
            timestamp: Utc::now(),
            depth,
            temperature,
            pressure: model::pressure_bar(depth),
            orientation: *orientation,
            battery,
            communication: model::communication(depth),
            environmental,
        };

        debug!(
            depth,
            battery = battery.level,
            signal = self.telemetry.communication.signal_strength,
            "Telemetry updated"
        );

        let raised = alerts::evaluate(&self.telemetry, &self.config);
        for alert in &raised {
            self.dispatch(alert.clone());
        }
        raised
    }

    /// Copy of the latest snapshot
    pub fn get_telemetry(&self) -> TelemetryData {
        self.telemetry.clone()
    }

    /// Copy of the alert ring, newest first
    pub fn get_alerts(&self) -> Vec<TelemetryAlert> {
        self.alerts.snapshot()
    }

    pub fn clear_alerts(&mut self) {
        self.alerts.clear();
    }

    /// Register an alert listener. Listeners run in registration order.
    pub fn on_alert<F>(&mut self, callback: F)
    where
        F: FnMut(&TelemetryAlert) + Send + 'static,
    {
        self.listeners.push(Box::new(callback));
    }

    /// Dock or undock the vehicle; while charging the level rises instead of draining
    pub fn set_charging(&mut self, charging: bool) {
        self.telemetry.battery.charging = charging;
    }

    pub fn is_charging(&self) -> bool {
        self.telemetry.battery.charging
    }

    fn step_battery(&self, load: f64) -> BatteryStatus {
        let previous = self.telemetry.battery;
        let drain = model::drain_per_tick(self.config.base_drain, self.config.load_drain, load);

        let level = if previous.charging {
            (previous.level + self.config.charge_rate).min(100.0)
        } else {
            (previous.level - drain).max(0.0)
        };

        BatteryStatus {
            level,
            voltage: model::battery_voltage(level),
            current: model::battery_current(load),
            time_remaining: model::time_remaining(level, drain),
            charging: previous.charging,
        }
    }

    fn temperature(&mut self, depth: f64) -> f64 {
        let base = model::base_temperature(depth);
        if depth > model::THERMOCLINE_DEPTH_M {
            base + self.noise.jitter(model::DEEP_TEMPERATURE_NOISE_C)
        } else {
            base
        }
    }

    fn step_environment(&mut self, depth: f64) -> EnvironmentalData {
        let previous = self.telemetry.environmental;

        let turbidity =
            (previous.turbidity + self.noise.jitter(TURBIDITY_STEP_NTU)).clamp(0.0, MAX_TURBIDITY_NTU);
        let current_speed = (previous.current_speed + self.noise.jitter(CURRENT_SPEED_STEP_MS))
            .clamp(0.0, MAX_CURRENT_SPEED_MS);
        let current_direction =
            wrap_degrees(previous.current_direction + self.noise.jitter(CURRENT_DIRECTION_STEP_DEG));

        EnvironmentalData {
            visibility: model::visibility(depth, turbidity),
            current_speed,
            current_direction,
            salinity: model::NOMINAL_SALINITY_PPT + self.noise.jitter(SALINITY_NOISE_PPT),
            turbidity,
        }
    }

    fn dispatch(&mut self, alert: TelemetryAlert) {
        match alert.severity {
            AlertSeverity::Critical => error!(kind = ?alert.alert_type, "{}", alert.message),
            AlertSeverity::Warning => warn!(kind = ?alert.alert_type, "{}", alert.message),
            AlertSeverity::Info => debug!(kind = ?alert.alert_type, "{}", alert.message),
        }

        for listener in self.listeners.iter_mut() {
            listener(&alert);
        }
        self.alerts.push(alert);
    }
}

impl Default for TelemetryMonitor {
    fn default() -> Self {
        Self::new(TelemetryConfig::default())
    }
}

fn initial_telemetry(config: &TelemetryConfig) -> TelemetryData {
    let mut battery = BatteryStatus::full();
    battery.time_remaining = model::time_remaining(battery.level, config.base_drain);

    TelemetryData {
        timestamp: Utc::now(),
        depth: 0.0,
        temperature: model::base_temperature(0.0),
        pressure: model::pressure_bar(0.0),
        orientation: Orientation::default(),
        battery,
        communication: model::communication(0.0),
        environmental: EnvironmentalData::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlertType, ConnectionType, SilentNoise};
    use std::sync::{Arc, Mutex};

    fn quiet_monitor() -> TelemetryMonitor {
        TelemetryMonitor::with_noise(TelemetryConfig::default(), SilentNoise)
    }

    fn at_depth(depth: f64) -> Position {
        Position::new(36.8, -121.9, depth)
    }

    #[test]
    fn test_initial_snapshot() {
        let monitor = quiet_monitor();
        let t = monitor.get_telemetry();
        assert_eq!(t.battery.level, 100.0);
        assert_eq!(t.battery.time_remaining, 1000);
        assert_eq!(t.pressure, 1.0);
        assert_eq!(t.communication.connection_type, ConnectionType::Tether);
        assert!(monitor.get_alerts().is_empty());
    }

    #[test]
    fn test_full_load_drain_over_100_ticks() {
        let mut monitor = quiet_monitor();
        for _ in 0..100 {
            monitor.update_telemetry(&at_depth(10.0), &Orientation::default(), 100.0);
        }
        let battery = monitor.get_telemetry().battery;
        assert!((battery.level - 89.0).abs() < 1e-9);
        assert_eq!(battery.current, 50.0);
        assert!((battery.voltage - (42.0 + 0.89 * 6.0)).abs() < 1e-9);
        // floor(89 / 0.11 * 0.1)
        assert_eq!(battery.time_remaining, 80);
    }

    #[test]
    fn test_battery_floors_at_zero() {
        let config = TelemetryConfig {
            base_drain: 30.0,
            ..TelemetryConfig::default()
        };
        let mut monitor = TelemetryMonitor::with_noise(config, SilentNoise);
        for _ in 0..5 {
            monitor.update_telemetry(&at_depth(0.0), &Orientation::default(), 0.0);
        }
        assert_eq!(monitor.get_telemetry().battery.level, 0.0);
    }

    #[test]
    fn test_charging_raises_level_capped() {
        let mut monitor = quiet_monitor();
        for _ in 0..10 {
            monitor.update_telemetry(&at_depth(0.0), &Orientation::default(), 100.0);
        }
        let drained = monitor.get_telemetry().battery.level;

        monitor.set_charging(true);
        monitor.update_telemetry(&at_depth(0.0), &Orientation::default(), 100.0);
        let charged = monitor.get_telemetry().battery;
        assert!(charged.charging);
        assert!((charged.level - (drained + 0.05)).abs() < 1e-9);

        for _ in 0..1000 {
            monitor.update_telemetry(&at_depth(0.0), &Orientation::default(), 0.0);
        }
        assert_eq!(monitor.get_telemetry().battery.level, 100.0);
    }

    #[test]
    fn test_out_of_range_load_clamped() {
        let mut monitor = quiet_monitor();
        monitor.update_telemetry(&at_depth(0.0), &Orientation::default(), 250.0);
        assert_eq!(monitor.get_telemetry().battery.current, 50.0);
        monitor.update_telemetry(&at_depth(0.0), &Orientation::default(), f64::NAN);
        assert_eq!(monitor.get_telemetry().battery.current, 0.0);
    }

    #[test]
    fn test_deep_temperature_noise_bounded() {
        let mut monitor = TelemetryMonitor::new(TelemetryConfig::default().with_seed(3));
        for _ in 0..200 {
            monitor.update_telemetry(&at_depth(250.0), &Orientation::default(), 0.0);
            let t = monitor.get_telemetry().temperature;
            assert!((3.75..=4.25).contains(&t), "temperature {t}");
        }
    }

    #[test]
    fn test_environment_walk_stays_bounded() {
        let mut monitor = TelemetryMonitor::new(TelemetryConfig::default().with_seed(11));
        for _ in 0..500 {
            monitor.update_telemetry(&at_depth(30.0), &Orientation::default(), 0.0);
            let env = monitor.get_telemetry().environmental;
            assert!((0.0..=2.0).contains(&env.current_speed));
            assert!((0.0..360.0).contains(&env.current_direction));
            assert!((34.5..=35.5).contains(&env.salinity));
            assert!(env.visibility >= 1.0);
        }
    }

    #[test]
    fn test_orientation_passed_through() {
        let mut monitor = quiet_monitor();
        let attitude = Orientation {
            pitch: 5.0,
            yaw: 270.0,
            roll: -3.0,
        };
        monitor.update_telemetry(&at_depth(12.0), &attitude, 0.0);
        assert_eq!(monitor.get_telemetry().orientation, attitude);
    }

    #[test]
    fn test_alert_ring_capped_newest_first() {
        let config = TelemetryConfig {
            battery_warning: 100.0,
            ..TelemetryConfig::default()
        };
        let mut monitor = TelemetryMonitor::with_noise(config, SilentNoise);
        for _ in 0..60 {
            monitor.update_telemetry(&at_depth(0.0), &Orientation::default(), 0.0);
        }
        let alerts = monitor.get_alerts();
        assert_eq!(alerts.len(), 50);
        assert!(alerts[0].timestamp >= alerts[49].timestamp);
        assert!(alerts[0].value.unwrap_or(0.0) < alerts[49].value.unwrap_or(0.0));

        monitor.clear_alerts();
        assert!(monitor.get_alerts().is_empty());
    }

    #[test]
    fn test_every_listener_receives_alerts() {
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(0usize));

        let mut monitor = quiet_monitor();
        let sink = Arc::clone(&first);
        monitor.on_alert(move |alert| sink.lock().unwrap().push(alert.alert_type));
        let counter = Arc::clone(&second);
        monitor.on_alert(move |_| *counter.lock().unwrap() += 1);

        let raised = monitor.update_telemetry(&at_depth(460.0), &Orientation::default(), 0.0);
        assert_eq!(raised.len(), 2);
        assert_eq!(*first.lock().unwrap(), vec![AlertType::Depth, AlertType::Communication]);
        assert_eq!(*second.lock().unwrap(), 2);
    }

    mod proptests {
        use super::*;
        use fuzz_harness::prelude::*;

        proptest! {
            #![proptest_config(fuzz_config())]

            #[test]
            fn fuzz_pressure_formula(depth in depth_m()) {
                let mut monitor = quiet_monitor();
                monitor.update_telemetry(&at_depth(depth), &Orientation::default(), 0.0);
                let expected = ((1.0 + 1025.0 * 9.81 * depth / 100_000.0) * 100.0).round() / 100.0;
                prop_assert_eq!(monitor.get_telemetry().pressure, expected);
            }

            #[test]
            fn fuzz_battery_monotonic(loads in prop::collection::vec(raw_thruster_load(), 1..200)) {
                let mut monitor = quiet_monitor();
                let mut last = monitor.get_telemetry().battery.level;
                for load in loads {
                    monitor.update_telemetry(&at_depth(20.0), &Orientation::default(), load);
                    let level = monitor.get_telemetry().battery.level;
                    prop_assert!(level <= last);
                    prop_assert!(level >= 0.0);
                    last = level;
                }
            }
        }
    }
}
