//! Threshold alerts
//!
//! Every rule is evaluated on every tick. Battery and depth escalate: when the
//! critical threshold is met the warning for the same quantity is suppressed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{TelemetryConfig, TelemetryData};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Battery,
    Depth,
    Temperature,
    Pressure,
    Communication,
    Environment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryAlert {
    pub id: Uuid,
    pub severity: AlertSeverity,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl TelemetryAlert {
    pub fn new(
        severity: AlertSeverity,
        alert_type: AlertType,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            alert_type,
            message: message.into(),
            timestamp,
            value: None,
            threshold: None,
        }
    }

    pub fn with_reading(mut self, value: f64, threshold: f64) -> Self {
        self.value = Some(value);
        self.threshold = Some(threshold);
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == AlertSeverity::Critical
    }
}

/// Run every threshold rule against a snapshot, in table order
pub fn evaluate(data: &TelemetryData, config: &TelemetryConfig) -> Vec<TelemetryAlert> {
    let now = data.timestamp;
    let mut alerts = Vec::new();

    let level = data.battery.level;
    if level <= config.battery_critical {
        alerts.push(
            TelemetryAlert::new(
                AlertSeverity::Critical,
                AlertType::Battery,
                format!("Battery critically low: {level:.1}%"),
                now,
            )
            .with_reading(level, config.battery_critical),
        );
    } else if level <= config.battery_warning {
        alerts.push(
            TelemetryAlert::new(
                AlertSeverity::Warning,
                AlertType::Battery,
                format!("Battery low: {level:.1}%"),
                now,
            )
            .with_reading(level, config.battery_warning),
        );
    }

    let depth = data.depth;
    let depth_warning = config.max_depth * config.depth_warning_ratio;
    if depth >= config.max_depth {
        alerts.push(
            TelemetryAlert::new(
                AlertSeverity::Critical,
                AlertType::Depth,
                format!("Maximum depth reached: {depth:.1}m"),
                now,
            )
            .with_reading(depth, config.max_depth),
        );
    }
    if depth >= depth_warning {
        alerts.push(
            TelemetryAlert::new(
                AlertSeverity::Warning,
                AlertType::Depth,
                format!("Approaching maximum depth: {depth:.1}m"),
                now,
            )
            .with_reading(depth, depth_warning),
        );
    }

    let temperature = data.temperature;
    if temperature < config.temperature_min || temperature > config.temperature_max {
        let threshold = if temperature < config.temperature_min {
            config.temperature_min
        } else {
            config.temperature_max
        };
        alerts.push(
            TelemetryAlert::new(
                AlertSeverity::Warning,
                AlertType::Temperature,
                format!("Water temperature out of range: {temperature:.1}C"),
                now,
            )
            .with_reading(temperature, threshold),
        );
    }

    let signal = data.communication.signal_strength;
    if signal < config.min_signal {
        alerts.push(
            TelemetryAlert::new(
                AlertSeverity::Warning,
                AlertType::Communication,
                format!("Weak communication signal: {signal:.0}%"),
                now,
            )
            .with_reading(signal, config.min_signal),
        );
    }

    alerts
}
