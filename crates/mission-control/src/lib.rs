//! ROV Mission Control
//!
//! Holds the single current waypoint mission and drives it through its lifecycle:
//!
//! ```text
//! pending --start--> active <--pause/resume--> paused
//! active --last waypoint completed--> completed
//! pending | active | paused --abort--> aborted
//! ```
//!
//! Uploads cross a parse-then-validate boundary: JSON becomes a [`MissionDraft`]
//! and only a successfully validated [`Mission`] reaches the state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use rov_common::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod config;
pub mod controller;
pub mod draft;

pub use config::MissionConfig;
pub use controller::{DistanceFn, EventCallback, MissionController};
pub use draft::{MissionDraft, PositionDraft, WaypointDraft};

#[derive(Error, Debug)]
pub enum MissionError {
    #[error("Invalid mission JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    Validation(String),
    #[error("Cannot {action} mission while {from}")]
    IllegalTransition {
        action: &'static str,
        from: MissionStatus,
    },
    #[error("No mission loaded")]
    NoMission,
    #[error("Mission {0} is in progress; abort or clear it first")]
    InProgress(String),
}

pub type Result<T> = std::result::Result<T, MissionError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    #[default]
    Pending,
    Active,
    Paused,
    Completed,
    Aborted,
}

impl MissionStatus {
    /// No transition leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, MissionStatus::Completed | MissionStatus::Aborted)
    }

    /// Active or paused
    pub fn is_in_progress(&self) -> bool {
        matches!(self, MissionStatus::Active | MissionStatus::Paused)
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MissionStatus::Pending => "pending",
            MissionStatus::Active => "active",
            MissionStatus::Paused => "paused",
            MissionStatus::Completed => "completed",
            MissionStatus::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WaypointAction {
    Hover,
    Scan,
    Sample,
    Photo,
    Wait,
}

impl WaypointAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hover" => Some(WaypointAction::Hover),
            "scan" => Some(WaypointAction::Scan),
            "sample" => Some(WaypointAction::Sample),
            "photo" => Some(WaypointAction::Photo),
            "wait" => Some(WaypointAction::Wait),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WaypointAction::Hover => "hover",
            WaypointAction::Scan => "scan",
            WaypointAction::Sample => "sample",
            WaypointAction::Photo => "photo",
            WaypointAction::Wait => "wait",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub id: String,
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<WaypointAction>,
    /// Seconds to hold at the waypoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    /// When the waypoint was completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: String,
    pub name: String,
    pub description: String,
    pub waypoints: Vec<Waypoint>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: MissionStatus,
    /// Percentage of waypoints completed (0-100)
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Mission {
    pub fn completed_count(&self) -> usize {
        self.waypoints.iter().filter(|wp| wp.completed).count()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissionEventType {
    Start,
    WaypointReached,
    WaypointCompleted,
    Pause,
    Resume,
    Abort,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MissionEvent {
    pub id: Uuid,
    pub mission_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waypoint_id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: MissionEventType,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl MissionEvent {
    pub fn new(mission_id: &str, event_type: MissionEventType, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mission_id: mission_id.to_string(),
            waypoint_id: None,
            event_type,
            timestamp: Utc::now(),
            message: message.into(),
            data: None,
        }
    }

    pub fn for_waypoint(mut self, waypoint_id: &str) -> Self {
        self.waypoint_id = Some(waypoint_id.to_string());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}
