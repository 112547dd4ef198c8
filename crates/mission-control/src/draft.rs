//! Untrusted mission input
//!
//! Every field of a draft is optional and coordinates are kept as raw JSON
//! values, so a malformed upload still parses and validation can name the
//! offending field.

use std::collections::HashSet;

use rov_common::Position;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{Mission, MissionConfig, MissionError, MissionStatus, Result, Waypoint, WaypointAction};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MissionDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub waypoints: Option<Vec<WaypointDraft>>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WaypointDraft {
    pub id: Option<String>,
    pub position: Option<PositionDraft>,
    pub action: Option<String>,
    pub duration: Option<Value>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PositionDraft {
    pub lat: Option<Value>,
    pub lon: Option<Value>,
    pub depth: Option<Value>,
}

impl MissionDraft {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check structure and ranges, producing a pending mission with no progress
    pub fn validate(self, config: &MissionConfig) -> Result<Mission> {
        let id = required_text(self.id).ok_or_else(|| invalid("Mission id is required"))?;
        let name = required_text(self.name).ok_or_else(|| invalid("Mission name is required"))?;

        let drafts = self.waypoints.unwrap_or_default();
        if drafts.is_empty() {
            return Err(invalid("Mission must have at least one waypoint"));
        }

        let mut seen = HashSet::new();
        let mut waypoints = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.into_iter().enumerate() {
            let waypoint = draft.validate(index, config)?;
            if !seen.insert(waypoint.id.clone()) {
                return Err(invalid(format!("Waypoint {}: duplicate id", waypoint.id)));
            }
            waypoints.push(waypoint);
        }

        Ok(Mission {
            id,
            name,
            description: self.description.unwrap_or_default(),
            waypoints,
            start_time: None,
            end_time: None,
            status: MissionStatus::Pending,
            progress: 0,
            metadata: self.metadata,
        })
    }

    /// Two-waypoint example mission for authoring tools
    pub fn template() -> Self {
        Self {
            id: Some("mission-template".to_string()),
            name: Some("Survey Template".to_string()),
            description: Some("Descend to the survey site, scan, then sample".to_string()),
            waypoints: Some(vec![
                WaypointDraft {
                    id: Some("wp-1".to_string()),
                    position: Some(PositionDraft::at(&Position::new(36.8, -121.9, 10.0))),
                    action: Some("scan".to_string()),
                    duration: Some(json!(30)),
                    description: Some("Scan the survey area".to_string()),
                },
                WaypointDraft {
                    id: Some("wp-2".to_string()),
                    position: Some(PositionDraft::at(&Position::new(36.801, -121.899, 25.0))),
                    action: Some("sample".to_string()),
                    duration: Some(json!(60)),
                    description: Some("Collect a water sample".to_string()),
                },
            ]),
            metadata: Some(json!({ "vehicle": "rov", "version": 1 })),
        }
    }
}

impl From<&Mission> for MissionDraft {
    fn from(mission: &Mission) -> Self {
        Self {
            id: Some(mission.id.clone()),
            name: Some(mission.name.clone()),
            description: Some(mission.description.clone()),
            waypoints: Some(mission.waypoints.iter().map(WaypointDraft::from).collect()),
            metadata: mission.metadata.clone(),
        }
    }
}

impl WaypointDraft {
    fn validate(self, index: usize, config: &MissionConfig) -> Result<Waypoint> {
        let id = required_text(self.id)
            .ok_or_else(|| invalid(format!("Waypoint #{}: id is required", index + 1)))?;

        let position = self
            .position
            .ok_or_else(|| invalid(format!("Waypoint {id}: position is required")))?;

        let lat = number_in(position.lat.as_ref(), -90.0, 90.0).ok_or_else(|| {
            invalid(format!("Waypoint {id}: latitude must be a number between -90 and 90"))
        })?;
        let lon = number_in(position.lon.as_ref(), -180.0, 180.0).ok_or_else(|| {
            invalid(format!("Waypoint {id}: longitude must be a number between -180 and 180"))
        })?;
        let max_depth = config.max_waypoint_depth;
        let depth = number_in(position.depth.as_ref(), 0.0, max_depth).ok_or_else(|| {
            invalid(format!("Waypoint {id}: depth must be a number between 0 and {max_depth}"))
        })?;

        let action = match self.action.as_deref() {
            None => None,
            Some(raw) => Some(
                WaypointAction::parse(raw)
                    .ok_or_else(|| invalid(format!("Waypoint {id}: unknown action '{raw}'")))?,
            ),
        };

        let duration = match self.duration.as_ref() {
            None | Some(Value::Null) => None,
            Some(raw) => Some(number_in(Some(raw), 0.0, f64::MAX).ok_or_else(|| {
                invalid(format!("Waypoint {id}: duration must be a non-negative number"))
            })?),
        };

        Ok(Waypoint {
            id,
            position: Position::new(lat, lon, depth),
            action,
            duration,
            description: self.description,
            completed: false,
            timestamp: None,
        })
    }
}

impl From<&Waypoint> for WaypointDraft {
    fn from(wp: &Waypoint) -> Self {
        Self {
            id: Some(wp.id.clone()),
            position: Some(PositionDraft::at(&wp.position)),
            action: wp.action.map(|a| a.as_str().to_string()),
            duration: wp.duration.map(Value::from),
            description: wp.description.clone(),
        }
    }
}

impl PositionDraft {
    pub fn at(pos: &Position) -> Self {
        Self {
            lat: Some(Value::from(pos.lat)),
            lon: Some(Value::from(pos.lon)),
            depth: Some(Value::from(pos.depth)),
        }
    }
}

fn invalid(message: impl Into<String>) -> MissionError {
    MissionError::Validation(message.into())
}

fn required_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn number_in(value: Option<&Value>, min: f64, max: f64) -> Option<f64> {
    value
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && (min..=max).contains(v))
}
