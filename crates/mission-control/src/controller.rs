//! Mission Controller
//!
//! Owns the current mission, the waypoint cursor and the event ring. Every
//! transition is guarded: a refused call returns an error and changes nothing.

use chrono::Utc;
use rov_common::{distance_3d, BoundedRing, Position};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::{
    Mission, MissionConfig, MissionDraft, MissionError, MissionEvent, MissionEventType, MissionStatus, Result,
    Waypoint,
};

/// Distance in metres between two positions
pub type DistanceFn = Box<dyn Fn(&Position, &Position) -> f64 + Send + Sync>;

/// Event listener, invoked synchronously for every new event
pub type EventCallback = Box<dyn FnMut(&MissionEvent) + Send>;

pub struct MissionController {
    config: MissionConfig,
    mission: Option<Mission>,
    cursor: usize,
    events: BoundedRing<MissionEvent>,
    listeners: Vec<EventCallback>,
    distance: DistanceFn,
}

impl MissionController {
    pub fn new(config: MissionConfig) -> Self {
        Self {
            events: BoundedRing::new(config.event_capacity),
            config,
            mission: None,
            cursor: 0,
            listeners: Vec::new(),
            distance: Box::new(distance_3d),
        }
    }

    /// Replace the arrival distance metric (3D haversine by default)
    pub fn with_distance_fn<F>(mut self, distance: F) -> Self
    where
        F: Fn(&Position, &Position) -> f64 + Send + Sync + 'static,
    {
        self.distance = Box::new(distance);
        self
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    // ========================================================================
    // Upload
    // ========================================================================

    /// Parse and validate a JSON mission, then make it current.
    ///
    /// On any error the current mission is left untouched.
    pub fn upload_mission(&mut self, json: &str) -> Result<()> {
        let draft = MissionDraft::from_json(json).inspect_err(|e| warn!(error = %e, "Mission upload rejected"))?;
        self.install(draft)
    }

    /// Make an already-typed mission current, re-running validation and
    /// resetting its progress.
    pub fn load_mission(&mut self, mission: &Mission) -> Result<()> {
        self.install(MissionDraft::from(mission))
    }

    fn install(&mut self, draft: MissionDraft) -> Result<()> {
        if let Some(current) = &self.mission {
            if current.status.is_in_progress() && !self.config.replace_in_progress {
                warn!(mission_id = %current.id, "Upload refused: mission in progress");
                return Err(MissionError::InProgress(current.id.clone()));
            }
        }

        let mission = draft
            .validate(&self.config)
            .inspect_err(|e| warn!(error = %e, "Mission upload rejected"))?;

        if let Some(previous) = &self.mission {
            if previous.status.is_in_progress() {
                warn!(previous = %previous.id, replacement = %mission.id, "Replacing mission in progress");
            }
        }

        info!(
            mission_id = %mission.id,
            waypoints = mission.waypoints.len(),
            "Mission uploaded"
        );

        let event = MissionEvent::new(
            &mission.id,
            MissionEventType::Start,
            format!("Mission '{}' uploaded with {} waypoints", mission.name, mission.waypoints.len()),
        );
        self.mission = Some(mission);
        self.cursor = 0;
        self.emit(event);
        Ok(())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn start_mission(&mut self) -> Result<()> {
        let mission = self.guard("start", |s| s == MissionStatus::Pending)?;
        mission.status = MissionStatus::Active;
        mission.start_time = Some(Utc::now());
        let event = MissionEvent::new(&mission.id, MissionEventType::Start, "Mission started");
        info!(mission_id = %mission.id, "Mission started");
        self.emit(event);
        Ok(())
    }

    pub fn pause_mission(&mut self) -> Result<()> {
        let mission = self.guard("pause", |s| s == MissionStatus::Active)?;
        mission.status = MissionStatus::Paused;
        let event = MissionEvent::new(&mission.id, MissionEventType::Pause, "Mission paused");
        info!(mission_id = %mission.id, "Mission paused");
        self.emit(event);
        Ok(())
    }

    pub fn resume_mission(&mut self) -> Result<()> {
        let mission = self.guard("resume", |s| s == MissionStatus::Paused)?;
        mission.status = MissionStatus::Active;
        let event = MissionEvent::new(&mission.id, MissionEventType::Resume, "Mission resumed");
        info!(mission_id = %mission.id, "Mission resumed");
        self.emit(event);
        Ok(())
    }

    /// Terminal cancellation. Completed waypoints keep their state.
    pub fn abort_mission(&mut self, reason: Option<&str>) -> Result<()> {
        let mission = self.guard("abort", |s| !s.is_terminal())?;
        mission.status = MissionStatus::Aborted;
        mission.end_time = Some(Utc::now());
        let reason = reason.unwrap_or("Aborted by operator");
        let event = MissionEvent::new(&mission.id, MissionEventType::Abort, format!("Mission aborted: {reason}"));
        warn!(mission_id = %mission.id, reason, "Mission aborted");
        self.emit(event);
        Ok(())
    }

    // ========================================================================
    // Waypoints
    // ========================================================================

    /// Waypoint under the cursor, or `None` when no mission is loaded or every
    /// waypoint is done
    pub fn get_current_waypoint(&self) -> Option<Waypoint> {
        self.current_waypoint().cloned()
    }

    /// Log arrival when `position` is within the arrival radius of the current
    /// waypoint. The cursor does not move.
    ///
    /// Proximity is only checked while the mission is `Active`: a pending,
    /// paused or finished mission returns `false` and logs nothing, so a
    /// vehicle parked on a waypoint while paused does not flood the event ring.
    pub fn waypoint_reached(&mut self, position: &Position) -> bool {
        let Some(mission) = self.mission.as_ref() else {
            return false;
        };
        if mission.status != MissionStatus::Active {
            return false;
        }
        let Some(waypoint) = mission.waypoints.get(self.cursor) else {
            return false;
        };

        let distance = (self.distance)(position, &waypoint.position);
        if distance.is_nan() || distance > self.config.arrival_radius {
            return false;
        }

        debug!(waypoint_id = %waypoint.id, distance, "Waypoint reached");
        let event = MissionEvent::new(
            &mission.id,
            MissionEventType::WaypointReached,
            format!("Reached waypoint {}", waypoint.id),
        )
        .for_waypoint(&waypoint.id)
        .with_data(json!({ "distance": distance }));
        self.emit(event);
        true
    }

    /// Mark the current waypoint done and advance. Completing the last one
    /// completes the mission.
    pub fn complete_waypoint(&mut self) -> Result<()> {
        let cursor = self.cursor;
        let mission = self.guard("complete waypoint of", |s| s == MissionStatus::Active)?;
        let total = mission.waypoints.len();
        let Some(waypoint) = mission.waypoints.get_mut(cursor) else {
            return Err(MissionError::IllegalTransition {
                action: "complete waypoint of",
                from: mission.status,
            });
        };

        let now = Utc::now();
        waypoint.completed = true;
        waypoint.timestamp = Some(now);
        let waypoint_id = waypoint.id.clone();

        let completed = mission.completed_count();
        mission.progress = percent(completed, total);
        let mission_id = mission.id.clone();
        let progress = mission.progress;

        let mut events = vec![MissionEvent::new(
            &mission_id,
            MissionEventType::WaypointCompleted,
            format!("Completed waypoint {waypoint_id}"),
        )
        .for_waypoint(&waypoint_id)
        .with_data(json!({ "progress": progress }))];

        let next = cursor + 1;
        if next >= total {
            mission.status = MissionStatus::Completed;
            mission.end_time = Some(now);
            mission.progress = 100;
            events.push(MissionEvent::new(&mission_id, MissionEventType::Complete, "Mission completed"));
            info!(mission_id = %mission_id, "Mission completed");
        } else {
            info!(mission_id = %mission_id, waypoint_id = %waypoint_id, progress, "Waypoint completed");
        }

        self.cursor = next;
        for event in events {
            self.emit(event);
        }
        Ok(())
    }

    // ========================================================================
    // Authoring
    // ========================================================================

    /// Canonical two-waypoint mission as pretty-printed JSON
    pub fn export_template() -> Result<String> {
        Ok(serde_json::to_string_pretty(&MissionDraft::template())?)
    }

    // ========================================================================
    // Events / Snapshots
    // ========================================================================

    /// Register an event listener. Listeners run in registration order.
    pub fn on_event<F>(&mut self, callback: F)
    where
        F: FnMut(&MissionEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(callback));
    }

    /// Copy of the event ring, newest first
    pub fn get_events(&self) -> Vec<MissionEvent> {
        self.events.snapshot()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Copy of the current mission
    pub fn get_mission(&self) -> Option<Mission> {
        self.mission.clone()
    }

    pub fn status(&self) -> Option<MissionStatus> {
        self.mission.as_ref().map(|m| m.status)
    }

    /// Drop the current mission, whatever its state
    pub fn clear_mission(&mut self) -> Option<Mission> {
        self.cursor = 0;
        let cleared = self.mission.take();
        if let Some(mission) = &cleared {
            info!(mission_id = %mission.id, status = %mission.status, "Mission cleared");
        }
        cleared
    }

    fn current_waypoint(&self) -> Option<&Waypoint> {
        self.mission.as_ref()?.waypoints.get(self.cursor)
    }

    fn guard(&mut self, action: &'static str, allowed: impl Fn(MissionStatus) -> bool) -> Result<&mut Mission> {
        let mission = self.mission.as_mut().ok_or(MissionError::NoMission)?;
        if allowed(mission.status) {
            Ok(mission)
        } else {
            debug!(action, from = %mission.status, "Transition refused");
            Err(MissionError::IllegalTransition {
                action,
                from: mission.status,
            })
        }
    }

    fn emit(&mut self, event: MissionEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
        self.events.push(event);
    }
}

impl Default for MissionController {
    fn default() -> Self {
        Self::new(MissionConfig::default())
    }
}

/// Rounded completion percentage; only a fully completed list reports 100
fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (100.0 * done as f64 / total as f64).round() as u8;
    if done < total {
        pct.min(99)
    } else {
        100
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const THREE_WAYPOINTS: &str = r#"{
        "id": "survey-1",
        "name": "Reef survey",
        "waypoints": [
            {"id": "a", "position": {"lat": 36.8, "lon": -121.9, "depth": 10}, "action": "scan", "duration": 5},
            {"id": "b", "position": {"lat": 36.801, "lon": -121.9, "depth": 20}},
            {"id": "c", "position": {"lat": 36.802, "lon": -121.9, "depth": 10}, "action": "photo"}
        ]
    }"#;

    fn loaded() -> MissionController {
        let mut controller = MissionController::default();
        controller.upload_mission(THREE_WAYPOINTS).unwrap();
        controller
    }

    fn active() -> MissionController {
        let mut controller = loaded();
        controller.start_mission().unwrap();
        controller
    }

    fn event_types(controller: &MissionController) -> Vec<MissionEventType> {
        // Oldest first reads more naturally in assertions
        controller.get_events().iter().rev().map(|e| e.event_type).collect()
    }

    #[test]
    fn test_upload_sets_pending() {
        let controller = loaded();
        let mission = controller.get_mission().unwrap();
        assert_eq!(mission.status, MissionStatus::Pending);
        assert_eq!(mission.progress, 0);
        assert_eq!(controller.get_current_waypoint().unwrap().id, "a");
        assert_eq!(event_types(&controller), vec![MissionEventType::Start]);
    }

    #[test]
    fn test_failed_upload_keeps_current_mission() {
        let mut controller = loaded();
        let before = controller.get_mission();
        let err = controller
            .upload_mission(r#"{"id":"m2","name":"x","waypoints":[]}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Mission must have at least one waypoint");
        assert_eq!(controller.get_mission(), before);
        assert!(matches!(controller.upload_mission("[1, 2"), Err(MissionError::Parse(_))));
        assert_eq!(controller.get_mission(), before);
        assert_eq!(controller.get_events().len(), 1);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut controller = loaded();
        assert!(controller.pause_mission().is_err());
        assert!(controller.resume_mission().is_err());

        controller.start_mission().unwrap();
        assert!(controller.get_mission().unwrap().start_time.is_some());
        assert!(controller.start_mission().is_err());

        controller.pause_mission().unwrap();
        assert_eq!(controller.status(), Some(MissionStatus::Paused));
        controller.resume_mission().unwrap();
        assert_eq!(controller.status(), Some(MissionStatus::Active));

        assert_eq!(
            event_types(&controller),
            vec![
                MissionEventType::Start,
                MissionEventType::Start,
                MissionEventType::Pause,
                MissionEventType::Resume,
            ]
        );
    }

    #[test]
    fn test_abort_from_every_live_state() {
        let mut pending = loaded();
        pending.abort_mission(None).unwrap();
        assert_eq!(pending.status(), Some(MissionStatus::Aborted));

        let mut running = active();
        running.abort_mission(Some("Low battery")).unwrap();
        let latest = &running.get_events()[0];
        assert_eq!(latest.event_type, MissionEventType::Abort);
        assert!(latest.message.contains("Low battery"));

        let mut paused = active();
        paused.pause_mission().unwrap();
        paused.abort_mission(None).unwrap();
        assert!(paused.get_mission().unwrap().end_time.is_some());
    }

    #[test]
    fn test_terminal_states_refuse_everything() {
        let mut controller = active();
        controller.abort_mission(None).unwrap();
        let events_before = controller.get_events().len();

        assert!(matches!(
            controller.start_mission(),
            Err(MissionError::IllegalTransition {
                from: MissionStatus::Aborted,
                ..
            })
        ));
        assert!(controller.pause_mission().is_err());
        assert!(controller.resume_mission().is_err());
        assert!(controller.abort_mission(None).is_err());
        assert!(controller.complete_waypoint().is_err());
        assert_eq!(controller.get_events().len(), events_before);
    }

    #[test]
    fn test_no_mission() {
        let mut controller = MissionController::default();
        assert!(matches!(controller.start_mission(), Err(MissionError::NoMission)));
        assert!(controller.get_current_waypoint().is_none());
        assert!(!controller.waypoint_reached(&Position::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_arrival_logs_without_advancing() {
        let mut controller = active();
        let at_waypoint = Position::new(36.8, -121.9, 10.0);
        assert!(controller.waypoint_reached(&at_waypoint));
        assert!(controller.waypoint_reached(&at_waypoint));
        assert_eq!(controller.get_current_waypoint().unwrap().id, "a");

        let latest = &controller.get_events()[0];
        assert_eq!(latest.event_type, MissionEventType::WaypointReached);
        assert_eq!(latest.waypoint_id.as_deref(), Some("a"));
        assert_eq!(latest.data, Some(json!({"distance": 0.0})));
    }

    #[test]
    fn test_arrival_radius() {
        let mut controller = active();
        // 4 m straight below the waypoint
        assert!(controller.waypoint_reached(&Position::new(36.8, -121.9, 14.0)));
        // ~111 m north
        assert!(!controller.waypoint_reached(&Position::new(36.801, -121.9, 10.0)));
    }

    #[test]
    fn test_arrival_ignored_unless_active() {
        let mut controller = loaded();
        let at_waypoint = Position::new(36.8, -121.9, 10.0);
        assert!(!controller.waypoint_reached(&at_waypoint));
        controller.start_mission().unwrap();
        controller.pause_mission().unwrap();
        assert!(!controller.waypoint_reached(&at_waypoint));

        controller.resume_mission().unwrap();
        assert!(controller.waypoint_reached(&at_waypoint));
        controller.abort_mission(None).unwrap();
        let logged = controller.get_events().len();
        assert!(!controller.waypoint_reached(&at_waypoint));
        assert_eq!(controller.get_events().len(), logged);
    }

    #[test]
    fn test_complete_advances_and_updates_progress() {
        let mut controller = active();
        controller.complete_waypoint().unwrap();

        let mission = controller.get_mission().unwrap();
        assert!(mission.waypoints[0].completed);
        assert!(mission.waypoints[0].timestamp.is_some());
        assert_eq!(mission.progress, 33);
        assert_eq!(controller.get_current_waypoint().unwrap().id, "b");

        controller.complete_waypoint().unwrap();
        assert_eq!(controller.get_mission().unwrap().progress, 67);
    }

    #[test]
    fn test_last_waypoint_completes_mission() {
        let mut controller = active();
        for _ in 0..3 {
            controller.complete_waypoint().unwrap();
        }
        let mission = controller.get_mission().unwrap();
        assert_eq!(mission.status, MissionStatus::Completed);
        assert_eq!(mission.progress, 100);
        assert!(mission.end_time.is_some());
        assert!(controller.get_current_waypoint().is_none());
        assert_eq!(controller.get_events()[0].event_type, MissionEventType::Complete);
        assert!(controller.complete_waypoint().is_err());
    }

    #[test]
    fn test_complete_refused_while_paused() {
        let mut controller = active();
        controller.pause_mission().unwrap();
        assert!(controller.complete_waypoint().is_err());
        assert_eq!(controller.get_mission().unwrap().progress, 0);
    }

    #[test]
    fn test_colocated_vehicle_and_waypoint() {
        let mut controller = MissionController::default();
        controller
            .upload_mission(
                r#"{"id":"m","name":"dive","waypoints":[
                    {"id":"w1","position":{"lat":10.0,"lon":20.0,"depth":10}},
                    {"id":"w2","position":{"lat":10.1,"lon":20.0,"depth":10}}
                ]}"#,
            )
            .unwrap();
        controller.start_mission().unwrap();

        let vehicle = Position::new(10.0, 20.0, 10.0);
        let waypoint = controller.get_current_waypoint().unwrap();
        assert!(distance_3d(&vehicle, &waypoint.position) < 1e-6);
        assert!(controller.waypoint_reached(&vehicle));

        controller.complete_waypoint().unwrap();
        let mission = controller.get_mission().unwrap();
        assert!(mission.waypoints[0].completed);
        assert_eq!(mission.progress, 50);
        assert_eq!(controller.get_current_waypoint().unwrap().id, "w2");
    }

    #[test]
    fn test_upload_policy() {
        let mut replacing = active();
        replacing
            .upload_mission(&MissionController::export_template().unwrap())
            .unwrap();
        assert_eq!(replacing.get_mission().unwrap().id, "mission-template");
        assert_eq!(replacing.status(), Some(MissionStatus::Pending));

        let config = MissionConfig {
            replace_in_progress: false,
            ..MissionConfig::default()
        };
        let mut guarded = MissionController::new(config);
        guarded.upload_mission(THREE_WAYPOINTS).unwrap();
        guarded.start_mission().unwrap();
        assert!(matches!(
            guarded.upload_mission(&MissionController::export_template().unwrap()),
            Err(MissionError::InProgress(id)) if id == "survey-1"
        ));

        guarded.abort_mission(None).unwrap();
        guarded.upload_mission(&MissionController::export_template().unwrap()).unwrap();
        assert_eq!(guarded.get_mission().unwrap().id, "mission-template");
    }

    #[test]
    fn test_load_mission_resets_progress() {
        let mut controller = active();
        controller.complete_waypoint().unwrap();
        let half_done = controller.get_mission().unwrap();

        let mut other = MissionController::default();
        other.load_mission(&half_done).unwrap();
        let mission = other.get_mission().unwrap();
        assert_eq!(mission.status, MissionStatus::Pending);
        assert!(mission.waypoints.iter().all(|wp| !wp.completed));
    }

    #[test]
    fn test_clear_mission_and_events() {
        let mut controller = active();
        let cleared = controller.clear_mission().unwrap();
        assert_eq!(cleared.id, "survey-1");
        assert!(controller.get_mission().is_none());
        assert!(controller.clear_mission().is_none());

        controller.clear_events();
        assert!(controller.get_events().is_empty());
    }

    #[test]
    fn test_event_ring_capped() {
        let config = MissionConfig {
            event_capacity: 3,
            ..MissionConfig::default()
        };
        let mut controller = MissionController::new(config);
        controller.upload_mission(THREE_WAYPOINTS).unwrap();
        controller.start_mission().unwrap();
        controller.pause_mission().unwrap();
        controller.resume_mission().unwrap();
        assert_eq!(
            event_types(&controller),
            vec![MissionEventType::Start, MissionEventType::Pause, MissionEventType::Resume]
        );
    }

    #[test]
    fn test_every_listener_receives_events() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let count = Arc::new(Mutex::new(0usize));

        let mut controller = MissionController::default();
        let sink = Arc::clone(&log);
        controller.on_event(move |e| sink.lock().unwrap().push(e.event_type));
        let counter = Arc::clone(&count);
        controller.on_event(move |_| *counter.lock().unwrap() += 1);

        controller.upload_mission(THREE_WAYPOINTS).unwrap();
        controller.start_mission().unwrap();
        assert_eq!(*log.lock().unwrap(), vec![MissionEventType::Start, MissionEventType::Start]);
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn test_custom_distance_fn() {
        let mut controller = MissionController::default().with_distance_fn(|_, _| 0.0);
        controller.upload_mission(THREE_WAYPOINTS).unwrap();
        controller.start_mission().unwrap();
        assert!(controller.waypoint_reached(&Position::new(-45.0, 100.0, 0.0)));
    }

    #[test]
    fn test_progress_rounding_never_premature() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(199, 200), 99);
        assert_eq!(percent(4, 4), 100);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn test_template_parses() {
        let template = MissionController::export_template().unwrap();
        let value: serde_json::Value = serde_json::from_str(&template).unwrap();
        assert_eq!(value["waypoints"].as_array().map(Vec::len), Some(2));
    }

    mod proptests {
        use super::*;
        use fuzz_harness::prelude::*;

        proptest! {
            #![proptest_config(fuzz_config())]

            #[test]
            fn fuzz_progress_monotonic(
                depths in prop::collection::vec(depth_m(), 1..12),
                pauses in prop::collection::vec(any::<bool>(), 12),
            ) {
                let waypoints: Vec<_> = depths
                    .iter()
                    .enumerate()
                    .map(|(i, d)| json!({"id": format!("wp{i}"), "position": {"lat": 0.0, "lon": 0.0, "depth": d}}))
                    .collect();
                let json = json!({"id": "p", "name": "prop", "waypoints": waypoints}).to_string();

                let mut controller = MissionController::default();
                controller.upload_mission(&json).unwrap();
                controller.start_mission().unwrap();

                let mut last = 0u8;
                for (i, _) in depths.iter().enumerate() {
                    if pauses[i] {
                        controller.pause_mission().unwrap();
                        controller.resume_mission().unwrap();
                    }
                    controller.complete_waypoint().unwrap();
                    let mission = controller.get_mission().unwrap();
                    prop_assert!(mission.progress >= last);
                    prop_assert_eq!(mission.progress == 100, mission.completed_count() == depths.len());
                    last = mission.progress;
                }
                prop_assert_eq!(controller.status(), Some(MissionStatus::Completed));
            }
        }
    }
}
