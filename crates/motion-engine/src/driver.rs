//! Periodic Simulation Driver
//!
//! Convenience scheduler that calls `update_state` on a tokio interval.
//! Hosts that own their own clock call `MotionEngine::update_state` directly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::MotionEngine;

/// Engine handle shared between the driver task and the host
pub type SharedMotionEngine = Arc<Mutex<MotionEngine>>;

/// Shortest tick the driver accepts
const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub struct SimulationDriver {
    engine: SharedMotionEngine,
    task: Option<JoinHandle<()>>,
}

impl SimulationDriver {
    pub fn new(engine: SharedMotionEngine) -> Self {
        Self { engine, task: None }
    }

    /// Shared handle to the driven engine
    pub fn engine(&self) -> SharedMotionEngine {
        Arc::clone(&self.engine)
    }

    /// Start ticking every `interval` with `dt = interval`. Restarts if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, interval: Duration) {
        self.stop();

        let interval = interval.max(MIN_INTERVAL);
        let dt = interval.as_secs_f64();
        let engine = Arc::clone(&self.engine);

        info!(interval_ms = interval.as_millis() as u64, "Starting motion simulation");

        self.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                engine.lock().await.update_state(dt);
            }
        }));
    }

    /// Stop ticking. Idempotent; the engine keeps its last computed state.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Motion simulation stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DroneStatus, MotionTuning, MovementCommand};
    use rov_common::Position;

    fn shared_engine() -> SharedMotionEngine {
        let engine = MotionEngine::at(Position::new(0.0, 0.0, 0.0), MotionTuning::default());
        Arc::new(Mutex::new(engine))
    }

    #[tokio::test]
    async fn test_driver_advances_engine() {
        let engine = shared_engine();
        engine.lock().await.execute_command(&MovementCommand::depth(100.0));

        let mut driver = SimulationDriver::new(Arc::clone(&engine));
        driver.start(Duration::from_millis(5));
        assert!(driver.is_running());

        time::sleep(Duration::from_millis(100)).await;
        driver.stop();

        let state = engine.lock().await.state();
        assert!(state.position.depth > 0.0);
        assert_eq!(state.status, DroneStatus::Descending);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_keeps_state() {
        let engine = shared_engine();
        engine.lock().await.execute_command(&MovementCommand::depth(100.0));

        let mut driver = SimulationDriver::new(Arc::clone(&engine));
        driver.start(Duration::from_millis(5));
        time::sleep(Duration::from_millis(50)).await;

        driver.stop();
        driver.stop();
        assert!(!driver.is_running());

        // Let an aborted task finish unwinding before sampling
        time::sleep(Duration::from_millis(10)).await;
        let frozen = engine.lock().await.state();
        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(engine.lock().await.state(), frozen);
        assert!(frozen.position.depth > 0.0);
    }

    #[tokio::test]
    async fn test_restart_replaces_task() {
        let engine = shared_engine();
        let mut driver = SimulationDriver::new(engine);
        driver.start(Duration::from_millis(5));
        driver.start(Duration::ZERO);
        assert!(driver.is_running());
        driver.stop();
        assert!(!driver.is_running());
    }
}
