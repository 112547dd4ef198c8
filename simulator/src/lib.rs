//! ROV Simulator
//!
//! Host for the underwater vehicle control kernel. Owns the clock, runs the
//! three components in tick order and flies uploaded missions with a simple
//! waypoint autopilot.

pub mod autopilot;
pub mod config;
pub mod journal;
pub mod kernel;

pub use autopilot::{Autopilot, PilotMode};
pub use config::SimulatorConfig;
pub use kernel::{TickReport, VehicleKernel};
