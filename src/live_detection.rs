//! Live detection core module.
//!
//! This module provides the live session controller and the pieces of state it drives:
//! the rolling confidence series, the activity log, alert derivation and the camera gate.

/// Newest-first capped log of applied results.
pub mod activity_log;
/// Alert levels and the violence alert overlay.
pub mod alert;
/// Camera permission gate.
pub mod camera;
/// Confidence chart buffer.
pub mod rolling_series;
/// Session identity and lifecycle phases.
pub mod session;
/// The controller tying everything to the detection service.
pub mod session_controller;

pub use alert::{AlertLevel, AlertOverlay};
pub use camera::{CameraAccess, DeviceCamera};
pub use session::{LivePhase, Session, SessionToken};
pub use session_controller::{LiveSessionController, LiveSettings, LiveView, LEAVE_PROMPT};
