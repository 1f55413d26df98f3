//! Outbound application events.
//!
//! The [`PlantPotService`](super::service::PlantPotService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them — log to serial, mirror to
//! the cloud dashboard, etc.

use serde::Serialize;

use crate::alarm::AlarmKind;
use crate::error::ConfigError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Periodic telemetry snapshot (one per measurement).
    Telemetry(Telemetry),

    /// The overall alarm flag flipped.  Pushed out-of-band so the
    /// dashboard does not wait for the next telemetry frame.
    AlarmChanged { active: bool },

    /// A single hazard became active (diagnostic rising edge).
    AlarmRaised(AlarmKind),

    /// The pump started or stopped.
    PumpStatusChanged { running: bool },

    /// A dashboard command could not be applied.
    CommandRejected(ConfigError),

    /// The application service has started.
    Started,
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub soil_moisture_percent: i32,
    pub water_level: i32,
    pub battery_voltage: f32,
    pub alarm_active: bool,
    pub low_water: bool,
    pub low_battery: bool,
    pub low_soil: bool,
    pub pump_running: bool,
}
