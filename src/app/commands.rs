//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (cloud
//! dashboard widgets, the front-panel button) that the
//! [`PlantPotService`](super::service::PlantPotService) interprets and
//! acts upon.

use serde::Deserialize;

use crate::drivers::button::ButtonEvent;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AppCommand {
    /// Operator override: water now.  `None` uses the configured run time.
    ManualPumpOn { duration_ms: Option<u32> },

    /// Stop the pump immediately.
    ManualPumpOff,

    /// Take a fresh measurement on the next tick instead of waiting for
    /// the measurement interval.
    MeasureNow,

    /// Mute or unmute the alarm buzzer.
    SetAlarmSound(bool),

    SetPumpRunDuration(u32),
    SetPumpDuty(u8),
    SetSoilThreshold(i32),
    SetLowBatteryThreshold(i32),
    SetLowSoilThreshold(i32),

    /// Switch between continuous operation and deep-sleep cycles.
    SetContinuousMode(bool),
}

/// Front-panel button: a short press measures now, a long press waters
/// for the configured run time.
impl From<ButtonEvent> for AppCommand {
    fn from(event: ButtonEvent) -> Self {
        match event {
            ButtonEvent::ShortPress => Self::MeasureNow,
            ButtonEvent::LongPress => Self::ManualPumpOn { duration_ms: None },
        }
    }
}
