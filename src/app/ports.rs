//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AlarmEngine / PumpController / PlantPotService
//! ```
//!
//! Driven adapters (configuration store, output pins, clock, event sinks,
//! sensors) implement these traits.  The domain consumes them via
//! generics, so the control core never touches hardware directly.

use crate::config::ConfigChange;
use crate::error::ConfigError;
use crate::sensors::SensorSnapshot;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ← configuration collaborator)
// ───────────────────────────────────────────────────────────────

/// Synchronous configuration getters.
///
/// Components call these every time they need a value and never keep
/// a copy across ticks.  Pin getters return
/// [`PIN_UNCONFIGURED`](crate::pins::PIN_UNCONFIGURED) for outputs that
/// are not wired.
pub trait ConfigPort {
    fn buzzer_pin(&self) -> u8;
    fn pump_pin(&self) -> u8;
    fn led_pin(&self) -> u8;
    fn led_active_low(&self) -> bool;

    /// Automatic watering threshold (%).
    fn soil_threshold_percent(&self) -> i32;
    fn pump_run_duration_ms(&self) -> u32;
    /// Pump PWM level while running (0–255).
    fn pump_duty_cycle(&self) -> u8;

    fn low_battery_threshold_mv(&self) -> i32;
    /// Dry-soil alarm threshold (%).
    fn low_soil_threshold_percent(&self) -> i32;
    fn alarm_sound_enabled(&self) -> bool;

    fn continuous_mode(&self) -> bool;
    fn measurement_interval_ms(&self) -> u32;
    /// Deep-sleep length between cycles when continuous mode is off.
    fn sleep_duration_secs(&self) -> u32;

    /// Validate and apply a single change.  Rejected changes leave the
    /// stored configuration untouched.
    fn apply(&self, change: ConfigChange) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Output port (domain → actuator driver)
// ───────────────────────────────────────────────────────────────

/// Digital / PWM output abstraction.
pub trait OutputPort {
    /// Claim `pin` as an output at setup time.  Returns `false` when no
    /// driver backs the pin; the caller then runs without actuation.
    fn bind_output(&mut self, pin: u8) -> bool;

    /// Drive `pin`.  `level` is 0/1 for digital outputs, 0–255 for PWM.
    fn set_output(&mut self, pin: u8, level: u8);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond counter.  Wraps at `u32::MAX`; callers compare
/// marks with `wrapping_sub`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: sampling and calibration live behind it.
pub trait SensorPort {
    fn read_all(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / dashboard)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go (serial log, dashboard sync, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

/// Pump status observer, notified on every running/stopped transition.
/// Delivery is fire-and-forget.
pub trait PumpStatusSink {
    fn pump_status_changed(&mut self, running: bool);
}

impl<S: EventSink + ?Sized> PumpStatusSink for S {
    fn pump_status_changed(&mut self, running: bool) {
        self.emit(&AppEvent::PumpStatusChanged { running });
    }
}
