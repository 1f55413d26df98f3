//! Device configuration parameters
//!
//! All tunable parameters for the Flaura pot.  The control components
//! never cache these: they read them through
//! [`ConfigPort`](crate::app::ports::ConfigPort) on every evaluation, so
//! a dashboard write lands on the next tick.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::info;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigPort;
use crate::error::ConfigError;
use crate::pins;

/// Core device configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Pins ---
    /// Buzzer output pin ([`pins::PIN_UNCONFIGURED`] disables sound)
    pub buzzer_pin: u8,
    /// Pump PWM output pin
    pub pump_pin: u8,
    /// Status LED pin
    pub led_pin: u8,
    /// LED lights when its pin is driven LOW
    pub led_active_low: bool,
    /// Front-panel button input pin
    pub button_pin: u8,

    // --- Pump ---
    /// Soil moisture (%) below which the pump starts automatically
    pub soil_threshold_percent: i32,
    /// Automatic watering run time (milliseconds)
    pub pump_run_duration_ms: u32,
    /// Pump PWM duty while running (0-255)
    pub pump_duty_cycle: u8,

    // --- Alarm ---
    /// Battery voltage (mV) below which the low-battery alarm fires
    pub low_battery_threshold_mv: i32,
    /// Soil moisture (%) below which the dry-soil alarm fires
    pub low_soil_threshold_percent: i32,
    /// Whether alarms are audible
    pub alarm_sound_enabled: bool,

    // --- Timing / power ---
    /// Stay awake between measurements instead of deep sleeping
    pub continuous_mode: bool,
    /// Interval between sensor measurements in continuous mode (milliseconds)
    pub measurement_interval_ms: u32,
    /// Deep-sleep duration between cycles (seconds)
    pub sleep_duration_secs: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            // Pins
            buzzer_pin: pins::BUZZER_GPIO,
            pump_pin: pins::PUMP_GPIO,
            led_pin: pins::LED_GPIO,
            led_active_low: false,
            button_pin: pins::BUTTON_GPIO,

            // Pump
            soil_threshold_percent: 30,
            pump_run_duration_ms: 3000,
            pump_duty_cycle: 255,

            // Alarm
            low_battery_threshold_mv: 3300,
            low_soil_threshold_percent: 20,
            alarm_sound_enabled: true,

            // Timing / power
            continuous_mode: true,
            measurement_interval_ms: 5000,
            sleep_duration_secs: 3600,
        }
    }
}

impl DeviceConfig {
    /// Range-check every tunable.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=100).contains(&self.soil_threshold_percent) {
            return Err(ConfigError::ValidationFailed(
                "soil_threshold_percent must be 0–100",
            ));
        }
        if !(0..=100).contains(&self.low_soil_threshold_percent) {
            return Err(ConfigError::ValidationFailed(
                "low_soil_threshold_percent must be 0–100",
            ));
        }
        if !(0..=5000).contains(&self.low_battery_threshold_mv) {
            return Err(ConfigError::ValidationFailed(
                "low_battery_threshold_mv must be 0–5000",
            ));
        }
        if !(100..=600_000).contains(&self.pump_run_duration_ms) {
            return Err(ConfigError::ValidationFailed(
                "pump_run_duration_ms must be 100–600000",
            ));
        }
        if !(1000..=3_600_000).contains(&self.measurement_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "measurement_interval_ms must be 1000–3600000",
            ));
        }
        if !(60..=86_400).contains(&self.sleep_duration_secs) {
            return Err(ConfigError::ValidationFailed(
                "sleep_duration_secs must be 60–86400",
            ));
        }
        self.validate_pins()
    }

    /// Each actuator and the button own their pin exclusively.
    fn validate_pins(&self) -> Result<(), ConfigError> {
        let assigned = [self.buzzer_pin, self.pump_pin, self.led_pin, self.button_pin];
        for (i, &pin) in assigned.iter().enumerate() {
            if pin != pins::PIN_UNCONFIGURED && assigned[i + 1..].contains(&pin) {
                return Err(ConfigError::ValidationFailed(
                    "buzzer, pump, LED and button pins must be distinct",
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Runtime changes
// ---------------------------------------------------------------------------

/// A single dashboard-driven configuration write.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConfigChange {
    AlarmSoundEnabled(bool),
    PumpRunDurationMs(u32),
    PumpDutyCycle(u8),
    SoilThresholdPercent(i32),
    LowBatteryThresholdMv(i32),
    LowSoilThresholdPercent(i32),
    ContinuousMode(bool),
}

impl ConfigChange {
    fn apply_to(self, cfg: &mut DeviceConfig) {
        match self {
            Self::AlarmSoundEnabled(v) => cfg.alarm_sound_enabled = v,
            Self::PumpRunDurationMs(v) => cfg.pump_run_duration_ms = v,
            Self::PumpDutyCycle(v) => cfg.pump_duty_cycle = v,
            Self::SoilThresholdPercent(v) => cfg.soil_threshold_percent = v,
            Self::LowBatteryThresholdMv(v) => cfg.low_battery_threshold_mv = v,
            Self::LowSoilThresholdPercent(v) => cfg.low_soil_threshold_percent = v,
            Self::ContinuousMode(v) => cfg.continuous_mode = v,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared store
// ---------------------------------------------------------------------------

/// Configuration shared between the control loop and any other context
/// (network callbacks, ISRs).  Every access takes a short critical section.
pub struct SharedConfig {
    inner: Mutex<CriticalSectionRawMutex, RefCell<DeviceConfig>>,
}

impl SharedConfig {
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(config)),
        }
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> DeviceConfig {
        self.inner.lock(|c| c.borrow().clone())
    }

    fn read<T>(&self, f: impl FnOnce(&DeviceConfig) -> T) -> T {
        self.inner.lock(|c| f(&c.borrow()))
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new(DeviceConfig::default())
    }
}

impl ConfigPort for SharedConfig {
    fn buzzer_pin(&self) -> u8 {
        self.read(|c| c.buzzer_pin)
    }

    fn pump_pin(&self) -> u8 {
        self.read(|c| c.pump_pin)
    }

    fn led_pin(&self) -> u8 {
        self.read(|c| c.led_pin)
    }

    fn led_active_low(&self) -> bool {
        self.read(|c| c.led_active_low)
    }

    fn soil_threshold_percent(&self) -> i32 {
        self.read(|c| c.soil_threshold_percent)
    }

    fn pump_run_duration_ms(&self) -> u32 {
        self.read(|c| c.pump_run_duration_ms)
    }

    fn pump_duty_cycle(&self) -> u8 {
        self.read(|c| c.pump_duty_cycle)
    }

    fn low_battery_threshold_mv(&self) -> i32 {
        self.read(|c| c.low_battery_threshold_mv)
    }

    fn low_soil_threshold_percent(&self) -> i32 {
        self.read(|c| c.low_soil_threshold_percent)
    }

    fn alarm_sound_enabled(&self) -> bool {
        self.read(|c| c.alarm_sound_enabled)
    }

    fn continuous_mode(&self) -> bool {
        self.read(|c| c.continuous_mode)
    }

    fn measurement_interval_ms(&self) -> u32 {
        self.read(|c| c.measurement_interval_ms)
    }

    fn sleep_duration_secs(&self) -> u32 {
        self.read(|c| c.sleep_duration_secs)
    }

    fn apply(&self, change: ConfigChange) -> Result<(), ConfigError> {
        self.inner.lock(|c| {
            let mut candidate = c.borrow().clone();
            change.apply_to(&mut candidate);
            candidate.validate()?;
            *c.borrow_mut() = candidate;
            info!("Config updated: {:?}", change);
            Ok(())
        })
    }
}
