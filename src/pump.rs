//! Non-blocking irrigation pump controller.
//!
//! Starting the pump drives the output and returns at once; the per-tick
//! [`PumpController::update`] is the only place that stops it on a
//! timer.  The pump stays on exactly while `now - started_ms <
//! duration_ms`, so a run is cut within one tick of its deadline.
//!
//! Guard rejections (already running, no output, empty reservoir, bad
//! reading) are never errors: they are logged and reported back as
//! [`Activation::Skipped`] for callers that care.

use log::{info, warn};

use crate::app::ports::{ConfigPort, OutputPort, PumpStatusSink};
use crate::pins::PIN_UNCONFIGURED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Stopped,
    Running {
        started_ms: u32,
        duration_ms: u32,
        duty: u8,
    },
}

/// Why a start request had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyRunning,
    OutputUnconfigured,
    NoWater,
    InvalidReading,
    /// Soil is at or above the watering threshold.
    SoilMoistEnough,
}

/// What a start request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Started { duration_ms: u32, duty: u8 },
    Skipped(SkipReason),
}

impl Activation {
    pub fn started(self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

pub struct PumpController {
    pin: Option<u8>,
    state: PumpState,
}

impl Default for PumpController {
    fn default() -> Self {
        Self::new()
    }
}

impl PumpController {
    pub const fn new() -> Self {
        Self {
            pin: None,
            state: PumpState::Stopped,
        }
    }

    /// Bind the pump output, force it to zero power, and clear run state.
    pub fn setup(&mut self, config: &impl ConfigPort, out: &mut impl OutputPort) {
        let pin = config.pump_pin();
        self.pin = if pin == PIN_UNCONFIGURED {
            warn!("pump: output pin not configured, pump disabled");
            None
        } else if !out.bind_output(pin) {
            warn!("pump: no PWM driver for pin {pin}, pump disabled");
            None
        } else {
            out.set_output(pin, 0);
            info!("pump: PWM output on GPIO {pin}");
            Some(pin)
        };
        self.state = PumpState::Stopped;
    }

    /// Automatic watering: start the pump if the soil is dry and there is
    /// water to pump.  Threshold, duration and duty are read from `config`
    /// on every call.
    pub fn activate_if_needed(
        &mut self,
        now_ms: u32,
        soil_moisture_percent: i32,
        water_level: i32,
        config: &impl ConfigPort,
        out: &mut impl OutputPort,
        sink: &mut impl PumpStatusSink,
    ) -> Activation {
        if self.is_running() {
            return Activation::Skipped(SkipReason::AlreadyRunning);
        }
        let Some(pin) = self.pin else {
            return Activation::Skipped(SkipReason::OutputUnconfigured);
        };
        if water_level <= 0 {
            warn!("pump: reservoir empty, auto-watering skipped");
            return Activation::Skipped(SkipReason::NoWater);
        }
        if soil_moisture_percent < 0 {
            warn!("pump: invalid soil reading, auto-watering skipped");
            return Activation::Skipped(SkipReason::InvalidReading);
        }

        let threshold = config.soil_threshold_percent();
        if soil_moisture_percent >= threshold {
            return Activation::Skipped(SkipReason::SoilMoistEnough);
        }

        info!("pump: soil {soil_moisture_percent}% < {threshold}%, watering");
        self.start(pin, now_ms, config.pump_run_duration_ms(), config.pump_duty_cycle(), out, sink)
    }

    /// Operator override: run for `duration_ms` at the configured duty,
    /// ignoring soil and reservoir readings.
    pub fn manual_turn_on(
        &mut self,
        now_ms: u32,
        duration_ms: u32,
        config: &impl ConfigPort,
        out: &mut impl OutputPort,
        sink: &mut impl PumpStatusSink,
    ) -> Activation {
        if self.is_running() {
            warn!("pump: manual start ignored, already running");
            return Activation::Skipped(SkipReason::AlreadyRunning);
        }
        let Some(pin) = self.pin else {
            warn!("pump: manual start ignored, output not configured");
            return Activation::Skipped(SkipReason::OutputUnconfigured);
        };
        info!("pump: manual start for {duration_ms} ms");
        self.start(pin, now_ms, duration_ms, config.pump_duty_cycle(), out, sink)
    }

    /// Stop immediately.  No-op when already stopped.
    pub fn manual_turn_off(&mut self, out: &mut impl OutputPort, sink: &mut impl PumpStatusSink) {
        if self.is_running() {
            info!("pump: manual stop");
            self.stop(out, sink);
        }
    }

    /// Per-tick deadline check.  Must be called every tick.
    pub fn update(&mut self, now_ms: u32, out: &mut impl OutputPort, sink: &mut impl PumpStatusSink) {
        let PumpState::Running { started_ms, duration_ms, .. } = self.state else {
            return;
        };
        if now_ms.wrapping_sub(started_ms) >= duration_ms {
            info!("pump: run of {duration_ms} ms complete");
            self.stop(out, sink);
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, PumpState::Running { .. })
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    /// Duty currently applied to the output (0 when stopped).
    pub fn current_duty(&self) -> u8 {
        match self.state {
            PumpState::Running { duty, .. } => duty,
            PumpState::Stopped => 0,
        }
    }

    /// Remaining run time, `None` when stopped.
    pub fn remaining_ms(&self, now_ms: u32) -> Option<u32> {
        match self.state {
            PumpState::Running { started_ms, duration_ms, .. } => {
                Some(duration_ms.saturating_sub(now_ms.wrapping_sub(started_ms)))
            }
            PumpState::Stopped => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.pin.is_none()
    }

    fn start(
        &mut self,
        pin: u8,
        now_ms: u32,
        duration_ms: u32,
        duty: u8,
        out: &mut impl OutputPort,
        sink: &mut impl PumpStatusSink,
    ) -> Activation {
        out.set_output(pin, duty);
        self.state = PumpState::Running {
            started_ms: now_ms,
            duration_ms,
            duty,
        };
        sink.pump_status_changed(true);
        Activation::Started { duration_ms, duty }
    }

    fn stop(&mut self, out: &mut impl OutputPort, sink: &mut impl PumpStatusSink) {
        if let Some(pin) = self.pin {
            out.set_output(pin, 0);
        }
        self.state = PumpState::Stopped;
        sink.pump_status_changed(false);
    }
}
