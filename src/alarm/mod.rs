//! Alarm engine.
//!
//! Re-evaluates the hazard table on every call, maintains the overall
//! alarm flag, and drives the buzzer through the [`BeepSequencer`] while
//! the alarm is active and sound is enabled.
//!
//! ## Degraded mode
//!
//! When the buzzer pin is unconfigured (or no driver backs it), the engine
//! still evaluates conditions and reports alarm changes but never touches
//! an output.  This is decided once in [`AlarmEngine::setup`] and logged
//! once.

pub mod beeper;
pub mod conditions;

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::{ConfigPort, OutputPort};
use crate::pins::PIN_UNCONFIGURED;

pub use beeper::{BeepPhase, BeepSequencer, BuzzerLevel};
pub use conditions::{AlarmCondition, AlarmInputs, AlarmKind, ConditionSet, Thresholds, HAZARDS, HAZARD_COUNT};

/// Outcome of one [`AlarmEngine::update`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmUpdate {
    /// The overall alarm flag differs from the previous call.
    pub changed: bool,
    /// Overall alarm flag after this call.
    pub active: bool,
    /// Conditions that became active on this call, highest priority first.
    pub raised: Vec<AlarmKind, HAZARD_COUNT>,
}

pub struct AlarmEngine {
    buzzer_pin: Option<u8>,
    conditions: ConditionSet,
    active: bool,
    sequencer: BeepSequencer,
    buzzer_on: bool,
}

impl Default for AlarmEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmEngine {
    /// Inert engine; call [`setup`](Self::setup) before the first update.
    pub const fn new() -> Self {
        Self {
            buzzer_pin: None,
            conditions: ConditionSet::EMPTY,
            active: false,
            sequencer: BeepSequencer::new(),
            buzzer_on: false,
        }
    }

    /// Bind the buzzer pin, drive it low, and reset all alarm state.
    pub fn setup(&mut self, config: &impl ConfigPort, out: &mut impl OutputPort) {
        let pin = config.buzzer_pin();
        self.buzzer_pin = if pin == PIN_UNCONFIGURED {
            warn!("alarm: buzzer pin not configured, running without sound");
            None
        } else if !out.bind_output(pin) {
            warn!("alarm: no output driver for buzzer pin {pin}, running without sound");
            None
        } else {
            out.set_output(pin, 0);
            info!("alarm: buzzer on GPIO {pin}");
            Some(pin)
        };
        self.conditions = ConditionSet::EMPTY;
        self.active = false;
        self.sequencer = BeepSequencer::new();
        self.buzzer_on = false;
    }

    /// Re-evaluate all conditions and advance the beep pattern.
    pub fn update(
        &mut self,
        now_ms: u32,
        inputs: AlarmInputs,
        config: &impl ConfigPort,
        out: &mut impl OutputPort,
    ) -> AlarmUpdate {
        let thresholds = Thresholds {
            low_battery_mv: config.low_battery_threshold_mv(),
            low_soil_percent: config.low_soil_threshold_percent(),
        };
        let current = ConditionSet::evaluate(&inputs, &thresholds);

        let mut raised = Vec::new();
        for kind in current.rising_since(self.conditions).kinds() {
            log_cause(kind, &inputs, &thresholds);
            // Capacity equals the hazard count.
            let _ = raised.push(kind);
        }
        self.conditions = current;

        let was_active = self.active;
        self.active = !current.is_empty();
        let changed = was_active != self.active;
        if changed {
            if self.active {
                info!("alarm: ACTIVATED");
                self.sequencer.arm();
            } else {
                info!("alarm: cleared, back to normal");
            }
        }

        if let Some(pin) = self.buzzer_pin {
            let demand = (self.active && config.alarm_sound_enabled()).then(|| current.beep_count());
            let level = self.sequencer.step(now_ms, demand);
            self.drive_buzzer(pin, level == BuzzerLevel::On, out);
        }

        AlarmUpdate {
            changed,
            active: self.active,
            raised,
        }
    }

    /// Overall alarm flag, regardless of whether sound is enabled.
    pub fn is_alarm_active(&self) -> bool {
        self.active
    }

    pub fn is_condition_active(&self, kind: AlarmKind) -> bool {
        self.conditions.contains(kind)
    }

    pub fn conditions(&self) -> ConditionSet {
        self.conditions
    }

    pub fn is_buzzer_on(&self) -> bool {
        self.buzzer_on
    }

    pub fn beeps_remaining(&self) -> u8 {
        self.sequencer.beeps_remaining()
    }

    pub fn current_beep_count(&self) -> u8 {
        self.sequencer.current_beep_count()
    }

    pub fn phase(&self) -> BeepPhase {
        self.sequencer.phase()
    }

    /// `true` when setup found no usable buzzer output.
    pub fn is_degraded(&self) -> bool {
        self.buzzer_pin.is_none()
    }

    fn drive_buzzer(&mut self, pin: u8, on: bool, out: &mut impl OutputPort) {
        if on != self.buzzer_on {
            out.set_output(pin, u8::from(on));
            self.buzzer_on = on;
        }
    }
}

fn log_cause(kind: AlarmKind, inputs: &AlarmInputs, thresholds: &Thresholds) {
    match kind {
        AlarmKind::LowBattery => warn!(
            "alarm cause: {kind} ({:.2} V < {:.2} V)",
            inputs.battery_voltage,
            thresholds.low_battery_mv as f32 / 1000.0
        ),
        AlarmKind::LowWater => warn!("alarm cause: {kind} (level {})", inputs.water_level),
        AlarmKind::LowSoil => warn!(
            "alarm cause: {kind} ({}% < {}%)",
            inputs.soil_moisture_percent, thresholds.low_soil_percent
        ),
    }
}
