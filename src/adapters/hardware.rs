//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and all actuator drivers, exposing them
//! through [`SensorPort`] and [`OutputPort`].  This is the only module
//! in the system that touches actual hardware.  On non-espidf targets,
//! the underlying drivers use cfg-gated simulation stubs.
//!
//! Actuator pins come from configuration, so each driver is attached
//! together with the pin number it serves.  `set_output` routes by pin;
//! a pin with no driver attached is refused at bind time.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::debug;

use crate::app::ports::{OutputPort, SensorPort};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::pump::PumpPwm;
use crate::drivers::status_led::StatusLed;
use crate::sensors::{SensorHub, SensorSnapshot};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<B: OutputPin, P: SetDutyCycle, L: OutputPin> {
    sensor_hub: SensorHub,
    buzzer: Option<(u8, Buzzer<B>)>,
    pump: Option<(u8, PumpPwm<P>)>,
    led: Option<(u8, StatusLed<L>)>,
}

impl<B: OutputPin, P: SetDutyCycle, L: OutputPin> HardwareAdapter<B, P, L> {
    pub fn new(sensor_hub: SensorHub) -> Self {
        Self {
            sensor_hub,
            buzzer: None,
            pump: None,
            led: None,
        }
    }

    #[must_use]
    pub fn with_buzzer(mut self, pin: u8, buzzer: Buzzer<B>) -> Self {
        self.buzzer = Some((pin, buzzer));
        self
    }

    #[must_use]
    pub fn with_pump(mut self, pin: u8, pump: PumpPwm<P>) -> Self {
        self.pump = Some((pin, pump));
        self
    }

    #[must_use]
    pub fn with_led(mut self, pin: u8, led: StatusLed<L>) -> Self {
        self.led = Some((pin, led));
        self
    }

    pub fn buzzer(&self) -> Option<&Buzzer<B>> {
        self.buzzer.as_ref().map(|(_, b)| b)
    }

    pub fn pump(&self) -> Option<&PumpPwm<P>> {
        self.pump.as_ref().map(|(_, p)| p)
    }

    pub fn led(&self) -> Option<&StatusLed<L>> {
        self.led.as_ref().map(|(_, l)| l)
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<B: OutputPin, P: SetDutyCycle, L: OutputPin> SensorPort for HardwareAdapter<B, P, L> {
    fn read_all(&mut self) -> SensorSnapshot {
        self.sensor_hub.read_all()
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl<B: OutputPin, P: SetDutyCycle, L: OutputPin> OutputPort for HardwareAdapter<B, P, L> {
    fn bind_output(&mut self, pin: u8) -> bool {
        self.pump.as_ref().is_some_and(|(p, _)| *p == pin)
            || self.buzzer.as_ref().is_some_and(|(p, _)| *p == pin)
            || self.led.as_ref().is_some_and(|(p, _)| *p == pin)
    }

    fn set_output(&mut self, pin: u8, level: u8) {
        if let Some((_, pump)) = self.pump.as_mut().filter(|(p, _)| *p == pin) {
            pump.set_duty(level);
        } else if let Some((_, buzzer)) = self.buzzer.as_mut().filter(|(p, _)| *p == pin) {
            buzzer.set(level != 0);
        } else if let Some((_, led)) = self.led.as_mut().filter(|(p, _)| *p == pin) {
            led.set(level != 0);
        } else {
            debug!("hardware: write to unbound pin {pin} ignored");
        }
    }
}
