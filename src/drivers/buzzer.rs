//! Piezo buzzer driver.
//!
//! Active buzzer on a plain digital output: HIGH sounds, LOW is silent.
//! The beep cadence lives in the alarm engine; this driver only switches
//! the pin.

use embedded_hal::digital::OutputPin;

pub struct Buzzer<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Buzzer<P> {
    /// Wrap `pin` and make sure the buzzer starts silent.
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, on: false }
    }

    pub fn set(&mut self, on: bool) {
        let result = if on { self.pin.set_high() } else { self.pin.set_low() };
        if result.is_err() {
            log::error!("buzzer: output write failed");
            return;
        }
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
