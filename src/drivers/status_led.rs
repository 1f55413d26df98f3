//! Single-colour status LED driver.
//!
//! Boards wire the LED either to VCC (lit when the pin is LOW) or to GND;
//! `active_low` hides the difference so callers only say lit or dark.

use embedded_hal::digital::{OutputPin, PinState};

pub struct StatusLed<P: OutputPin> {
    pin: P,
    active_low: bool,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Wrap `pin` with the LED dark.
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut led = Self {
            pin,
            active_low,
            lit: true,
        };
        led.set(false);
        led
    }

    pub fn set(&mut self, lit: bool) {
        let level = PinState::from(lit != self.active_low);
        if self.pin.set_state(level).is_err() {
            log::error!("status_led: output write failed");
            return;
        }
        self.lit = lit;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
