//! Irrigation pump motor driver (logic-level MOSFET on LEDC PWM).
//!
//! Takes an 8-bit duty (0–255) and scales it onto whatever resolution
//! the PWM channel has.
//!
//! ## Safety contract
//!
//! The pump must never run with an empty reservoir.  That is enforced by
//! the pump controller; this driver is a dumb actuator.

use embedded_hal::pwm::SetDutyCycle;

pub struct PumpPwm<C: SetDutyCycle> {
    channel: C,
    duty: u8,
}

impl<C: SetDutyCycle> PumpPwm<C> {
    /// Wrap `channel` with the motor stopped.
    pub fn new(mut channel: C) -> Self {
        let _ = channel.set_duty_cycle_fully_off();
        Self { channel, duty: 0 }
    }

    pub fn set_duty(&mut self, duty: u8) {
        let scaled = u32::from(duty) * u32::from(self.channel.max_duty_cycle()) / 255;
        // `scaled` never exceeds max_duty_cycle(), which is a u16.
        if self.channel.set_duty_cycle(scaled as u16).is_err() {
            log::error!("pump: PWM duty write failed");
            return;
        }
        self.duty = duty;
    }

    pub fn stop(&mut self) {
        self.set_duty(0);
    }

    pub fn is_running(&self) -> bool {
        self.duty > 0
    }

    pub fn current_duty(&self) -> u8 {
        self.duty
    }
}
