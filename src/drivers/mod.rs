//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod button;
pub mod buzzer;
pub mod hw_init;
pub mod led_patterns;
pub mod pump;
pub mod status_led;
