//! Battery voltage monitor.
//!
//! The cell is sampled through a 1:1 resistive divider on ADC1, so the
//! terminal voltage is twice the pin voltage.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_BATTERY_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_battery_adc(raw: u16) {
    SIM_BATTERY_ADC.store(raw, Ordering::Relaxed);
}

const ADC_MAX: f32 = 4095.0;
const V_REF: f32 = 3.3;
const DIVIDER_RATIO: f32 = 2.0;

pub struct BatteryMonitor {
    adc_channel: u32,
    last_voltage: f32,
}

impl BatteryMonitor {
    pub fn new(adc_channel: u32) -> Self {
        Self {
            adc_channel,
            last_voltage: 0.0,
        }
    }

    /// Terminal voltage in volts.  A failed read reports 0.0, which the
    /// alarm engine treats as "no reading".
    pub fn read_voltage(&mut self) -> f32 {
        self.last_voltage = self.read_adc().map_or(0.0, adc_to_voltage);
        self.last_voltage
    }

    pub fn last_voltage(&self) -> f32 {
        self.last_voltage
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Option<u16> {
        hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Option<u16> {
        let _ = self.adc_channel;
        Some(SIM_BATTERY_ADC.load(Ordering::Relaxed))
    }
}

pub fn adc_to_voltage(raw: u16) -> f32 {
    f32::from(raw) / ADC_MAX * V_REF * DIVIDER_RATIO
}
