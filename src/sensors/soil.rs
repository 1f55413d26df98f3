//! Capacitive soil moisture probe.
//!
//! The probe output falls as moisture rises.  A two-point calibration
//! (ADC counts in air vs. in water) maps the raw reading linearly onto
//! 0–100 %.  The probe supply is switched on only around each sample to
//! limit electrolysis and battery drain.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

use crate::drivers::hw_init;
use crate::sensors::INVALID_READING;

static SIM_SOIL_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_soil_adc(raw: u16) {
    SIM_SOIL_ADC.store(raw, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    /// ADC counts with the probe in dry air (0 %).
    pub dry_adc: u16,
    /// ADC counts with the probe in water (100 %).
    pub wet_adc: u16,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            dry_adc: 2755,
            wet_adc: 930,
        }
    }
}

pub struct SoilSensor {
    cal: Calibration,
    adc_channel: u32,
    vcc_gpio: Option<u8>,
}

impl SoilSensor {
    pub fn new(adc_channel: u32, vcc_gpio: Option<u8>) -> Self {
        Self {
            cal: Calibration::default(),
            adc_channel,
            vcc_gpio,
        }
    }

    pub fn set_calibration(&mut self, cal: Calibration) {
        self.cal = cal;
    }

    /// Sample the probe.  Returns [`INVALID_READING`] when the ADC read
    /// failed or the calibration is degenerate.
    pub fn read_percent(&mut self) -> i32 {
        if let Some(pin) = self.vcc_gpio {
            hw_init::gpio_write(pin, true);
        }
        let raw = self.read_adc();
        if let Some(pin) = self.vcc_gpio {
            hw_init::gpio_write(pin, false);
        }
        match raw {
            Some(raw) => adc_to_percent(raw, self.cal),
            None => INVALID_READING,
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Option<u16> {
        hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Option<u16> {
        let _ = self.adc_channel;
        Some(SIM_SOIL_ADC.load(Ordering::Relaxed))
    }
}

/// Linear two-point map of a raw sample onto 0–100 %, clamped.
pub fn adc_to_percent(raw: u16, cal: Calibration) -> i32 {
    let dry = i32::from(cal.dry_adc);
    let wet = i32::from(cal.wet_adc);
    if dry == wet {
        return INVALID_READING;
    }
    let percent = (dry - i32::from(raw)) * 100 / (dry - wet);
    percent.clamp(0, 100)
}
