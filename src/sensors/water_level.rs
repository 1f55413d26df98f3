//! Stepped reservoir level probe.
//!
//! Five contacts at increasing heights; a contact reads HIGH while it is
//! submerged.  The level is the number of consecutive submerged contacts
//! counted from the bottom, so a stuck-high upper contact above a dry
//! lower one cannot report water that is not there.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads real GPIO levels via hw_init helpers.
//! On host/test: reads a simulated level from a static atomic.

use core::sync::atomic::AtomicU8;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Number of probe contacts (maximum reportable level).
pub const LEVEL_COUNT: usize = 5;

static SIM_LEVEL: AtomicU8 = AtomicU8::new(LEVEL_COUNT as u8);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_level(level: u8) {
    SIM_LEVEL.store(level.min(LEVEL_COUNT as u8), Ordering::Relaxed);
}

pub struct WaterLevelSensor {
    gpios: [u8; LEVEL_COUNT],
    last_level: i32,
}

impl WaterLevelSensor {
    pub fn new(gpios: [u8; LEVEL_COUNT]) -> Self {
        Self {
            gpios,
            last_level: LEVEL_COUNT as i32,
        }
    }

    /// Current level, 0 (empty) to [`LEVEL_COUNT`].
    pub fn read_level(&mut self) -> i32 {
        let mut contacts = [false; LEVEL_COUNT];
        for (index, (wet, &gpio)) in contacts.iter_mut().zip(self.gpios.iter()).enumerate() {
            *wet = Self::contact_wet(index, gpio);
        }
        self.last_level = level_from_contacts(&contacts);
        self.last_level
    }

    pub fn last_level(&self) -> i32 {
        self.last_level
    }

    #[cfg(target_os = "espidf")]
    fn contact_wet(_index: usize, gpio: u8) -> bool {
        hw_init::gpio_read(gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn contact_wet(index: usize, _gpio: u8) -> bool {
        index < SIM_LEVEL.load(Ordering::Relaxed) as usize
    }
}

/// Count submerged contacts from the bottom up, stopping at the first dry one.
pub fn level_from_contacts(contacts: &[bool; LEVEL_COUNT]) -> i32 {
    contacts.iter().take_while(|&&wet| wet).count() as i32
}
