//! Sensor subsystem — individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces a [`SensorSnapshot`]
//! once per measurement.  Readings that could not be taken are reported
//! with the [`INVALID_READING`] sentinel rather than an error: the control
//! core treats them as "cannot evaluate this tick".

pub mod battery;
pub mod soil;
pub mod water_level;

use battery::BatteryMonitor;
use soil::SoilSensor;
use water_level::WaterLevelSensor;

/// Sentinel for a soil or water reading that failed.
pub const INVALID_READING: i32 = -1;

/// A point-in-time snapshot of every sensor the control core consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    /// Soil moisture (0–100 %), or [`INVALID_READING`].
    pub soil_moisture_percent: i32,
    /// Reservoir level in probe steps (0 = empty … 5 = full).
    pub water_level: i32,
    /// Battery terminal voltage (V).  Values near zero mean "no reading".
    pub battery_voltage: f32,
}

impl Default for SensorSnapshot {
    /// Nothing measured yet.  Soil and battery read as "cannot evaluate";
    /// the water level reads as a full tank so no low-water alarm is
    /// raised before the first measurement.
    fn default() -> Self {
        Self {
            soil_moisture_percent: INVALID_READING,
            water_level: water_level::LEVEL_COUNT as i32,
            battery_voltage: 0.0,
        }
    }
}

/// Aggregates all sensor drivers and produces a unified snapshot.
pub struct SensorHub {
    pub soil: SoilSensor,
    pub water_level: WaterLevelSensor,
    pub battery: BatteryMonitor,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(soil: SoilSensor, water_level: WaterLevelSensor, battery: BatteryMonitor) -> Self {
        Self {
            soil,
            water_level,
            battery,
        }
    }

    /// Read every sensor and return a unified snapshot.
    pub fn read_all(&mut self) -> SensorSnapshot {
        SensorSnapshot {
            soil_moisture_percent: self.soil.read_percent(),
            water_level: self.water_level.read_level(),
            battery_voltage: self.battery.read_voltage(),
        }
    }
}
