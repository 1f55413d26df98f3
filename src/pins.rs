//! Default GPIO / peripheral assignments for the Flaura pot board.
//!
//! Pin numbers here are only the factory defaults seeded into
//! [`DeviceConfig`](crate::config::DeviceConfig); the running firmware
//! always takes actuator pins from configuration, where
//! [`PIN_UNCONFIGURED`] disables the corresponding output.

/// Sentinel pin value meaning "not configured".
pub const PIN_UNCONFIGURED: u8 = 255;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Irrigation pump MOSFET gate (LEDC PWM).
pub const PUMP_GPIO: u8 = 25;
/// Piezo buzzer (digital output, active HIGH).
pub const BUZZER_GPIO: u8 = 27;
/// Status LED (digital output).
pub const LED_GPIO: u8 = 2;

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// Capacitive soil probe, GPIO 34 = ADC1 channel 6.
pub const SOIL_ADC_CHANNEL: u32 = 6;
/// Battery divider midpoint, GPIO 35 = ADC1 channel 7.
pub const BATTERY_ADC_CHANNEL: u32 = 7;
/// Switched supply for the soil probe (powered only while sampling).
pub const SOIL_VCC_GPIO: u8 = 26;

// ---------------------------------------------------------------------------
// Sensors — Digital
// ---------------------------------------------------------------------------

/// Front-panel push button (the DevKit BOOT button), active LOW with pull-up.
pub const BUTTON_GPIO: u8 = 0;

/// Reservoir probe contacts, lowest level first.
pub const WATER_LEVEL_GPIOS: [u8; 5] = [19, 18, 5, 17, 16];

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC base frequency for the pump MOSFET (5 kHz).
pub const PUMP_PWM_FREQ_HZ: u32 = 5_000;
