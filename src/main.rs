//! Flaura Firmware — Main Entry Point
//!
//! Hexagonal architecture driven by a cooperative fixed-rate loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink   SharedConfig  Clock     │
//! │  (Sensor+Output)        (EventSink)    (ConfigPort)            │
//! │  ButtonDriver ──▶ AppCommand (handle_command)                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            PlantPotService (pure logic)                │    │
//! │  │  AlarmEngine · PumpController · LED patterns           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::{info, warn};

use flaura::adapters::hardware::HardwareAdapter;
use flaura::adapters::log_sink::LogEventSink;
use flaura::adapters::time::MonotonicClock;
use flaura::app::ports::Clock;
use flaura::app::commands::AppCommand;
use flaura::app::service::{PlantPotService, PowerHint};
use flaura::config::{DeviceConfig, SharedConfig};
use flaura::drivers::button::ButtonDriver;
use flaura::drivers::buzzer::Buzzer;
use flaura::drivers::hw_init::{self, GpioInput, GpioOutput, LedcOutput, LEDC_CH_PUMP};
use flaura::drivers::pump::PumpPwm;
use flaura::drivers::status_led::StatusLed;
use flaura::pins;
use flaura::sensors::battery::BatteryMonitor;
use flaura::sensors::soil::SoilSensor;
use flaura::sensors::water_level::WaterLevelSensor;
use flaura::sensors::SensorHub;

/// Control loop period.
const TICK_MS: u32 = 50;

type Hardware = HardwareAdapter<GpioOutput, LedcOutput, GpioOutput>;

/// Attach a driver for every configured actuator pin.  A pin that fails
/// to initialise is left unattached; the service then runs that output
/// in degraded mode.
fn build_hardware(cfg: &DeviceConfig) -> Hardware {
    let sensor_hub = SensorHub::new(
        SoilSensor::new(pins::SOIL_ADC_CHANNEL, Some(pins::SOIL_VCC_GPIO)),
        WaterLevelSensor::new(pins::WATER_LEVEL_GPIOS),
        BatteryMonitor::new(pins::BATTERY_ADC_CHANNEL),
    );
    let mut hw = Hardware::new(sensor_hub);

    if cfg.pump_pin != pins::PIN_UNCONFIGURED {
        match LedcOutput::new(LEDC_CH_PUMP, cfg.pump_pin) {
            Ok(pwm) => hw = hw.with_pump(cfg.pump_pin, PumpPwm::new(pwm)),
            Err(e) => warn!("pump output unavailable: {e}"),
        }
    }
    if cfg.buzzer_pin != pins::PIN_UNCONFIGURED {
        match GpioOutput::new(cfg.buzzer_pin) {
            Ok(pin) => hw = hw.with_buzzer(cfg.buzzer_pin, Buzzer::new(pin)),
            Err(e) => warn!("buzzer output unavailable: {e}"),
        }
    }
    if cfg.led_pin != pins::PIN_UNCONFIGURED {
        match GpioOutput::new(cfg.led_pin) {
            Ok(pin) => hw = hw.with_led(cfg.led_pin, StatusLed::new(pin, cfg.led_active_low)),
            Err(e) => warn!("status LED unavailable: {e}"),
        }
    }
    hw
}

/// Front-panel button, if configured and its input can be claimed.
fn build_button(cfg: &DeviceConfig) -> Option<ButtonDriver<GpioInput>> {
    if cfg.button_pin == pins::PIN_UNCONFIGURED {
        warn!("button: pin not configured, no local control");
        return None;
    }
    match GpioInput::new(cfg.button_pin) {
        Ok(pin) => Some(ButtonDriver::new(pin)),
        Err(e) => {
            warn!("button input unavailable: {e}");
            None
        }
    }
}

/// Peripheral bring-up and configuration validation.
fn bring_up() -> flaura::error::Result<SharedConfig> {
    hw_init::init_peripherals()?;
    let defaults = DeviceConfig::default();
    defaults.validate()?;
    Ok(SharedConfig::new(defaults))
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Flaura v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals + configuration ────────────────────────
    let config = bring_up()?;

    // ── 3. Adapters ───────────────────────────────────────────
    let mut hw = build_hardware(&config.snapshot());
    let mut button = build_button(&config.snapshot());
    let clock = MonotonicClock::new();
    let mut log_sink = LogEventSink::new();

    // ── 4. App service ────────────────────────────────────────
    let mut app = PlantPotService::new();
    app.start(&config, &mut hw, &mut log_sink);

    info!("System ready. Entering control loop ({TICK_MS} ms tick).");

    // ── 5. Control loop ───────────────────────────────────────
    let mut last_hint = PowerHint::StayAwake;
    loop {
        let now_ms = clock.now_ms();
        if let Some(event) = button.as_mut().and_then(|b| b.tick(now_ms)) {
            info!("button: {event:?}");
            app.handle_command(AppCommand::from(event), now_ms, &config, &mut hw, &mut log_sink);
        }
        app.tick(now_ms, &config, &mut hw, &mut log_sink);

        // Deep sleep is not armed; the hint is only reported.
        let hint = app.power_hint(&config);
        if hint != last_hint {
            info!("power: {hint:?}");
            last_hint = hint;
        }

        FreeRtos::delay_ms(TICK_MS);
    }
}
