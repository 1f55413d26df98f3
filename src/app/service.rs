//! Application service — the hexagonal core.
//!
//! [`PlantPotService`] owns the alarm engine, the pump controller and the
//! status LED pattern engine.  It exposes a clean, hardware-agnostic API.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │     PlantPotService      │
//!  OutputPort ◀── │  Alarm · Pump · LED      │ ◀── ConfigPort
//!                 └──────────────────────────┘
//! ```
//!
//! ## Tick order
//!
//! 1. Pump deadline check (every tick).
//! 2. When a measurement is due: read sensors, auto-watering check.
//! 3. Alarm update against the latest snapshot (every tick).
//! 4. Telemetry for a fresh measurement.
//! 5. Status LED.

use log::{info, warn};

use crate::alarm::{AlarmEngine, AlarmInputs};
use crate::config::ConfigChange;
use crate::drivers::led_patterns::{LedPatternEngine, PatternId};
use crate::pins::PIN_UNCONFIGURED;
use crate::pump::PumpController;
use crate::sensors::SensorSnapshot;

use super::commands::AppCommand;
use super::events::{AppEvent, Telemetry};
use super::ports::{ConfigPort, EventSink, OutputPort, SensorPort};

/// LED flash acknowledging an accepted dashboard command.
pub const ACK_BLINK_MS: u32 = 150;

/// Whether the device may enter deep sleep after this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerHint {
    StayAwake,
    /// Sleep for the configured duration before the next cycle.
    SleepAllowed { duration_secs: u32 },
}

// ───────────────────────────────────────────────────────────────
// PlantPotService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct PlantPotService {
    alarm: AlarmEngine,
    pump: PumpController,
    led: LedPatternEngine,
    led_pin: Option<u8>,
    led_lit: bool,
    snapshot: SensorSnapshot,
    last_measurement_ms: Option<u32>,
}

impl Default for PlantPotService {
    fn default() -> Self {
        Self::new()
    }
}

impl PlantPotService {
    /// Construct an inert service.  Call [`start`](Self::start) next.
    pub fn new() -> Self {
        Self {
            alarm: AlarmEngine::new(),
            pump: PumpController::new(),
            led: LedPatternEngine::new(),
            led_pin: None,
            led_lit: false,
            snapshot: SensorSnapshot::default(),
            last_measurement_ms: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bind every output and reset all state.
    pub fn start(&mut self, config: &impl ConfigPort, out: &mut impl OutputPort, sink: &mut impl EventSink) {
        self.alarm.setup(config, out);
        self.pump.setup(config, out);
        self.setup_led(config, out);

        if self.alarm.is_degraded() || self.pump.is_degraded() {
            self.led.set_base(PatternId::SlowBlink);
        }

        self.snapshot = SensorSnapshot::default();
        self.last_measurement_ms = None;

        sink.emit(&AppEvent::Started);
        info!("PlantPotService started");
    }

    fn setup_led(&mut self, config: &impl ConfigPort, out: &mut impl OutputPort) {
        let pin = config.led_pin();
        self.led = LedPatternEngine::new();
        self.led_lit = false;
        self.led_pin = if pin == PIN_UNCONFIGURED {
            warn!("led: pin not configured, no visual status");
            None
        } else if !out.bind_output(pin) {
            warn!("led: no output driver for pin {pin}, no visual status");
            None
        } else {
            out.set_output(pin, 0);
            Some(pin)
        };
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`OutputPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u32,
        config: &impl ConfigPort,
        hw: &mut (impl SensorPort + OutputPort),
        sink: &mut impl EventSink,
    ) {
        // 1. Pump deadline
        self.pump.update(now_ms, hw, sink);

        // 2. Fresh measurement + auto-watering
        let measured = self.measurement_due(now_ms, config);
        if measured {
            self.snapshot = hw.read_all();
            self.last_measurement_ms = Some(now_ms);
            self.pump.activate_if_needed(
                now_ms,
                self.snapshot.soil_moisture_percent,
                self.snapshot.water_level,
                config,
                hw,
                sink,
            );
        }

        // 3. Alarm
        let update = self.alarm.update(now_ms, AlarmInputs::from(&self.snapshot), config, hw);
        for kind in &update.raised {
            sink.emit(&AppEvent::AlarmRaised(*kind));
        }
        if update.changed {
            sink.emit(&AppEvent::AlarmChanged { active: update.active });
        }

        // 4. Telemetry
        if measured {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }

        // 5. Status LED
        self.refresh_led(now_ms, hw);
    }

    fn measurement_due(&self, now_ms: u32, config: &impl ConfigPort) -> bool {
        self.last_measurement_ms
            .is_none_or(|last| now_ms.wrapping_sub(last) >= config.measurement_interval_ms())
    }

    fn refresh_led(&mut self, now_ms: u32, out: &mut impl OutputPort) {
        self.led.set_alarm(self.alarm.is_alarm_active());
        self.led.set_pump(self.pump.is_running());
        let lit = self.led.tick(now_ms);
        let Some(pin) = self.led_pin else {
            return;
        };
        if lit != self.led_lit {
            out.set_output(pin, u8::from(lit));
            self.led_lit = lit;
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a dashboard command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u32,
        config: &impl ConfigPort,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        let change = match cmd {
            AppCommand::ManualPumpOn { duration_ms } => {
                let duration_ms = duration_ms.unwrap_or_else(|| config.pump_run_duration_ms());
                if self.pump.manual_turn_on(now_ms, duration_ms, config, out, sink).started() {
                    self.led.blink_once(now_ms, ACK_BLINK_MS);
                }
                return;
            }
            AppCommand::ManualPumpOff => {
                self.pump.manual_turn_off(out, sink);
                return;
            }
            AppCommand::MeasureNow => {
                info!("manual measurement requested");
                self.last_measurement_ms = None;
                self.led.blink_once(now_ms, ACK_BLINK_MS);
                return;
            }
            AppCommand::SetAlarmSound(on) => ConfigChange::AlarmSoundEnabled(on),
            AppCommand::SetPumpRunDuration(ms) => ConfigChange::PumpRunDurationMs(ms),
            AppCommand::SetPumpDuty(duty) => ConfigChange::PumpDutyCycle(duty),
            AppCommand::SetSoilThreshold(pct) => ConfigChange::SoilThresholdPercent(pct),
            AppCommand::SetLowBatteryThreshold(mv) => ConfigChange::LowBatteryThresholdMv(mv),
            AppCommand::SetLowSoilThreshold(pct) => ConfigChange::LowSoilThresholdPercent(pct),
            AppCommand::SetContinuousMode(on) => ConfigChange::ContinuousMode(on),
        };

        match config.apply(change) {
            Ok(()) => self.led.blink_once(now_ms, ACK_BLINK_MS),
            Err(e) => {
                warn!("command {cmd:?} rejected: {e}");
                sink.emit(&AppEvent::CommandRejected(e));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether the caller may put the device to sleep after this tick.
    ///
    /// An active alarm forces the device to stay awake regardless of
    /// whether sound is enabled; a running pump must stay awake until
    /// its deadline is handled.
    pub fn power_hint(&self, config: &impl ConfigPort) -> PowerHint {
        if config.continuous_mode() || self.alarm.is_alarm_active() || self.pump.is_running() {
            PowerHint::StayAwake
        } else {
            PowerHint::SleepAllowed {
                duration_secs: config.sleep_duration_secs(),
            }
        }
    }

    /// Build a telemetry snapshot from the latest readings and state.
    pub fn build_telemetry(&self) -> Telemetry {
        use crate::alarm::AlarmKind;
        Telemetry {
            soil_moisture_percent: self.snapshot.soil_moisture_percent,
            water_level: self.snapshot.water_level,
            battery_voltage: self.snapshot.battery_voltage,
            alarm_active: self.alarm.is_alarm_active(),
            low_water: self.alarm.is_condition_active(AlarmKind::LowWater),
            low_battery: self.alarm.is_condition_active(AlarmKind::LowBattery),
            low_soil: self.alarm.is_condition_active(AlarmKind::LowSoil),
            pump_running: self.pump.is_running(),
        }
    }

    pub fn alarm(&self) -> &AlarmEngine {
        &self.alarm
    }

    pub fn pump(&self) -> &PumpController {
        &self.pump
    }

    /// Most recent sensor snapshot.
    pub fn snapshot(&self) -> SensorSnapshot {
        self.snapshot
    }

    pub fn is_led_lit(&self) -> bool {
        self.led_lit
    }
}
