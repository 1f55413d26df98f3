//! Mock hardware adapter for integration tests.
//!
//! Records every output call so tests can assert on the full command
//! history without touching real GPIO/PWM registers.

use flaura::app::events::AppEvent;
use flaura::app::ports::{EventSink, OutputPort, SensorPort};
use flaura::sensors::SensorSnapshot;

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCall {
    Bind { pin: u8 },
    Set { pin: u8, level: u8 },
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<OutputCall>,
    pub snapshot: SensorSnapshot,
    pub reads: u32,
    /// Pins that have a driver; binding any other pin fails.
    pub wired: Vec<u8>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            snapshot: healthy(),
            reads: 0,
            wired: vec![
                flaura::pins::PUMP_GPIO,
                flaura::pins::BUZZER_GPIO,
                flaura::pins::LED_GPIO,
            ],
        }
    }

    /// Last level written to `pin`, 0 if never written.
    pub fn level(&self, pin: u8) -> u8 {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match *c {
                OutputCall::Set { pin: p, level } if p == pin => Some(level),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn writes_to(&self, pin: u8) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, OutputCall::Set { pin: p, .. } if *p == pin))
            .count()
    }

    pub fn pump_level(&self) -> u8 {
        self.level(flaura::pins::PUMP_GPIO)
    }

    pub fn buzzer_on(&self) -> bool {
        self.level(flaura::pins::BUZZER_GPIO) != 0
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPort for MockHardware {
    fn bind_output(&mut self, pin: u8) -> bool {
        self.calls.push(OutputCall::Bind { pin });
        self.wired.contains(&pin)
    }

    fn set_output(&mut self, pin: u8, level: u8) {
        self.calls.push(OutputCall::Set { pin, level });
    }
}

impl SensorPort for MockHardware {
    fn read_all(&mut self) -> SensorSnapshot {
        self.reads += 1;
        self.snapshot
    }
}

/// Plenty of water, charged battery, moist soil.
pub fn healthy() -> SensorSnapshot {
    SensorSnapshot {
        soil_moisture_percent: 50,
        water_level: 3,
        battery_voltage: 3.9,
    }
}

// ── MockSink ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn pump_transitions(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::PumpStatusChanged { running } => Some(*running),
                _ => None,
            })
            .collect()
    }

    pub fn alarm_transitions(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::AlarmChanged { active } => Some(*active),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for MockSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
