//! Fuzz target: control loop under arbitrary readings
//!
//! Each 5-byte chunk is one tick: `[dt_hi, dt_lo, soil, water, volts]`.
//! Verifies on every tick:
//! - The pump never starts while the reservoir reads empty
//! - The buzzer is only driven while an alarm is active
//! - The pump output matches the controller state
//!
//! cargo fuzz run fuzz_control_loop

#![no_main]

use flaura::app::events::AppEvent;
use flaura::app::ports::{EventSink, OutputPort, SensorPort};
use flaura::app::service::PlantPotService;
use flaura::config::SharedConfig;
use flaura::pins::{BUZZER_GPIO, PUMP_GPIO};
use flaura::sensors::SensorSnapshot;
use libfuzzer_sys::fuzz_target;

struct Bench {
    snapshot: SensorSnapshot,
    pump: u8,
    buzzer: u8,
}

impl SensorPort for Bench {
    fn read_all(&mut self) -> SensorSnapshot {
        self.snapshot
    }
}

impl OutputPort for Bench {
    fn bind_output(&mut self, _pin: u8) -> bool {
        true
    }

    fn set_output(&mut self, pin: u8, level: u8) {
        match pin {
            PUMP_GPIO => self.pump = level,
            BUZZER_GPIO => self.buzzer = level,
            _ => {}
        }
    }
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let config = SharedConfig::default();
    let mut hw = Bench {
        snapshot: SensorSnapshot::default(),
        pump: 0,
        buzzer: 0,
    };
    let mut svc = PlantPotService::new();
    svc.start(&config, &mut hw, &mut NullSink);

    let mut now = 0u32;
    for chunk in data.chunks_exact(5) {
        now = now.wrapping_add(u32::from(u16::from_be_bytes([chunk[0], chunk[1]])));
        hw.snapshot = SensorSnapshot {
            soil_moisture_percent: i32::from(chunk[2] as i8).clamp(-1, 100),
            water_level: i32::from(chunk[3] % 7) - 1,
            battery_voltage: f32::from(chunk[4]) / 50.0,
        };

        let was_running = svc.pump().is_running();
        svc.tick(now, &config, &mut hw, &mut NullSink);

        if !was_running && svc.pump().is_running() {
            assert!(svc.snapshot().water_level > 0, "pump started on an empty tank");
        }
        if hw.buzzer != 0 {
            assert!(svc.alarm().is_alarm_active());
        }
        assert_eq!(hw.pump > 0, svc.pump().is_running());
    }
});
