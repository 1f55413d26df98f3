//! Whole-pot scenarios: the service driving the real driver stack
//! (simulated sensors, host GPIO/LEDC stand-ins) through `HardwareAdapter`.

use flaura::adapters::hardware::HardwareAdapter;
use flaura::app::service::PlantPotService;
use flaura::config::SharedConfig;
use flaura::app::commands::AppCommand;
use flaura::drivers::button::ButtonDriver;
use flaura::drivers::buzzer::Buzzer;
use flaura::drivers::hw_init::{self, GpioInput, GpioOutput, LedcOutput, LEDC_CH_PUMP};
use flaura::drivers::pump::PumpPwm;
use flaura::drivers::status_led::StatusLed;
use flaura::pins;
use flaura::sensors::battery::{self, BatteryMonitor};
use flaura::sensors::soil::{self, SoilSensor};
use flaura::sensors::water_level::{self, WaterLevelSensor};
use flaura::sensors::{SensorHub, SensorSnapshot};

use crate::mock_hw::{healthy, MockHardware, MockSink};

type Pot = HardwareAdapter<GpioOutput, LedcOutput, GpioOutput>;

fn pot() -> Pot {
    let hub = SensorHub::new(
        SoilSensor::new(pins::SOIL_ADC_CHANNEL, Some(pins::SOIL_VCC_GPIO)),
        WaterLevelSensor::new(pins::WATER_LEVEL_GPIOS),
        BatteryMonitor::new(pins::BATTERY_ADC_CHANNEL),
    );
    Pot::new(hub)
        .with_pump(
            pins::PUMP_GPIO,
            PumpPwm::new(LedcOutput::new(LEDC_CH_PUMP, pins::PUMP_GPIO).unwrap()),
        )
        .with_buzzer(pins::BUZZER_GPIO, Buzzer::new(GpioOutput::new(pins::BUZZER_GPIO).unwrap()))
        .with_led(pins::LED_GPIO, StatusLed::new(GpioOutput::new(pins::LED_GPIO).unwrap(), false))
}

/// The only test in this binary that touches the simulated sensor
/// registers, so parallel test threads cannot race on them.  The button
/// scenario below only touches the simulated button input.
#[test]
fn watering_cycle_through_driver_stack() {
    // Dry probe (close to the dry calibration point), half-full tank.
    soil::sim_set_soil_adc(2_600);
    water_level::sim_set_level(3);
    battery::sim_set_battery_adc(2_400);

    let config = SharedConfig::default();
    let mut hw = pot();
    let mut sink = MockSink::new();
    let mut svc = PlantPotService::new();
    svc.start(&config, &mut hw, &mut sink);

    svc.tick(0, &config, &mut hw, &mut sink);
    assert!(svc.snapshot().soil_moisture_percent < 20);
    assert!(svc.pump().is_running());
    assert_eq!(hw.pump().map(PumpPwm::current_duty), Some(255));

    // Reservoir runs dry during the run: the current run still ends on
    // its deadline and no new run starts.
    water_level::sim_set_level(0);
    soil::sim_set_soil_adc(2_600);
    let mut now = 50;
    while now <= 12_000 {
        svc.tick(now, &config, &mut hw, &mut sink);
        if now >= 3_000 {
            assert_eq!(hw.pump().map(PumpPwm::current_duty), Some(0), "pump on at {now}");
        }
        now += 50;
    }

    assert_eq!(sink.pump_transitions(), vec![true, false]);
    assert_eq!(svc.snapshot().water_level, 0);
    assert!(svc.alarm().is_alarm_active());
}

#[test]
fn front_button_measures_and_waters_on_demand() {
    let config = SharedConfig::default();
    let mut hw = MockHardware::new();
    let mut sink = MockSink::new();
    let mut svc = PlantPotService::new();
    svc.start(&config, &mut hw, &mut sink);
    let mut button = ButtonDriver::new(GpioInput::new(pins::BUTTON_GPIO).unwrap());

    // Same wiring as the firmware loop: button first, then the tick.
    let mut step = |now: u32, svc: &mut PlantPotService, hw: &mut MockHardware, sink: &mut MockSink| {
        if let Some(event) = button.tick(now) {
            svc.handle_command(AppCommand::from(event), now, &config, hw, sink);
        }
        svc.tick(now, &config, hw, sink);
    };

    step(0, &mut svc, &mut hw, &mut sink);
    assert_eq!(hw.reads, 1);

    // Short press: fresh measurement long before the interval.
    hw_init::sim_set_input_low(pins::BUTTON_GPIO, true);
    step(1_000, &mut svc, &mut hw, &mut sink);
    step(1_050, &mut svc, &mut hw, &mut sink);
    step(1_200, &mut svc, &mut hw, &mut sink);
    hw_init::sim_set_input_low(pins::BUTTON_GPIO, false);
    step(1_250, &mut svc, &mut hw, &mut sink);
    assert_eq!(hw.reads, 2);
    assert!(!svc.pump().is_running(), "moist soil, no watering");

    // Long press: manual watering for the configured run time.
    hw_init::sim_set_input_low(pins::BUTTON_GPIO, true);
    let mut now = 2_000;
    while now <= 7_000 {
        step(now, &mut svc, &mut hw, &mut sink);
        now += 50;
    }
    assert!(svc.pump().is_running());
    hw_init::sim_set_input_low(pins::BUTTON_GPIO, false);
    while now <= 10_000 {
        step(now, &mut svc, &mut hw, &mut sink);
        now += 50;
    }
    assert!(!svc.pump().is_running());
    assert_eq!(sink.pump_transitions(), vec![true, false]);
}

#[test]
fn pump_deadline_holds_across_clock_wrap() {
    let config = SharedConfig::default();
    let mut hw = MockHardware::new();
    hw.snapshot = SensorSnapshot { soil_moisture_percent: 25, ..healthy() };
    let mut sink = MockSink::new();
    let mut svc = PlantPotService::new();
    svc.start(&config, &mut hw, &mut sink);

    let start = u32::MAX - 1_000;
    svc.tick(start, &config, &mut hw, &mut sink);
    assert!(svc.pump().is_running());

    let mut now = start;
    for _ in 0..59 {
        now = now.wrapping_add(50);
        svc.tick(now, &config, &mut hw, &mut sink);
        assert!(svc.pump().is_running(), "stopped early at {now}");
    }
    // 60 × 50 ms = 3000 ms after start.
    now = now.wrapping_add(50);
    svc.tick(now, &config, &mut hw, &mut sink);
    assert!(!svc.pump().is_running());
    assert_eq!(hw.reads, 1);
}

#[test]
fn every_tick_leaves_outputs_consistent_with_state() {
    let config = SharedConfig::default();
    let mut hw = MockHardware::new();
    hw.snapshot = SensorSnapshot {
        soil_moisture_percent: 5,
        water_level: 2,
        battery_voltage: 3.0,
    };
    let mut sink = MockSink::new();
    let mut svc = PlantPotService::new();
    svc.start(&config, &mut hw, &mut sink);

    let mut now = 0;
    while now <= 25_000 {
        svc.tick(now, &config, &mut hw, &mut sink);
        assert_eq!(hw.pump_level() > 0, svc.pump().is_running());
        assert_eq!(hw.buzzer_on(), svc.alarm().is_buzzer_on());
        assert!(svc.alarm().beeps_remaining() <= svc.alarm().current_beep_count());
        if hw.buzzer_on() {
            assert!(svc.alarm().is_alarm_active());
        }
        now += 50;
    }
}
