//! End-to-end tests for `PlantPotService` driven through mock ports.

use flaura::alarm::AlarmKind;
use flaura::app::commands::AppCommand;
use flaura::app::events::AppEvent;
use flaura::app::ports::ConfigPort;
use flaura::app::service::{PlantPotService, PowerHint};
use flaura::config::{ConfigChange, DeviceConfig, SharedConfig};
use flaura::error::ConfigError;
use flaura::pins::{BUZZER_GPIO, LED_GPIO, PIN_UNCONFIGURED, PUMP_GPIO};
use flaura::sensors::SensorSnapshot;

use crate::mock_hw::{healthy, MockHardware, MockSink, OutputCall};

fn started_with(config: SharedConfig, snapshot: SensorSnapshot) -> (PlantPotService, SharedConfig, MockHardware, MockSink) {
    let mut hw = MockHardware::new();
    hw.snapshot = snapshot;
    let mut sink = MockSink::new();
    let mut svc = PlantPotService::new();
    svc.start(&config, &mut hw, &mut sink);
    (svc, config, hw, sink)
}

fn started(snapshot: SensorSnapshot) -> (PlantPotService, SharedConfig, MockHardware, MockSink) {
    started_with(SharedConfig::default(), snapshot)
}

/// Tick every `step_ms` over `[from, to]`.
fn run(
    svc: &mut PlantPotService,
    config: &SharedConfig,
    hw: &mut MockHardware,
    sink: &mut MockSink,
    from: u32,
    to: u32,
    step_ms: u32,
) {
    let mut now = from;
    while now <= to {
        svc.tick(now, config, hw, sink);
        now += step_ms;
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_binds_outputs_and_drives_them_low() {
    let (_svc, _config, hw, sink) = started(healthy());
    for pin in [BUZZER_GPIO, PUMP_GPIO, LED_GPIO] {
        assert!(hw.calls.contains(&OutputCall::Bind { pin }));
        assert!(hw.calls.contains(&OutputCall::Set { pin, level: 0 }));
    }
    assert_eq!(sink.events, vec![AppEvent::Started]);
}

#[test]
fn unconfigured_buzzer_is_never_bound() {
    let config = SharedConfig::new(DeviceConfig {
        buzzer_pin: PIN_UNCONFIGURED,
        ..DeviceConfig::default()
    });
    let low_battery = SensorSnapshot { battery_voltage: 3.0, ..healthy() };
    let (mut svc, config, mut hw, mut sink) = started_with(config, low_battery);
    run(&mut svc, &config, &mut hw, &mut sink, 0, 2_000, 50);

    assert!(!hw.calls.iter().any(|c| matches!(c, OutputCall::Bind { pin } if *pin == PIN_UNCONFIGURED)));
    assert!(svc.alarm().is_alarm_active());
    assert!(svc.alarm().is_degraded());
}

// ── Auto-watering ─────────────────────────────────────────────

#[test]
fn dry_soil_waters_for_configured_duration() {
    let thirsty = SensorSnapshot { soil_moisture_percent: 25, ..healthy() };
    let (mut svc, config, mut hw, mut sink) = started(thirsty);

    svc.tick(0, &config, &mut hw, &mut sink);
    assert!(svc.pump().is_running());
    assert_eq!(hw.pump_level(), 255);

    svc.tick(2_999, &config, &mut hw, &mut sink);
    assert!(svc.pump().is_running());

    svc.tick(3_000, &config, &mut hw, &mut sink);
    assert!(!svc.pump().is_running());
    assert_eq!(hw.pump_level(), 0);
    assert_eq!(sink.pump_transitions(), vec![true, false]);
    assert!(!svc.alarm().is_alarm_active());
}

#[test]
fn pump_duty_change_applies_to_next_run() {
    let thirsty = SensorSnapshot { soil_moisture_percent: 25, ..healthy() };
    let (mut svc, config, mut hw, mut sink) = started(thirsty);

    svc.handle_command(AppCommand::SetPumpDuty(128), 0, &config, &mut hw, &mut sink);
    svc.tick(10, &config, &mut hw, &mut sink);
    assert_eq!(svc.pump().current_duty(), 128);
    assert_eq!(hw.pump_level(), 128);
}

#[test]
fn empty_reservoir_never_runs_pump() {
    let dry_and_empty = SensorSnapshot {
        soil_moisture_percent: 5,
        water_level: 0,
        battery_voltage: 3.9,
    };
    let (mut svc, config, mut hw, mut sink) = started(dry_and_empty);
    run(&mut svc, &config, &mut hw, &mut sink, 0, 60_000, 100);

    assert!(!svc.pump().is_running());
    assert!(!hw.calls.iter().any(|c| matches!(c, OutputCall::Set { pin, level } if *pin == PUMP_GPIO && *level > 0)));
    assert!(sink.pump_transitions().is_empty());

    assert!(svc.alarm().is_condition_active(AlarmKind::LowWater));
    assert!(svc.alarm().is_condition_active(AlarmKind::LowSoil));
    assert_eq!(sink.alarm_transitions(), vec![true]);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::AlarmRaised(_))), 2);
}

#[test]
fn measurements_follow_configured_interval() {
    let (mut svc, config, mut hw, mut sink) = started(healthy());
    run(&mut svc, &config, &mut hw, &mut sink, 0, 4_950, 50);
    assert_eq!(hw.reads, 1);
    svc.tick(5_000, &config, &mut hw, &mut sink);
    assert_eq!(hw.reads, 2);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 2);
}

#[test]
fn telemetry_reflects_latest_snapshot() {
    let snap = SensorSnapshot {
        soil_moisture_percent: 10,
        water_level: 2,
        battery_voltage: 3.9,
    };
    let (mut svc, config, mut hw, mut sink) = started(snap);
    svc.tick(0, &config, &mut hw, &mut sink);

    let telem = sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t.clone()),
            _ => None,
        })
        .expect("telemetry after first measurement");
    assert_eq!(telem.soil_moisture_percent, 10);
    assert_eq!(telem.water_level, 2);
    assert!(telem.pump_running);
    assert!(telem.alarm_active);
    assert!(telem.low_soil);
    assert!(!telem.low_water && !telem.low_battery);
}

// ── Alarm ─────────────────────────────────────────────────────

#[test]
fn low_battery_repeats_three_beep_cycle_every_interval() {
    let low_battery = SensorSnapshot { battery_voltage: 3.0, ..healthy() };
    let (mut svc, config, mut hw, mut sink) = started(low_battery);

    let mut rises = Vec::new();
    let mut was_on = false;
    let mut now = 0;
    while now <= 25_000 {
        svc.tick(now, &config, &mut hw, &mut sink);
        let on = hw.buzzer_on();
        if on && !was_on {
            rises.push(now);
        }
        was_on = on;
        now += 50;
    }

    assert_eq!(rises, vec![400, 1_100, 1_800, 10_400, 11_100, 11_800, 20_400, 21_100, 21_800]);
    assert_eq!(sink.alarm_transitions(), vec![true]);
    assert_eq!(
        sink.count(|e| *e == AppEvent::AlarmRaised(AlarmKind::LowBattery)),
        1
    );
}

#[test]
fn muting_silences_buzzer_but_keeps_alarm() {
    let low_battery = SensorSnapshot { battery_voltage: 3.0, ..healthy() };
    let (mut svc, config, mut hw, mut sink) = started(low_battery);
    run(&mut svc, &config, &mut hw, &mut sink, 0, 450, 50);
    assert!(hw.buzzer_on());

    svc.handle_command(AppCommand::SetAlarmSound(false), 460, &config, &mut hw, &mut sink);
    svc.tick(500, &config, &mut hw, &mut sink);
    assert!(!hw.buzzer_on());
    assert!(svc.alarm().is_alarm_active());

    let writes = hw.writes_to(BUZZER_GPIO);
    run(&mut svc, &config, &mut hw, &mut sink, 550, 30_000, 50);
    assert_eq!(hw.writes_to(BUZZER_GPIO), writes);
}

#[test]
fn recovery_clears_alarm_and_buzzer() {
    let low_battery = SensorSnapshot { battery_voltage: 3.0, ..healthy() };
    let (mut svc, config, mut hw, mut sink) = started(low_battery);
    run(&mut svc, &config, &mut hw, &mut sink, 0, 450, 50);
    assert!(hw.buzzer_on());

    hw.snapshot = healthy();
    svc.tick(5_000, &config, &mut hw, &mut sink);
    assert!(!svc.alarm().is_alarm_active());
    assert!(!hw.buzzer_on());
    assert_eq!(sink.alarm_transitions(), vec![true, false]);
}

#[test]
fn threshold_change_from_other_context_lands_on_next_tick() {
    let (mut svc, config, mut hw, mut sink) = started(SensorSnapshot {
        battery_voltage: 3.5,
        ..healthy()
    });
    svc.tick(0, &config, &mut hw, &mut sink);
    assert!(!svc.alarm().is_alarm_active());

    std::thread::scope(|s| {
        s.spawn(|| config.apply(ConfigChange::LowBatteryThresholdMv(3600)))
            .join()
            .expect("dashboard thread")
            .expect("valid threshold");
    });

    svc.tick(50, &config, &mut hw, &mut sink);
    assert!(svc.alarm().is_condition_active(AlarmKind::LowBattery));
}

// ── Manual control ────────────────────────────────────────────

#[test]
fn manual_run_ignores_sensors_and_stops_at_deadline() {
    let (mut svc, config, mut hw, mut sink) = started(healthy());
    svc.tick(0, &config, &mut hw, &mut sink);
    assert!(!svc.pump().is_running());

    svc.handle_command(
        AppCommand::ManualPumpOn { duration_ms: Some(1_000) },
        100,
        &config,
        &mut hw,
        &mut sink,
    );
    assert!(svc.pump().is_running());

    run(&mut svc, &config, &mut hw, &mut sink, 150, 1_050, 50);
    assert!(svc.pump().is_running());
    svc.tick(1_100, &config, &mut hw, &mut sink);
    assert!(!svc.pump().is_running());
    assert_eq!(sink.pump_transitions(), vec![true, false]);
}

#[test]
fn manual_run_defaults_to_configured_duration() {
    let (mut svc, config, mut hw, mut sink) = started(healthy());
    svc.handle_command(AppCommand::ManualPumpOn { duration_ms: None }, 0, &config, &mut hw, &mut sink);
    assert_eq!(svc.pump().remaining_ms(0), Some(config.pump_run_duration_ms()));
}

#[test]
fn manual_off_is_idempotent() {
    let (mut svc, config, mut hw, mut sink) = started(healthy());
    svc.handle_command(AppCommand::ManualPumpOn { duration_ms: Some(5_000) }, 0, &config, &mut hw, &mut sink);
    svc.handle_command(AppCommand::ManualPumpOff, 10, &config, &mut hw, &mut sink);
    svc.handle_command(AppCommand::ManualPumpOff, 20, &config, &mut hw, &mut sink);

    assert!(!svc.pump().is_running());
    assert_eq!(hw.pump_level(), 0);
    assert_eq!(sink.pump_transitions(), vec![true, false]);
}

#[test]
fn invalid_command_is_rejected_and_config_kept() {
    let (mut svc, config, mut hw, mut sink) = started(healthy());
    svc.handle_command(AppCommand::SetSoilThreshold(150), 0, &config, &mut hw, &mut sink);

    assert_eq!(config.soil_threshold_percent(), 30);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CommandRejected(ConfigError::ValidationFailed(_)))),
        1
    );
}

#[test]
fn commands_parse_from_dashboard_json() {
    let cmd: AppCommand = serde_json::from_str(r#"{"ManualPumpOn":{"duration_ms":2000}}"#).unwrap();
    assert_eq!(cmd, AppCommand::ManualPumpOn { duration_ms: Some(2000) });
    let cmd: AppCommand = serde_json::from_str(r#"{"SetAlarmSound":false}"#).unwrap();
    assert_eq!(cmd, AppCommand::SetAlarmSound(false));
    let cmd: AppCommand = serde_json::from_str(r#""MeasureNow""#).unwrap();
    assert_eq!(cmd, AppCommand::MeasureNow);
}

// ── Status LED ────────────────────────────────────────────────

#[test]
fn led_is_solid_while_watering() {
    let thirsty = SensorSnapshot { soil_moisture_percent: 25, ..healthy() };
    let (mut svc, config, mut hw, mut sink) = started(thirsty);
    run(&mut svc, &config, &mut hw, &mut sink, 0, 2_950, 50);
    assert!(svc.is_led_lit());
    assert_eq!(hw.level(LED_GPIO), 1);

    svc.tick(3_000, &config, &mut hw, &mut sink);
    assert!(!svc.is_led_lit());
}

#[test]
fn led_blinks_fast_during_alarm() {
    let empty = SensorSnapshot { water_level: 0, ..healthy() };
    let (mut svc, config, mut hw, mut sink) = started(empty);
    svc.tick(0, &config, &mut hw, &mut sink);
    assert!(!svc.is_led_lit());
    svc.tick(250, &config, &mut hw, &mut sink);
    assert!(svc.is_led_lit());
    svc.tick(500, &config, &mut hw, &mut sink);
    assert!(!svc.is_led_lit());
}

#[test]
fn accepted_command_flashes_led() {
    let (mut svc, config, mut hw, mut sink) = started(healthy());
    svc.tick(0, &config, &mut hw, &mut sink);
    assert!(!svc.is_led_lit());

    svc.handle_command(AppCommand::SetPumpRunDuration(4_000), 100, &config, &mut hw, &mut sink);
    svc.tick(150, &config, &mut hw, &mut sink);
    assert!(svc.is_led_lit());
    svc.tick(300, &config, &mut hw, &mut sink);
    assert!(!svc.is_led_lit());
}

#[test]
fn missing_pump_driver_runs_degraded() {
    let mut hw = MockHardware::new();
    hw.wired = vec![BUZZER_GPIO, LED_GPIO];
    hw.snapshot = SensorSnapshot { soil_moisture_percent: 25, ..healthy() };
    let config = SharedConfig::default();
    let mut sink = MockSink::new();
    let mut svc = PlantPotService::new();
    svc.start(&config, &mut hw, &mut sink);

    run(&mut svc, &config, &mut hw, &mut sink, 0, 1_600, 50);
    assert!(svc.pump().is_degraded());
    assert!(!svc.pump().is_running());
    assert_eq!(hw.writes_to(PUMP_GPIO), 0);
    // Slow blink base pattern signals the missing actuator.
    assert_eq!(hw.level(LED_GPIO), 0);
    assert!(hw.writes_to(LED_GPIO) >= 2);
}

// ── Power ─────────────────────────────────────────────────────

#[test]
fn sleep_is_allowed_only_when_idle() {
    let config = SharedConfig::new(DeviceConfig {
        continuous_mode: false,
        ..DeviceConfig::default()
    });
    let (mut svc, config, mut hw, mut sink) = started_with(config, healthy());
    svc.tick(0, &config, &mut hw, &mut sink);
    assert_eq!(svc.power_hint(&config), PowerHint::SleepAllowed { duration_secs: 3600 });

    svc.handle_command(AppCommand::ManualPumpOn { duration_ms: Some(500) }, 10, &config, &mut hw, &mut sink);
    assert_eq!(svc.power_hint(&config), PowerHint::StayAwake);
    svc.tick(600, &config, &mut hw, &mut sink);
    assert_eq!(svc.power_hint(&config), PowerHint::SleepAllowed { duration_secs: 3600 });

    hw.snapshot = SensorSnapshot { water_level: 0, ..healthy() };
    svc.tick(5_000, &config, &mut hw, &mut sink);
    assert_eq!(svc.power_hint(&config), PowerHint::StayAwake);
}
