//! Fuzz target: dashboard command decoding and application
//!
//! Feeds arbitrary bytes through the JSON command decoder and, when a
//! command decodes, applies it to a running service.  Verifies:
//! - No panics on malformed input
//! - The stored configuration always passes validation
//! - A stop command always leaves the pump off
//!
//! cargo fuzz run fuzz_command_json

#![no_main]

use flaura::app::commands::AppCommand;
use flaura::app::events::AppEvent;
use flaura::app::ports::{EventSink, OutputPort};
use flaura::app::service::PlantPotService;
use flaura::config::SharedConfig;
use libfuzzer_sys::fuzz_target;

struct NullHw;

impl OutputPort for NullHw {
    fn bind_output(&mut self, _pin: u8) -> bool {
        true
    }

    fn set_output(&mut self, _pin: u8, _level: u8) {}
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(cmd) = serde_json::from_slice::<AppCommand>(data) else {
        return;
    };

    let config = SharedConfig::default();
    let mut svc = PlantPotService::new();
    svc.start(&config, &mut NullHw, &mut NullSink);
    svc.handle_command(cmd, 0, &config, &mut NullHw, &mut NullSink);

    assert!(
        config.snapshot().validate().is_ok(),
        "command {cmd:?} left an invalid configuration"
    );

    svc.handle_command(AppCommand::ManualPumpOff, 1, &config, &mut NullHw, &mut NullSink);
    assert!(!svc.pump().is_running());
});
