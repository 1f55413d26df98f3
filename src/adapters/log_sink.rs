//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Telemetry is written as one JSON object per line so a dashboard
//! bridge on the serial port can forward it verbatim.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => match serde_json::to_string(t) {
                Ok(json) => info!("TELEM | {json}"),
                Err(e) => error!("TELEM | serialisation failed: {e}"),
            },
            AppEvent::AlarmChanged { active } => {
                info!("ALARM | {}", if *active { "active" } else { "cleared" });
            }
            AppEvent::AlarmRaised(kind) => {
                warn!("ALARM | cause: {kind}");
            }
            AppEvent::PumpStatusChanged { running } => {
                info!("PUMP  | {}", if *running { "on" } else { "off" });
            }
            AppEvent::CommandRejected(e) => {
                warn!("CMD   | rejected: {e}");
            }
            AppEvent::Started => {
                info!("START | service running");
            }
        }
    }
}
