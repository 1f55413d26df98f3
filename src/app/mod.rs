//! Application core — pure domain logic, zero I/O.
//!
//! This module wires the alarm engine, the pump controller and the status
//! LED into one per-tick service and defines the dashboard command/event
//! vocabulary.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
