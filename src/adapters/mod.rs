//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | SensorPort         | ESP32 ADC, GPIO          |
//! |                | OutputPort         | ESP32 LEDC PWM, GPIO     |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `time`         | Clock              | ESP32 system timer       |

pub mod hardware;
pub mod log_sink;
pub mod time;
