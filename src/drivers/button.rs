//! Debounced push-button driver with short and long press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch on a pulled-up input.  `tick()` is called
//! from the main loop at control-tick rate, samples the pin and runs the
//! debounce + gesture state machine; no interrupt is needed at 50 ms.
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition                          | Event        |
//! |-------------|------------------------------------|--------------|
//! | Short press | Stable press released before 5 s   | `ShortPress` |
//! | Long press  | Held >= 5 s (fires while held)     | `LongPress`  |

use embedded_hal::digital::InputPin;

pub const DEBOUNCE_MS: u32 = 50;
pub const LONG_PRESS_MS: u32 = 5000;

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

/// Internal state machine for gesture detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since_ms: u32 },
    Pressed { since_ms: u32 },
    /// Long press already reported; wait for release.
    Held,
}

pub struct ButtonDriver<P: InputPin> {
    pin: P,
    state: GestureState,
}

impl<P: InputPin> ButtonDriver<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            state: GestureState::Idle,
        }
    }

    /// Call from the main loop at each control tick.
    /// Returns a classified gesture event, if any.
    pub fn tick(&mut self, now_ms: u32) -> Option<ButtonEvent> {
        let down = self.is_down();

        match self.state {
            GestureState::Idle => {
                if down {
                    self.state = GestureState::DebounceWait { since_ms: now_ms };
                }
                None
            }

            GestureState::DebounceWait { since_ms } => {
                if !down {
                    // Bounce or glitch shorter than the debounce window.
                    self.state = GestureState::Idle;
                } else if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = GestureState::Pressed { since_ms };
                }
                None
            }

            GestureState::Pressed { since_ms } => {
                if !down {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::ShortPress);
                }
                if now_ms.wrapping_sub(since_ms) >= LONG_PRESS_MS {
                    self.state = GestureState::Held;
                    return Some(ButtonEvent::LongPress);
                }
                None
            }

            GestureState::Held => {
                if !down {
                    self.state = GestureState::Idle;
                }
                None
            }
        }
    }

    /// A pin read error counts as "not pressed".
    fn is_down(&mut self) -> bool {
        matches!(self.pin.is_low(), Ok(true))
    }
}
