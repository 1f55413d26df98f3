//! LED pattern engine with priority-based pattern selection.
//!
//! Generates the on/off level for the single status LED.  The service
//! calls `tick()` every control cycle with the current time and feeds
//! the result to the LED output.
//!
//! ## Priority hierarchy (highest first)
//!
//! 1. **One-shot blink** — short acknowledgement flash, then falls back
//! 2. **Alarm** — fast blink while any hazard is active
//! 3. **Pump** — solid while watering
//! 4. **Base** — background pattern (slow blink while an actuator is
//!    running degraded), otherwise off
//!
//! ## Pattern types
//!
//! | Pattern    | Description                         | Toggle every |
//! |------------|-------------------------------------|--------------|
//! | Off        | Dark                                | —            |
//! | Solid      | Constantly lit                      | —            |
//! | SlowBlink  | Square wave, starts dark            | 750 ms       |
//! | FastBlink  | Square wave, starts dark            | 250 ms       |

pub const SLOW_BLINK_INTERVAL_MS: u32 = 750;
pub const FAST_BLINK_INTERVAL_MS: u32 = 250;

/// Pattern identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternId {
    Off,
    Solid,
    SlowBlink,
    FastBlink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OneShot {
    started_ms: u32,
    duration_ms: u32,
}

/// LED pattern engine. Stack-allocated, no heap.
pub struct LedPatternEngine {
    alarm_request: Option<PatternId>,
    pump_request: Option<PatternId>,
    base: PatternId,
    active: PatternId,
    phase_start_ms: u32,
    one_shot: Option<OneShot>,
}

impl Default for LedPatternEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LedPatternEngine {
    pub const fn new() -> Self {
        Self {
            alarm_request: None,
            pump_request: None,
            base: PatternId::Off,
            active: PatternId::Off,
            phase_start_ms: 0,
            one_shot: None,
        }
    }

    /// Set or clear the alarm-layer pattern.
    pub fn set_alarm(&mut self, active: bool) {
        self.alarm_request = active.then_some(PatternId::FastBlink);
    }

    /// Set or clear the pump-layer pattern.
    pub fn set_pump(&mut self, running: bool) {
        self.pump_request = running.then_some(PatternId::Solid);
    }

    /// Set the lowest-priority background pattern.
    pub fn set_base(&mut self, pattern: PatternId) {
        self.base = pattern;
    }

    /// Light the LED for `duration_ms`, overriding every layer, then
    /// resume whatever pattern is selected.
    pub fn blink_once(&mut self, now_ms: u32, duration_ms: u32) {
        self.one_shot = Some(OneShot {
            started_ms: now_ms,
            duration_ms,
        });
    }

    /// Currently selected pattern (ignoring a one-shot blink in progress).
    pub fn active_pattern(&self) -> PatternId {
        self.active
    }

    /// Advance to `now_ms` and return whether the LED should be lit.
    pub fn tick(&mut self, now_ms: u32) -> bool {
        let selected = self.select_active();
        if selected != self.active {
            self.active = selected;
            self.phase_start_ms = now_ms;
        }

        if let Some(shot) = self.one_shot {
            if now_ms.wrapping_sub(shot.started_ms) < shot.duration_ms {
                return true;
            }
            self.one_shot = None;
            // Blink patterns restart dark after the flash.
            self.phase_start_ms = now_ms;
        }

        self.generate(now_ms)
    }

    fn select_active(&self) -> PatternId {
        self.alarm_request
            .or(self.pump_request)
            .unwrap_or(self.base)
    }

    fn generate(&self, now_ms: u32) -> bool {
        let elapsed = now_ms.wrapping_sub(self.phase_start_ms);
        match self.active {
            PatternId::Off => false,
            PatternId::Solid => true,
            PatternId::SlowBlink => (elapsed / SLOW_BLINK_INTERVAL_MS) % 2 == 1,
            PatternId::FastBlink => (elapsed / FAST_BLINK_INTERVAL_MS) % 2 == 1,
        }
    }
}
