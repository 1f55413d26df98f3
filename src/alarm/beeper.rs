//! Beep sequencer.
//!
//! A cycle announces the highest-priority hazard with N short beeps:
//!
//! ```text
//!  Idle ──(cycle due)──▶ BetweenBeeps ──400 ms──▶ Beeping ──300 ms──┐
//!   ▲                          ▲                                     │
//!   │                          └──────────(beeps remaining)──────────┤
//!   └────────────────────────────(last beep done)────────────────────┘
//! ```
//!
//! A cycle is due when no beeps are pending and at least
//! [`CYCLE_INTERVAL_MS`] has passed since the previous cycle started, or
//! immediately after [`BeepSequencer::arm`].  All timing compares stored
//! marks against the injected clock, so the call cadence does not matter.

/// Time between the starts of consecutive beep cycles.
pub const CYCLE_INTERVAL_MS: u32 = 10_000;
/// Silent gap before each beep.
pub const PAUSE_MS: u32 = 400;
/// Length of one beep.
pub const BEEP_MS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeepPhase {
    /// Waiting for the next cycle.
    Idle,
    /// Buzzer off, counting the pause before the next beep.
    BetweenBeeps { since: u32 },
    /// Buzzer on.
    Beeping { since: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerLevel {
    Off,
    On,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeepSequencer {
    phase: BeepPhase,
    beeps_remaining: u8,
    current_beep_count: u8,
    /// `None` means the next cycle is due immediately.
    last_cycle_start: Option<u32>,
}

impl Default for BeepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl BeepSequencer {
    pub const fn new() -> Self {
        Self {
            phase: BeepPhase::Idle,
            beeps_remaining: 0,
            current_beep_count: 0,
            last_cycle_start: None,
        }
    }

    /// Make the next cycle due immediately.
    pub fn arm(&mut self) {
        self.last_cycle_start = None;
    }

    /// Advance the sequencer.
    ///
    /// `demand` is the beep count to announce while the alarm should be
    /// audible, or `None` to silence it.  Silencing drops any pending
    /// beeps and returns [`BuzzerLevel::Off`] on the same call.
    pub fn step(&mut self, now: u32, demand: Option<u8>) -> BuzzerLevel {
        let Some(count) = demand else {
            self.silence();
            return BuzzerLevel::Off;
        };

        if self.beeps_remaining == 0 && self.cycle_due(now) {
            self.last_cycle_start = Some(now);
            self.current_beep_count = count;
            self.beeps_remaining = count;
            self.phase = if count > 0 {
                BeepPhase::BetweenBeeps { since: now }
            } else {
                BeepPhase::Idle
            };
        }

        match self.phase {
            BeepPhase::Idle => BuzzerLevel::Off,
            BeepPhase::BetweenBeeps { since } => {
                if now.wrapping_sub(since) >= PAUSE_MS {
                    self.phase = BeepPhase::Beeping { since: now };
                    BuzzerLevel::On
                } else {
                    BuzzerLevel::Off
                }
            }
            BeepPhase::Beeping { since } => {
                if now.wrapping_sub(since) >= BEEP_MS {
                    self.beeps_remaining = self.beeps_remaining.saturating_sub(1);
                    self.phase = if self.beeps_remaining > 0 {
                        BeepPhase::BetweenBeeps { since: now }
                    } else {
                        BeepPhase::Idle
                    };
                    BuzzerLevel::Off
                } else {
                    BuzzerLevel::On
                }
            }
        }
    }

    /// Drop pending beeps and return to `Idle`.  The cycle mark is kept,
    /// so re-enabling sound resumes on the regular cadence.
    pub fn silence(&mut self) {
        self.phase = BeepPhase::Idle;
        self.beeps_remaining = 0;
    }

    pub fn phase(&self) -> BeepPhase {
        self.phase
    }

    pub fn beeps_remaining(&self) -> u8 {
        self.beeps_remaining
    }

    pub fn current_beep_count(&self) -> u8 {
        self.current_beep_count
    }

    fn cycle_due(&self, now: u32) -> bool {
        self.last_cycle_start
            .is_none_or(|start| now.wrapping_sub(start) >= CYCLE_INTERVAL_MS)
    }
}
