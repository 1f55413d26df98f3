//! Hazard table and per-tick condition evaluation.
//!
//! Every monitored hazard is one row of [`HAZARDS`], ordered highest
//! priority first.  The beep count announced for a cycle is the count of
//! the first active row, so adding a hazard is a table change only.
//!
//! Conditions are recomputed from scratch on every call; a single sample
//! crossing a threshold flips the condition immediately.

use core::fmt;

use serde::Serialize;

use crate::sensors::SensorSnapshot;

/// A monitored hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AlarmKind {
    LowBattery,
    LowWater,
    LowSoil,
}

impl AlarmKind {
    /// Bit position in a [`ConditionSet`].
    pub const fn mask(self) -> u8 {
        match self {
            Self::LowBattery => 1 << 0,
            Self::LowWater => 1 << 1,
            Self::LowSoil => 1 << 2,
        }
    }
}

impl fmt::Display for AlarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowBattery => write!(f, "low battery"),
            Self::LowWater => write!(f, "low water"),
            Self::LowSoil => write!(f, "low soil moisture"),
        }
    }
}

/// One row of the hazard table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hazard {
    pub kind: AlarmKind,
    pub priority: u8,
    pub beep_count: u8,
}

/// Number of monitored hazards.
pub const HAZARD_COUNT: usize = 3;

/// All hazards, highest priority first.
pub const HAZARDS: [Hazard; HAZARD_COUNT] = [
    Hazard { kind: AlarmKind::LowBattery, priority: 3, beep_count: 3 },
    Hazard { kind: AlarmKind::LowWater, priority: 2, beep_count: 2 },
    Hazard { kind: AlarmKind::LowSoil, priority: 1, beep_count: 1 },
];

/// Battery readings at or below this are treated as "no reading".
pub const MIN_VALID_BATTERY_V: f32 = 0.1;

/// Raw readings the conditions are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlarmInputs {
    pub water_level: i32,
    pub battery_voltage: f32,
    pub soil_moisture_percent: i32,
}

impl From<&SensorSnapshot> for AlarmInputs {
    fn from(snap: &SensorSnapshot) -> Self {
        Self {
            water_level: snap.water_level,
            battery_voltage: snap.battery_voltage,
            soil_moisture_percent: snap.soil_moisture_percent,
        }
    }
}

/// Thresholds read from configuration at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub low_battery_mv: i32,
    pub low_soil_percent: i32,
}

/// Whether `kind` holds for the given readings.
pub fn is_condition_met(kind: AlarmKind, inputs: &AlarmInputs, thresholds: &Thresholds) -> bool {
    match kind {
        AlarmKind::LowWater => inputs.water_level <= 0,
        AlarmKind::LowBattery => {
            inputs.battery_voltage > MIN_VALID_BATTERY_V
                && inputs.battery_voltage * 1000.0 < thresholds.low_battery_mv as f32
        }
        AlarmKind::LowSoil => {
            inputs.soil_moisture_percent >= 0
                && inputs.soil_moisture_percent < thresholds.low_soil_percent
        }
    }
}

/// Snapshot of a single condition, as reported to diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmCondition {
    pub kind: AlarmKind,
    pub is_active: bool,
    pub priority: u8,
}

/// Set of active conditions, one bit per [`AlarmKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionSet(u8);

impl ConditionSet {
    pub const EMPTY: Self = Self(0);

    /// Evaluate every hazard against the readings.
    pub fn evaluate(inputs: &AlarmInputs, thresholds: &Thresholds) -> Self {
        HAZARDS
            .iter()
            .filter(|h| is_condition_met(h.kind, inputs, thresholds))
            .fold(Self::EMPTY, |set, h| set.with(h.kind))
    }

    #[must_use]
    pub const fn with(self, kind: AlarmKind) -> Self {
        Self(self.0 | kind.mask())
    }

    pub const fn contains(self, kind: AlarmKind) -> bool {
        self.0 & kind.mask() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Conditions set here but not in `previous`.
    pub const fn rising_since(self, previous: Self) -> Self {
        Self(self.0 & !previous.0)
    }

    /// Beep count of the highest-priority active hazard, 0 if none.
    pub fn beep_count(self) -> u8 {
        HAZARDS
            .iter()
            .find(|h| self.contains(h.kind))
            .map_or(0, |h| h.beep_count)
    }

    /// Active kinds in priority order.
    pub fn kinds(self) -> impl Iterator<Item = AlarmKind> {
        HAZARDS
            .iter()
            .map(|h| h.kind)
            .filter(move |&k| self.contains(k))
    }

    /// Every hazard with its current state, in priority order.
    pub fn conditions(self) -> impl Iterator<Item = AlarmCondition> {
        HAZARDS.iter().map(move |h| AlarmCondition {
            kind: h.kind,
            is_active: self.contains(h.kind),
            priority: h.priority,
        })
    }
}
