//! Threshold classifier for single vital sign readings.
//!
//! Each reading maps to one of three tiers. The emergency bounds are
//! checked before the warning bounds, so a value outside both ranges is
//! always reported as an emergency.
//!
//! | kind              | emergency            | warning              |
//! |-------------------|----------------------|----------------------|
//! | blood pressure    | S >= 160 or D >= 100 | S >= 140 or D >= 90  |
//! | heart rate        | > 100 or < 50        | > 90 or < 60         |
//! | blood sugar       | > 180 or < 70        | > 140 or < 80        |
//! | temperature (°F)  | > 100.4 or < 97      | > 99.5 or < 97.5     |
//! | oxygen saturation | < 92                 | < 95                 |

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{PressureHalves, VitalKind, VitalSigns};

/// Severity tier for one vital sign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Normal,
    Warning,
    Emergency,
}

impl Tier {
    /// Lowercase label used for display styling.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Normal => "normal",
            Tier::Warning => "warning",
            Tier::Emergency => "emergency",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw reading handed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VitalValue<'a> {
    /// Blood pressure as typed, `"S/D"`
    Pressure(&'a str),
    Number(f64),
}

impl From<f64> for VitalValue<'_> {
    fn from(value: f64) -> Self {
        VitalValue::Number(value)
    }
}

impl From<u32> for VitalValue<'_> {
    fn from(value: u32) -> Self {
        VitalValue::Number(f64::from(value))
    }
}

impl<'a> From<&'a str> for VitalValue<'a> {
    fn from(value: &'a str) -> Self {
        VitalValue::Pressure(value)
    }
}

/// Blood pressure bounds. Both halves compare inclusively (`>=`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PressureThresholds {
    pub emergency_systolic: f64,
    pub emergency_diastolic: f64,
    pub warning_systolic: f64,
    pub warning_diastolic: f64,
}

impl PressureThresholds {
    /// True when each warning bound sits at or below its emergency bound.
    pub fn is_nested(&self) -> bool {
        self.warning_systolic <= self.emergency_systolic
            && self.warning_diastolic <= self.emergency_diastolic
    }

    /// Classify readable halves; an unreadable half never crosses a bound.
    pub fn classify(&self, halves: PressureHalves) -> Tier {
        let at_least = |half: Option<f64>, bound: f64| half.is_some_and(|v| v >= bound);

        if at_least(halves.systolic, self.emergency_systolic)
            || at_least(halves.diastolic, self.emergency_diastolic)
        {
            Tier::Emergency
        } else if at_least(halves.systolic, self.warning_systolic)
            || at_least(halves.diastolic, self.warning_diastolic)
        {
            Tier::Warning
        } else {
            Tier::Normal
        }
    }
}

/// Bounds for a single numeric vital. All comparisons are strict.
/// A missing bound is never crossed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RangeThresholds {
    pub emergency_above: Option<f64>,
    pub emergency_below: Option<f64>,
    pub warning_above: Option<f64>,
    pub warning_below: Option<f64>,
}

impl RangeThresholds {
    /// True when the warning band sits inside the emergency band.
    pub fn is_nested(&self) -> bool {
        let upper = match (self.warning_above, self.emergency_above) {
            (Some(warning), Some(emergency)) => warning <= emergency,
            (None, Some(_)) => false,
            _ => true,
        };
        let lower = match (self.warning_below, self.emergency_below) {
            (Some(warning), Some(emergency)) => warning >= emergency,
            (None, Some(_)) => false,
            _ => true,
        };
        upper && lower
    }

    pub fn classify(&self, value: f64) -> Tier {
        let above = |bound: Option<f64>| bound.is_some_and(|b| value > b);
        let below = |bound: Option<f64>| bound.is_some_and(|b| value < b);

        if above(self.emergency_above) || below(self.emergency_below) {
            Tier::Emergency
        } else if above(self.warning_above) || below(self.warning_below) {
            Tier::Warning
        } else {
            Tier::Normal
        }
    }
}

/// The full classification policy, one set of bounds per vital kind.
///
/// Deserializing merges over [`ClassificationThresholds::STANDARD`]: any kind
/// or bound left out of the JSON keeps its standard value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "ThresholdOverrides")]
pub struct ClassificationThresholds {
    pub blood_pressure: PressureThresholds,
    pub heart_rate: RangeThresholds,
    pub blood_sugar: RangeThresholds,
    pub temperature: RangeThresholds,
    pub oxygen_saturation: RangeThresholds,
}

impl ClassificationThresholds {
    /// Standard field triage bounds.
    pub const STANDARD: ClassificationThresholds = ClassificationThresholds {
        blood_pressure: PressureThresholds {
            emergency_systolic: 160.0,
            emergency_diastolic: 100.0,
            warning_systolic: 140.0,
            warning_diastolic: 90.0,
        },
        heart_rate: RangeThresholds {
            emergency_above: Some(100.0),
            emergency_below: Some(50.0),
            warning_above: Some(90.0),
            warning_below: Some(60.0),
        },
        blood_sugar: RangeThresholds {
            emergency_above: Some(180.0),
            emergency_below: Some(70.0),
            warning_above: Some(140.0),
            warning_below: Some(80.0),
        },
        temperature: RangeThresholds {
            emergency_above: Some(100.4),
            emergency_below: Some(97.0),
            warning_above: Some(99.5),
            warning_below: Some(97.5),
        },
        oxygen_saturation: RangeThresholds {
            emergency_above: None,
            emergency_below: Some(92.0),
            warning_above: None,
            warning_below: Some(95.0),
        },
    };

    /// Classify one reading of a known kind.
    ///
    /// A numeric kind given a pressure-style string tries to read it as a
    /// number; blood pressure given a bare number has no halves to compare.
    /// Both mismatches fall back to `Normal`.
    pub fn classify(&self, kind: VitalKind, value: VitalValue<'_>) -> Tier {
        let tier = match (kind, value) {
            (VitalKind::BloodPressure, VitalValue::Pressure(raw)) => {
                let halves = PressureHalves::read(raw);
                if !halves.is_complete() {
                    warn!(raw, "unreadable blood pressure half ignored during triage");
                }
                self.blood_pressure.classify(halves)
            }
            (VitalKind::BloodPressure, VitalValue::Number(_)) => Tier::Normal,
            (kind, VitalValue::Number(n)) => self.range_for(kind).classify(n),
            (kind, VitalValue::Pressure(raw)) => match raw.trim().parse::<f64>() {
                Ok(n) => self.range_for(kind).classify(n),
                Err(_) => {
                    warn!(%kind, raw, "non-numeric reading treated as normal");
                    Tier::Normal
                }
            },
        };
        debug!(%kind, %tier, "classified vital");
        tier
    }

    /// Classify by kind name. Unknown names are `Normal`.
    pub fn classify_named(&self, name: &str, value: VitalValue<'_>) -> Tier {
        match VitalKind::from_name(name) {
            Some(kind) => self.classify(kind, value),
            None => {
                debug!(name, "unknown vital kind, defaulting to normal");
                Tier::Normal
            }
        }
    }

    /// Classify every field of one reading.
    pub fn classify_reading(&self, vitals: &VitalSigns) -> VitalsAssessment {
        VitalsAssessment {
            blood_pressure: self.classify(
                VitalKind::BloodPressure,
                VitalValue::Pressure(&vitals.blood_pressure),
            ),
            heart_rate: self.classify(VitalKind::HeartRate, vitals.heart_rate.into()),
            blood_sugar: self.classify(VitalKind::BloodSugar, vitals.blood_sugar.into()),
            temperature: self.classify(VitalKind::Temperature, vitals.temperature.into()),
            oxygen_saturation: self
                .classify(VitalKind::OxygenSaturation, vitals.oxygen_saturation.into()),
        }
    }

    /// The first kind whose warning band is not inside its emergency band.
    pub fn first_unnested(&self) -> Option<VitalKind> {
        if !self.blood_pressure.is_nested() {
            return Some(VitalKind::BloodPressure);
        }
        [
            VitalKind::HeartRate,
            VitalKind::BloodSugar,
            VitalKind::Temperature,
            VitalKind::OxygenSaturation,
        ]
        .into_iter()
        .find(|kind| !self.range_for(*kind).is_nested())
    }

    fn range_for(&self, kind: VitalKind) -> &RangeThresholds {
        match kind {
            VitalKind::HeartRate => &self.heart_rate,
            VitalKind::BloodSugar => &self.blood_sugar,
            VitalKind::Temperature => &self.temperature,
            VitalKind::OxygenSaturation => &self.oxygen_saturation,
            // Only reachable for a non-pressure value, which is handled above.
            VitalKind::BloodPressure => &NO_BOUNDS,
        }
    }
}

const NO_BOUNDS: RangeThresholds = RangeThresholds {
    emergency_above: None,
    emergency_below: None,
    warning_above: None,
    warning_below: None,
};

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PressureOverride {
    emergency_systolic: Option<f64>,
    emergency_diastolic: Option<f64>,
    warning_systolic: Option<f64>,
    warning_diastolic: Option<f64>,
}

impl PressureOverride {
    fn apply(self, base: PressureThresholds) -> PressureThresholds {
        PressureThresholds {
            emergency_systolic: self.emergency_systolic.unwrap_or(base.emergency_systolic),
            emergency_diastolic: self.emergency_diastolic.unwrap_or(base.emergency_diastolic),
            warning_systolic: self.warning_systolic.unwrap_or(base.warning_systolic),
            warning_diastolic: self.warning_diastolic.unwrap_or(base.warning_diastolic),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RangeOverride {
    emergency_above: Option<f64>,
    emergency_below: Option<f64>,
    warning_above: Option<f64>,
    warning_below: Option<f64>,
}

impl RangeOverride {
    fn apply(self, base: RangeThresholds) -> RangeThresholds {
        RangeThresholds {
            emergency_above: self.emergency_above.or(base.emergency_above),
            emergency_below: self.emergency_below.or(base.emergency_below),
            warning_above: self.warning_above.or(base.warning_above),
            warning_below: self.warning_below.or(base.warning_below),
        }
    }
}

/// Partial policy as read from a config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThresholdOverrides {
    blood_pressure: PressureOverride,
    heart_rate: RangeOverride,
    blood_sugar: RangeOverride,
    temperature: RangeOverride,
    oxygen_saturation: RangeOverride,
}

impl From<ThresholdOverrides> for ClassificationThresholds {
    fn from(overrides: ThresholdOverrides) -> Self {
        let base = Self::STANDARD;
        Self {
            blood_pressure: overrides.blood_pressure.apply(base.blood_pressure),
            heart_rate: overrides.heart_rate.apply(base.heart_rate),
            blood_sugar: overrides.blood_sugar.apply(base.blood_sugar),
            temperature: overrides.temperature.apply(base.temperature),
            oxygen_saturation: overrides.oxygen_saturation.apply(base.oxygen_saturation),
        }
    }
}

/// Classify with the standard bounds.
pub fn classify(kind: VitalKind, value: VitalValue<'_>) -> Tier {
    ClassificationThresholds::STANDARD.classify(kind, value)
}

/// Classify by kind name with the standard bounds.
pub fn classify_named(name: &str, value: VitalValue<'_>) -> Tier {
    ClassificationThresholds::STANDARD.classify_named(name, value)
}

/// Per-kind tiers for one reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VitalsAssessment {
    pub blood_pressure: Tier,
    pub heart_rate: Tier,
    pub blood_sugar: Tier,
    pub temperature: Tier,
    pub oxygen_saturation: Tier,
}

impl VitalsAssessment {
    pub fn tier(&self, kind: VitalKind) -> Tier {
        match kind {
            VitalKind::BloodPressure => self.blood_pressure,
            VitalKind::HeartRate => self.heart_rate,
            VitalKind::BloodSugar => self.blood_sugar,
            VitalKind::Temperature => self.temperature,
            VitalKind::OxygenSaturation => self.oxygen_saturation,
        }
    }

    /// Tiers in display order.
    pub fn iter(&self) -> impl Iterator<Item = (VitalKind, Tier)> + '_ {
        VitalKind::ALL.into_iter().map(|kind| (kind, self.tier(kind)))
    }

    /// The most severe tier across all kinds.
    pub fn highest(&self) -> Tier {
        self.iter().map(|(_, tier)| tier).max().unwrap_or(Tier::Normal)
    }

    /// Kinds at or above the given tier.
    pub fn kinds_at_least(&self, tier: Tier) -> Vec<VitalKind> {
        self.iter()
            .filter(|(_, t)| *t >= tier)
            .map(|(kind, _)| kind)
            .collect()
    }
}
