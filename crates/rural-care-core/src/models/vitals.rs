//! Vital sign models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest oxygen saturation a reading may report.
pub const MAX_OXYGEN_SATURATION: u32 = 100;

/// One observation event recorded by a nurse in the field.
///
/// All five fields are always present together; the intake form refuses
/// partial readings before they reach the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    /// Blood pressure as `"<systolic>/<diastolic>"` (mmHg)
    pub blood_pressure: String,
    /// Heart rate (bpm)
    pub heart_rate: u32,
    /// Blood sugar (mg/dL)
    pub blood_sugar: u32,
    /// Body temperature (°F)
    pub temperature: f64,
    /// Oxygen saturation (%)
    pub oxygen_saturation: u32,
}

impl VitalSigns {
    /// Read the blood pressure halves the way the triage engine does.
    pub fn pressure_halves(&self) -> PressureHalves {
        PressureHalves::read(&self.blood_pressure)
    }
}

impl Default for VitalSigns {
    /// Reading used when a patient has no recorded vitals yet.
    fn default() -> Self {
        Self {
            blood_pressure: "120/80".into(),
            heart_rate: 75,
            blood_sugar: 110,
            temperature: 98.6,
            oxygen_saturation: 97,
        }
    }
}

/// Blood pressure parse errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BloodPressureError {
    #[error("blood pressure must be written as systolic/diastolic: {0:?}")]
    MissingSeparator(String),

    #[error("blood pressure contains more than one '/': {0:?}")]
    TooManySeparators(String),

    #[error("blood pressure half is not a positive integer: {0:?}")]
    InvalidHalf(String),
}

/// A strictly parsed blood pressure reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

impl BloodPressure {
    pub fn new(systolic: u32, diastolic: u32) -> Self {
        Self {
            systolic,
            diastolic,
        }
    }
}

impl FromStr for BloodPressure {
    type Err = BloodPressureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        let systolic = parts.next().unwrap_or_default();
        let diastolic = parts
            .next()
            .ok_or_else(|| BloodPressureError::MissingSeparator(s.to_string()))?;
        if parts.next().is_some() {
            return Err(BloodPressureError::TooManySeparators(s.to_string()));
        }

        let parse_half = |half: &str| -> Result<u32, BloodPressureError> {
            match half.trim().parse::<u32>() {
                Ok(value) if value > 0 => Ok(value),
                _ => Err(BloodPressureError::InvalidHalf(half.to_string())),
            }
        };

        Ok(Self {
            systolic: parse_half(systolic)?,
            diastolic: parse_half(diastolic)?,
        })
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

/// Lenient, half-wise view of a blood pressure string.
///
/// A string without exactly one `/` has no readable halves. Otherwise each
/// half is parsed on its own and an unreadable half is `None`. Readable
/// halves are kept as `f64` so that zero and out-of-range values are still
/// compared against thresholds rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PressureHalves {
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
}

impl PressureHalves {
    pub fn read(raw: &str) -> Self {
        let mut parts = raw.split('/');
        let (Some(systolic), Some(diastolic), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Self::default();
        };

        let parse_half = |half: &str| half.trim().parse::<f64>().ok().filter(|v| v.is_finite());
        Self {
            systolic: parse_half(systolic),
            diastolic: parse_half(diastolic),
        }
    }

    /// Both halves could be read.
    pub fn is_complete(&self) -> bool {
        self.systolic.is_some() && self.diastolic.is_some()
    }

    /// Neither half could be read.
    pub fn is_unreadable(&self) -> bool {
        self.systolic.is_none() && self.diastolic.is_none()
    }
}

/// The five recorded vital signs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum VitalKind {
    BloodPressure,
    HeartRate,
    BloodSugar,
    Temperature,
    OxygenSaturation,
}

impl VitalKind {
    /// Every kind, in display order.
    pub const ALL: [VitalKind; 5] = [
        VitalKind::BloodPressure,
        VitalKind::HeartRate,
        VitalKind::BloodSugar,
        VitalKind::Temperature,
        VitalKind::OxygenSaturation,
    ];

    /// Look up a kind by its canonical camelCase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Canonical camelCase name (matches the serialized field name).
    pub fn name(&self) -> &'static str {
        match self {
            VitalKind::BloodPressure => "bloodPressure",
            VitalKind::HeartRate => "heartRate",
            VitalKind::BloodSugar => "bloodSugar",
            VitalKind::Temperature => "temperature",
            VitalKind::OxygenSaturation => "oxygenSaturation",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VitalKind::BloodPressure => "Blood Pressure",
            VitalKind::HeartRate => "Heart Rate",
            VitalKind::BloodSugar => "Blood Sugar",
            VitalKind::Temperature => "Temperature",
            VitalKind::OxygenSaturation => "Oxygen Saturation",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            VitalKind::BloodPressure => "mmHg",
            VitalKind::HeartRate => "bpm",
            VitalKind::BloodSugar => "mg/dL",
            VitalKind::Temperature => "°F",
            VitalKind::OxygenSaturation => "%",
        }
    }
}

impl fmt::Display for VitalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_pressure_strict_parse() {
        let bp: BloodPressure = "120/80".parse().unwrap();
        assert_eq!(bp, BloodPressure::new(120, 80));
        assert_eq!(bp.to_string(), "120/80");

        let spaced: BloodPressure = " 145 / 95 ".parse().unwrap();
        assert_eq!(spaced, BloodPressure::new(145, 95));
    }

    #[test]
    fn test_blood_pressure_strict_rejects() {
        assert!(matches!(
            "120".parse::<BloodPressure>(),
            Err(BloodPressureError::MissingSeparator(_))
        ));
        assert!(matches!(
            "120/80/70".parse::<BloodPressure>(),
            Err(BloodPressureError::TooManySeparators(_))
        ));
        assert!(matches!(
            "abc/80".parse::<BloodPressure>(),
            Err(BloodPressureError::InvalidHalf(_))
        ));
        assert!(matches!(
            "0/80".parse::<BloodPressure>(),
            Err(BloodPressureError::InvalidHalf(_))
        ));
    }

    #[test]
    fn test_pressure_halves_lenient() {
        let halves = PressureHalves::read("150/x");
        assert_eq!(halves.systolic, Some(150.0));
        assert_eq!(halves.diastolic, None);
        assert!(!halves.is_complete());

        assert!(PressureHalves::read("150").is_unreadable());
        assert!(PressureHalves::read("1/2/3").is_unreadable());
        assert!(PressureHalves::read("").is_unreadable());
        assert!(PressureHalves::read("120/80").is_complete());
    }

    #[test]
    fn test_vital_kind_names() {
        for kind in VitalKind::ALL {
            assert_eq!(VitalKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(VitalKind::from_name("respiratoryRate"), None);
        assert_eq!(VitalKind::Temperature.unit(), "°F");
    }

    #[test]
    fn test_vitals_camel_case_json() {
        let json = serde_json::to_value(VitalSigns::default()).unwrap();
        assert_eq!(json["bloodPressure"], "120/80");
        assert_eq!(json["oxygenSaturation"], 97);
    }
}
