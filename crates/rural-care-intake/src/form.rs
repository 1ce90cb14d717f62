//! Vitals and registration form parsing.

use std::str::FromStr;

use chrono::NaiveDate;
use rural_care_core::models::{BloodPressure, BloodPressureError, Gender, NewPatient, VitalSigns, VitalsSubmission};
pub use rural_care_core::models::MAX_OXYGEN_SATURATION;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Intake errors.
#[derive(Error, Debug, PartialEq)]
pub enum IntakeError {
    #[error("Please fill in all vital sign fields")]
    MissingFields(Vec<&'static str>),

    #[error("Please fill in all required fields")]
    MissingPatientFields(Vec<&'static str>),

    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid blood pressure {value:?}: {source}")]
    InvalidBloodPressure {
        value: String,
        source: BloodPressureError,
    },

    #[error("Oxygen saturation cannot exceed 100%, got {0}")]
    OxygenOutOfRange(u32),

    #[error("Age must be a positive whole number, got {0:?}")]
    InvalidAge(String),

    #[error("{0}")]
    InvalidGender(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

pub type IntakeResult<T> = Result<T, IntakeError>;

impl From<serde_json::Error> for IntakeError {
    fn from(e: serde_json::Error) -> Self {
        IntakeError::JsonParse(e.to_string())
    }
}

/// The vitals form exactly as typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VitalsForm {
    pub blood_pressure: String,
    pub heart_rate: String,
    pub blood_sugar: String,
    pub temperature: String,
    pub oxygen_saturation: String,
    pub notes: String,
    pub is_emergency: bool,
}

impl VitalsForm {
    /// Parse a form posted as JSON.
    pub fn from_json(json: &str) -> IntakeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Names of the vital fields left blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("bloodPressure", &self.blood_pressure),
            ("heartRate", &self.heart_rate),
            ("bloodSugar", &self.blood_sugar),
            ("temperature", &self.temperature),
            ("oxygenSaturation", &self.oxygen_saturation),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Validate the form into a submission dated `today`.
    ///
    /// Blood pressure is normalized to `systolic/diastolic`. Blank notes
    /// become `None` so they never overwrite earlier notes.
    pub fn into_submission(self, today: NaiveDate) -> IntakeResult<VitalsSubmission> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(IntakeError::MissingFields(missing));
        }

        let blood_pressure = BloodPressure::from_str(&self.blood_pressure).map_err(|source| {
            IntakeError::InvalidBloodPressure {
                value: self.blood_pressure.clone(),
                source,
            }
        })?;

        let oxygen_saturation = parse_count("oxygenSaturation", &self.oxygen_saturation)?;
        if oxygen_saturation > MAX_OXYGEN_SATURATION {
            return Err(IntakeError::OxygenOutOfRange(oxygen_saturation));
        }

        let vitals = VitalSigns {
            blood_pressure: blood_pressure.to_string(),
            heart_rate: parse_count("heartRate", &self.heart_rate)?,
            blood_sugar: parse_count("bloodSugar", &self.blood_sugar)?,
            temperature: parse_temperature(&self.temperature)?,
            oxygen_saturation,
        };
        debug!(blood_pressure = %vitals.blood_pressure, is_emergency = self.is_emergency, "vitals form accepted");

        Ok(VitalsSubmission {
            vitals,
            notes: non_blank(self.notes),
            is_emergency: self.is_emergency,
            recorded_on: today,
        })
    }
}

/// The add-patient form exactly as typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub phone: String,
    pub medical_history: String,
    pub allergies: String,
}

impl Default for PatientForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: String::new(),
            gender: Gender::Male.to_string(),
            phone: String::new(),
            medical_history: String::new(),
            allergies: String::new(),
        }
    }
}

impl PatientForm {
    pub fn from_json(json: &str) -> IntakeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate into registration details. Name and age are required.
    pub fn into_new_patient(self) -> IntakeResult<NewPatient> {
        let missing: Vec<&'static str> = [("name", &self.name), ("age", &self.age)]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(IntakeError::MissingPatientFields(missing));
        }

        let age = match self.age.trim().parse::<u32>() {
            Ok(age) if age > 0 => age,
            _ => return Err(IntakeError::InvalidAge(self.age)),
        };
        let gender = Gender::from_str(&self.gender).map_err(IntakeError::InvalidGender)?;

        Ok(NewPatient {
            name: self.name.trim().to_string(),
            age,
            gender,
            phone: non_blank(self.phone),
            medical_history: non_blank(self.medical_history),
            allergies: non_blank(self.allergies),
        })
    }
}

fn parse_count(field: &'static str, raw: &str) -> IntakeResult<u32> {
    raw.trim().parse().map_err(|_| IntakeError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn parse_temperature(raw: &str) -> IntakeResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(t) if t.is_finite() => Ok(t),
        _ => Err(IntakeError::InvalidNumber {
            field: "temperature",
            value: raw.to_string(),
        }),
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
