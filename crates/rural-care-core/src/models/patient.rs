//! Patient models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::vitals::VitalSigns;

/// Patient gender as captured at registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("unknown gender: {}", s)),
        }
    }
}

/// A patient record (aggregate root).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Stable unique ID
    pub id: String,
    /// Full name
    pub name: String,
    /// Age in years
    pub age: u32,
    pub gender: Gender,
    /// Village the patient belongs to (scopes nurse visibility)
    pub village: String,
    pub phone: Option<String>,
    /// Readings, most recent first
    pub vitals: Vec<VitalSigns>,
    /// Latest clinician notes (overwritten, not accumulated)
    pub notes: Option<String>,
    /// Date of the most recent vitals submission
    pub last_checkup: Option<NaiveDate>,
    /// Set by the recording clinician; never derived from thresholds
    pub is_emergency: bool,
    pub medical_history: Option<String>,
    pub allergies: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

/// One vitals submission from the field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalsSubmission {
    pub vitals: VitalSigns,
    pub notes: Option<String>,
    pub is_emergency: bool,
    pub recorded_on: NaiveDate,
}

/// Registration details for a new patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub phone: Option<String>,
    pub medical_history: Option<String>,
    pub allergies: Option<String>,
}

impl Patient {
    /// Create a freshly registered patient with no readings.
    pub fn new(name: String, age: u32, gender: Gender, village: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            age,
            gender,
            village,
            phone: None,
            vitals: Vec::new(),
            notes: None,
            last_checkup: None,
            is_emergency: false,
            medical_history: None,
            allergies: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Build a patient from registration details in the given village.
    pub fn register(details: NewPatient, village: String) -> Self {
        let mut patient = Self::new(details.name, details.age, details.gender, village);
        patient.phone = details.phone;
        patient.medical_history = details.medical_history;
        patient.allergies = details.allergies;
        patient
    }

    /// The most recent reading, if any.
    pub fn latest_vitals(&self) -> Option<&VitalSigns> {
        self.vitals.first()
    }

    pub fn has_vitals(&self) -> bool {
        !self.vitals.is_empty()
    }

    /// Apply a vitals submission.
    ///
    /// The reading is prepended, `last_checkup` moves to the submission
    /// date, notes are replaced only when non-blank notes were supplied, and
    /// the emergency flag always takes the clinician's value.
    pub fn record_vitals(&mut self, submission: VitalsSubmission) {
        self.vitals.insert(0, submission.vitals);
        self.last_checkup = Some(submission.recorded_on);
        if let Some(notes) = submission.notes.filter(|n| !n.trim().is_empty()) {
            self.notes = Some(notes);
        }
        self.is_emergency = submission.is_emergency;
        self.touch();
    }

    /// Case-insensitive match on name or ID.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.id.to_lowercase().contains(&query)
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
