//! Notices shown to the nurse after each action.

use serde::{Deserialize, Serialize};

use crate::form::IntakeError;

/// A short title/description pair for a toast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    /// Rendered in the error style
    pub destructive: bool,
}

impl Notice {
    fn info(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            destructive: false,
        }
    }

    fn error(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            destructive: true,
        }
    }
}

/// Shown after a vitals submission is saved.
pub fn vitals_recorded(is_emergency: bool) -> Notice {
    let description = if is_emergency {
        "Emergency alert has been sent to doctors"
    } else {
        "Patient records updated"
    };
    Notice::info("Vitals recorded successfully", description)
}

/// Shown after a patient is registered.
pub fn patient_added(name: &str) -> Notice {
    Notice::info("Patient added", format!("{} has been added to your patient list", name))
}

pub fn no_patient_selected() -> Notice {
    Notice::error("No patient selected", "Please select a patient before submitting vitals")
}

/// Shown when saving fails for reasons outside the form.
pub fn recording_failed() -> Notice {
    Notice::error("Error recording vitals", "Please try again later")
}

impl From<&IntakeError> for Notice {
    fn from(err: &IntakeError) -> Self {
        match err {
            IntakeError::MissingFields(_) | IntakeError::MissingPatientFields(_) => {
                Notice::error("Missing information", err.to_string())
            }
            _ => Notice::error("Invalid information", err.to_string()),
        }
    }
}
