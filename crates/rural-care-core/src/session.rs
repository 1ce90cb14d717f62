//! Explicit session context.
//!
//! The signed-in user's role and village are passed to every repository
//! call that needs them instead of being read from shared storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Patient;

/// Access errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    #[error("{role:?} may not {action}")]
    WrongRole { role: Role, action: &'static str },

    #[error("patient village {patient_village} is outside assigned village {assigned}")]
    OutsideVillage {
        assigned: String,
        patient_village: String,
    },

    #[error("nurse session has no assigned village")]
    NoVillage,
}

pub type AccessResult<T> = Result<T, AccessError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Field nurse; registers patients and records vitals in one village
    Nurse,
    /// Reviews every village, receives emergency alerts
    Doctor,
}

/// The signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    /// Assigned village (nurses only)
    pub village: Option<String>,
}

impl Session {
    pub fn nurse(user_id: impl Into<String>, display_name: impl Into<String>, village: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role: Role::Nurse,
            village: Some(village.into()),
        }
    }

    pub fn doctor(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role: Role::Doctor,
            village: None,
        }
    }

    /// Village filter for patient listings; `None` means every village.
    /// A nurse without an assigned village has no scope at all.
    pub fn village_scope(&self) -> AccessResult<Option<&str>> {
        match self.role {
            Role::Doctor => Ok(None),
            Role::Nurse => self.village.as_deref().map(Some).ok_or(AccessError::NoVillage),
        }
    }

    pub fn can_view(&self, patient: &Patient) -> bool {
        match self.role {
            Role::Doctor => true,
            Role::Nurse => self.village.as_deref() == Some(patient.village.as_str()),
        }
    }

    /// Village a nurse registers new patients into.
    pub fn authorize_registration(&self) -> AccessResult<&str> {
        self.require_nurse("register patients")?;
        self.village.as_deref().ok_or(AccessError::NoVillage)
    }

    /// Only the nurse assigned to the patient's village may record vitals.
    pub fn authorize_vitals(&self, patient: &Patient) -> AccessResult<()> {
        self.require_nurse("record vitals")?;
        let assigned = self.village.as_deref().ok_or(AccessError::NoVillage)?;
        if assigned != patient.village {
            return Err(AccessError::OutsideVillage {
                assigned: assigned.to_string(),
                patient_village: patient.village.clone(),
            });
        }
        Ok(())
    }

    /// Only doctors acknowledge or resolve emergency cases.
    pub fn authorize_case_review(&self) -> AccessResult<()> {
        match self.role {
            Role::Doctor => Ok(()),
            role => Err(AccessError::WrongRole {
                role,
                action: "review emergency cases",
            }),
        }
    }

    fn require_nurse(&self, action: &'static str) -> AccessResult<()> {
        match self.role {
            Role::Nurse => Ok(()),
            role => Err(AccessError::WrongRole { role, action }),
        }
    }
}
