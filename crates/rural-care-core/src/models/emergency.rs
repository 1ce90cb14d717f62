//! Emergency case models.

use serde::{Deserialize, Serialize};

/// Severity recorded on an emergency case.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmergencySeverity {
    Low,
    #[default]
    Medium,
    High,
}

/// Workflow state of an emergency case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    /// Raised by a nurse, not yet seen by a doctor
    Pending,
    /// A doctor has picked it up
    Acknowledged,
    Resolved,
}

/// An emergency alert opened when a nurse flags a submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyCase {
    pub id: i64,
    pub patient_id: String,
    pub description: String,
    pub severity: EmergencySeverity,
    /// User ID of the reporting nurse
    pub reported_by: String,
    pub status: CaseStatus,
    pub created_at: String,
}
