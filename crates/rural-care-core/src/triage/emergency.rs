//! Emergency aggregation across a patient list.

use crate::models::Patient;

/// Number of patients flagged as emergencies.
pub fn count_emergencies(patients: &[Patient]) -> usize {
    emergency_patients(patients).count()
}

/// Patients flagged as emergencies, in input order.
pub fn emergency_patients(patients: &[Patient]) -> impl Iterator<Item = &Patient> {
    patients.iter().filter(|p| p.is_emergency)
}

/// Alert banner text, or `None` when there is nothing to show.
pub fn emergency_banner(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 Emergency Case requiring immediate attention".to_string()),
        n => Some(format!("{} Emergency Cases requiring immediate attention", n)),
    }
}
