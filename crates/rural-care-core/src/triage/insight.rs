//! Clinical insight generation.
//!
//! Rules are evaluated in order and the first match wins:
//! 1. clinician emergency flag
//! 2. elevated blood pressure
//! 3. elevated blood sugar
//! 4. low oxygen saturation
//! 5. all normal
//!
//! The gates are independent of the classifier bounds.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{TriageError, TriageResult};
use crate::models::{Insight, InsightSource, Patient, PrecomputedInsights};

pub const EMERGENCY_MESSAGE: &str = "Patient requires immediate attention. Multiple vital signs are outside normal ranges, suggesting possible acute condition that should be evaluated promptly.";

pub const NORMAL_MESSAGE: &str = "All vital signs are within normal ranges. Patient appears to be stable based on current readings. Recommend continuing current management plan.";

/// Follow-up list shown only alongside a generated insight.
pub const RECOMMENDATIONS: [&str; 3] = [
    "Continue monitoring vital signs regularly",
    "Follow up with patient in 2 weeks",
    "No medication changes needed at this time",
];

fn elevated_pressure_message(blood_pressure: &str) -> String {
    format!(
        "Blood pressure ({}) is elevated. Consider lifestyle modifications or medication adjustment if this is a consistent pattern.",
        blood_pressure
    )
}

fn elevated_sugar_message(blood_sugar: u32) -> String {
    format!(
        "Blood sugar reading ({} mg/dL) is above target range. Recommend dietary counseling and monitoring for symptoms of hyperglycemia.",
        blood_sugar
    )
}

fn low_oxygen_message(oxygen_saturation: u32) -> String {
    format!(
        "Oxygen saturation ({}%) is below optimal levels. Consider respiratory assessment and monitoring for symptoms of respiratory distress.",
        oxygen_saturation
    )
}

/// Numeric gates for insight text. All comparisons are strict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InsightThresholds {
    pub systolic_above: f64,
    pub diastolic_above: f64,
    pub blood_sugar_above: f64,
    pub oxygen_below: f64,
}

impl InsightThresholds {
    pub const STANDARD: InsightThresholds = InsightThresholds {
        systolic_above: 140.0,
        diastolic_above: 90.0,
        blood_sugar_above: 140.0,
        oxygen_below: 95.0,
    };
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Derive insight text from the patient's latest reading.
///
/// Returns `TriageError::NoVitals` for a patient without readings; callers
/// are expected to show a "no vitals recorded" state instead of calling this.
pub fn generate_insight(patient: &Patient, thresholds: &InsightThresholds) -> TriageResult<String> {
    let latest = patient
        .latest_vitals()
        .ok_or_else(|| TriageError::NoVitals(patient.id.clone()))?;

    if patient.is_emergency {
        return Ok(EMERGENCY_MESSAGE.to_string());
    }

    let halves = latest.pressure_halves();
    let above = |half: Option<f64>, bound: f64| half.is_some_and(|v| v > bound);
    if above(halves.systolic, thresholds.systolic_above)
        || above(halves.diastolic, thresholds.diastolic_above)
    {
        return Ok(elevated_pressure_message(&latest.blood_pressure));
    }

    if f64::from(latest.blood_sugar) > thresholds.blood_sugar_above {
        return Ok(elevated_sugar_message(latest.blood_sugar));
    }

    if f64::from(latest.oxygen_saturation) < thresholds.oxygen_below {
        return Ok(low_oxygen_message(latest.oxygen_saturation));
    }

    Ok(NORMAL_MESSAGE.to_string())
}

/// Insight lookup with generation as the fallback.
pub struct InsightGenerator<'a> {
    thresholds: InsightThresholds,
    precomputed: &'a PrecomputedInsights,
}

impl<'a> InsightGenerator<'a> {
    pub fn new(thresholds: InsightThresholds, precomputed: &'a PrecomputedInsights) -> Self {
        Self {
            thresholds,
            precomputed,
        }
    }

    /// Insight for a patient.
    ///
    /// A stored insight is returned verbatim without recommendations, and
    /// does not need any readings. Otherwise the text is generated and the
    /// generic recommendations are attached.
    pub fn insight_for(&self, patient: &Patient) -> TriageResult<Insight> {
        if let Some(text) = self.precomputed.get(&patient.id) {
            debug!(patient_id = %patient.id, "using stored insight");
            return Ok(Insight {
                patient_id: patient.id.clone(),
                text: text.to_string(),
                source: InsightSource::Precomputed,
                recommendations: Vec::new(),
            });
        }

        let text = generate_insight(patient, &self.thresholds)?;
        Ok(Insight {
            patient_id: patient.id.clone(),
            text,
            source: InsightSource::Generated,
            recommendations: RECOMMENDATIONS.iter().map(|r| r.to_string()).collect(),
        })
    }
}
