//! Vitals triage engine.
//!
//! Pipeline: Latest Reading → Classification → Insight → Dashboard
//!
//! Everything here is pure: it reads a patient snapshot and returns new
//! values, so it can be called from any number of threads without locking.

mod classifier;
mod emergency;
mod history;
mod insight;

pub use classifier::*;
pub use emergency::*;
pub use history::*;
pub use insight::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TriageConfig;
use crate::models::{HistoricalReading, Insight, Patient, PrecomputedInsights};

/// Triage errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriageError {
    #[error("No vitals recorded for patient: {0}")]
    NoVitals(String),
}

pub type TriageResult<T> = Result<T, TriageError>;

/// Everything a dashboard shows for one patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientTriage {
    pub patient_id: String,
    pub is_emergency: bool,
    pub last_checkup: Option<NaiveDate>,
    /// Tiers for the latest reading; `None` without readings
    pub assessment: Option<VitalsAssessment>,
    /// `None` when there is neither a stored insight nor a reading
    pub insight: Option<Insight>,
}

/// Main engine that applies the configured policies to patients.
pub struct TriageEngine<'a> {
    config: &'a TriageConfig,
    insights: InsightGenerator<'a>,
}

impl<'a> TriageEngine<'a> {
    /// Create a new engine.
    pub fn new(config: &'a TriageConfig, precomputed: &'a PrecomputedInsights) -> Self {
        Self {
            config,
            insights: InsightGenerator::new(config.insight, precomputed),
        }
    }

    /// Classify the latest reading and attach an insight.
    pub fn triage(&self, patient: &Patient) -> PatientTriage {
        let assessment = patient
            .latest_vitals()
            .map(|vitals| self.config.classification.classify_reading(vitals));

        // Only failure is a patient without readings and without a stored note
        let insight = self.insights.insight_for(patient).ok();

        PatientTriage {
            patient_id: patient.id.clone(),
            is_emergency: patient.is_emergency,
            last_checkup: patient.last_checkup,
            assessment,
            insight,
        }
    }

    /// Triage a batch of patients, preserving order.
    pub fn triage_all(&self, patients: &[Patient]) -> Vec<PatientTriage> {
        patients.iter().map(|p| self.triage(p)).collect()
    }

    /// Insight for a single patient.
    pub fn insight(&self, patient: &Patient) -> TriageResult<Insight> {
        self.insights.insight_for(patient)
    }

    /// Chart history over the configured dates.
    pub fn history<J: JitterSource>(&self, patient: &Patient, jitter: &mut J) -> Vec<HistoricalReading> {
        synthesize_history(
            patient,
            &self.config.history_dates,
            &self.config.default_reading,
            jitter,
        )
    }

    /// Get the classification policy in use.
    pub fn classification(&self) -> &ClassificationThresholds {
        &self.config.classification
    }
}
