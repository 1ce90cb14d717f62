//! Clinical insight models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Where an insight's text came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InsightSource {
    /// Derived from the patient's latest vitals
    Generated,
    /// Looked up from a stored per-patient note
    Precomputed,
}

/// A short clinical note for display beside a patient's vitals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Insight {
    pub patient_id: String,
    pub text: String,
    pub source: InsightSource,
    /// Generic follow-up list; only shown with generated insights
    pub recommendations: Vec<String>,
}

/// Stored insight text keyed by patient ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PrecomputedInsights(HashMap<String, String>);

impl PrecomputedInsights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, patient_id: impl Into<String>, text: impl Into<String>) {
        self.0.insert(patient_id.into(), text.into());
    }

    pub fn get(&self, patient_id: &str) -> Option<&str> {
        self.0.get(patient_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for PrecomputedInsights {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
