//! Rural Care Core Library
//!
//! Offline-first vitals triage for village health workers and the doctors
//! who supervise them.
//!
//! # Architecture
//!
//! ```text
//! Nurse (village) → Vitals Submission ──► [SQLite: patients, vitals]
//!                          │
//!                          │ flagged by nurse
//!                          ▼
//!                   [emergency_cases] ──► Doctor Alert Banner
//!
//! Doctor Dashboard ◄── Classification ◄── Latest Reading
//!                  ◄── Insight (stored note, else generated)
//!                  ◄── Trend Chart (synthesized history)
//! ```
//!
//! # Core Principle
//!
//! **The emergency flag is the clinician's call.** Threshold tiers colour
//! the dashboard but never raise or clear an emergency on their own.
//!
//! # Modules
//!
//! - [`db`]: SQLite persistence for patients, vitals, cases and insights
//! - [`models`]: Domain types (Patient, VitalSigns, EmergencyCase, etc.)
//! - [`triage`]: Classification, insights, emergency aggregation, history
//! - [`session`]: Role and village scoping for the signed-in user
//! - [`config`]: Thresholds, villages and chart dates
//! - [`demo`]: Demo patient population

pub mod config;
pub mod db;
pub mod demo;
pub mod models;
pub mod session;
pub mod triage;

// Re-export commonly used types
pub use config::TriageConfig;
pub use db::Database;
pub use models::{
    CaseStatus, EmergencyCase, EmergencySeverity, Gender, HistoricalReading, Insight,
    InsightSource, NewPatient, Patient, PrecomputedInsights, VitalKind, VitalSigns,
    VitalsSubmission,
};
pub use session::{Role, Session};
pub use triage::{
    ClassificationThresholds, InsightThresholds, RandomJitter, Tier, TriageEngine, VitalValue,
    VitalsAssessment,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::models::MAX_OXYGEN_SATURATION;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum RuralCareError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for RuralCareError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => RuralCareError::NotFound(what),
            db::DbError::Access(e) => RuralCareError::AccessDenied(e.to_string()),
            db::DbError::Constraint(msg) => RuralCareError::InvalidInput(msg),
            e => RuralCareError::DatabaseError(e.to_string()),
        }
    }
}

impl From<session::AccessError> for RuralCareError {
    fn from(e: session::AccessError) -> Self {
        RuralCareError::AccessDenied(e.to_string())
    }
}

impl From<triage::TriageError> for RuralCareError {
    fn from(e: triage::TriageError) -> Self {
        RuralCareError::NotFound(e.to_string())
    }
}

impl From<config::ConfigError> for RuralCareError {
    fn from(e: config::ConfigError) -> Self {
        RuralCareError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for RuralCareError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RuralCareError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
///
/// `config_json` overrides the built-in thresholds, villages and chart dates.
#[uniffi::export]
pub fn open_database(
    path: String,
    config_json: Option<String>,
) -> Result<Arc<RuralCareCore>, RuralCareError> {
    let config = load_config(config_json)?;
    let db = Database::open(&path)?;
    Ok(Arc::new(RuralCareCore::new(db, config)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory(
    config_json: Option<String>,
) -> Result<Arc<RuralCareCore>, RuralCareError> {
    let config = load_config(config_json)?;
    let db = Database::open_in_memory()?;
    Ok(Arc::new(RuralCareCore::new(db, config)))
}

fn load_config(config_json: Option<String>) -> Result<TriageConfig, RuralCareError> {
    match config_json {
        Some(json) => Ok(TriageConfig::from_json_str(&json)?),
        None => Ok(TriageConfig::default()),
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct RuralCareCore {
    db: Arc<Mutex<Database>>,
    config: TriageConfig,
}

impl RuralCareCore {
    pub fn new(db: Database, config: TriageConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config,
        }
    }

    fn visible_patient(
        &self,
        db: &Database,
        session: &Session,
        patient_id: &str,
    ) -> Result<Patient, RuralCareError> {
        let patient = db
            .get_patient(patient_id)?
            .ok_or_else(|| RuralCareError::NotFound(format!("Patient {}", patient_id)))?;
        if !session.can_view(&patient) {
            return Err(RuralCareError::AccessDenied(format!(
                "patient {} is outside the session's village",
                patient_id
            )));
        }
        Ok(patient)
    }
}

#[uniffi::export]
impl RuralCareCore {
    // =========================================================================
    // Setup
    // =========================================================================

    /// Load the demo patients; returns how many were inserted.
    pub fn seed_demo(&self) -> Result<u32, RuralCareError> {
        let db = self.db.lock()?;
        Ok(demo::seed_demo(&db)? as u32)
    }

    /// Known villages, in configured order.
    pub fn villages(&self) -> Vec<String> {
        self.config.villages.clone()
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a patient into the nurse's village.
    pub fn register_patient(
        &self,
        session: FfiSession,
        details: FfiNewPatient,
    ) -> Result<FfiPatient, RuralCareError> {
        let session: Session = session.into();
        let village = session.authorize_registration()?;
        if !self.config.is_known_village(village) {
            return Err(RuralCareError::InvalidInput(format!("Unknown village: {}", village)));
        }

        let db = self.db.lock()?;
        let patient = db.register_patient(&session, details.into())?;
        Ok(patient.into())
    }

    /// Get a patient visible to the session.
    pub fn get_patient(
        &self,
        session: FfiSession,
        patient_id: String,
    ) -> Result<FfiPatient, RuralCareError> {
        let db = self.db.lock()?;
        let patient = self.visible_patient(&db, &session.into(), &patient_id)?;
        Ok(patient.into())
    }

    /// Patients visible to the session.
    pub fn list_patients(&self, session: FfiSession) -> Result<Vec<FfiPatient>, RuralCareError> {
        let db = self.db.lock()?;
        let patients = db.list_patients_for(&session.into())?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Search by name or ID. Nurses are always held to their own village.
    pub fn search_patients(
        &self,
        session: FfiSession,
        query: String,
        village: Option<String>,
    ) -> Result<Vec<FfiPatient>, RuralCareError> {
        let session: Session = session.into();
        let village = session.village_scope()?.map(String::from).or(village);

        let db = self.db.lock()?;
        let patients = db.search_patients(&query, village.as_deref())?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Record a vitals submission; flagged submissions open an emergency case.
    pub fn submit_vitals(
        &self,
        session: FfiSession,
        patient_id: String,
        submission: FfiVitalsSubmission,
    ) -> Result<FfiPatient, RuralCareError> {
        let submission = VitalsSubmission::try_from(submission)?;
        let mut db = self.db.lock()?;
        let patient = db.submit_vitals(&session.into(), &patient_id, submission)?;
        Ok(patient.into())
    }

    // =========================================================================
    // Triage Operations
    // =========================================================================

    /// Tier for one named vital. Unknown names classify as normal.
    pub fn classify_vital(&self, vital: String, value: String) -> FfiTier {
        self.config
            .classification
            .classify_named(&vital, VitalValue::from(value.as_str()))
            .into()
    }

    /// Tiers for the patient's latest reading, if any.
    pub fn assess_latest(
        &self,
        session: FfiSession,
        patient_id: String,
    ) -> Result<Option<FfiAssessment>, RuralCareError> {
        let db = self.db.lock()?;
        let patient = self.visible_patient(&db, &session.into(), &patient_id)?;
        Ok(patient
            .latest_vitals()
            .map(|v| self.config.classification.classify_reading(v).into()))
    }

    /// Stored insight, or one generated from the latest reading.
    pub fn patient_insight(
        &self,
        session: FfiSession,
        patient_id: String,
    ) -> Result<FfiInsight, RuralCareError> {
        let db = self.db.lock()?;
        let patient = self.visible_patient(&db, &session.into(), &patient_id)?;
        let stored = db.load_insights()?;
        let engine = TriageEngine::new(&self.config, &stored);
        Ok(engine.insight(&patient)?.into())
    }

    /// Number of flagged patients visible to the session.
    pub fn emergency_count(&self, session: FfiSession) -> Result<u32, RuralCareError> {
        let db = self.db.lock()?;
        let patients = db.list_patients_for(&session.into())?;
        Ok(triage::count_emergencies(&patients) as u32)
    }

    /// Alert banner text for the session, if any patient is flagged.
    pub fn emergency_banner(&self, session: FfiSession) -> Result<Option<String>, RuralCareError> {
        let count = self.emergency_count(session)?;
        Ok(triage::emergency_banner(count as usize))
    }

    /// Chart history over the configured dates. A seed pins the series.
    pub fn history(
        &self,
        session: FfiSession,
        patient_id: String,
        seed: Option<u64>,
    ) -> Result<Vec<FfiHistoricalReading>, RuralCareError> {
        let db = self.db.lock()?;
        let patient = self.visible_patient(&db, &session.into(), &patient_id)?;
        let stored = PrecomputedInsights::new();
        let engine = TriageEngine::new(&self.config, &stored);

        let history = match seed {
            Some(seed) => engine.history(&patient, &mut RandomJitter::seeded(seed)),
            None => engine.history(&patient, &mut RandomJitter::from_entropy()),
        };
        Ok(history.into_iter().map(|h| h.into()).collect())
    }

    // =========================================================================
    // Emergency Case Operations
    // =========================================================================

    /// Emergency cases for doctor review, newest first.
    pub fn list_emergency_cases(
        &self,
        session: FfiSession,
        status: Option<FfiCaseStatus>,
    ) -> Result<Vec<FfiEmergencyCase>, RuralCareError> {
        let session: Session = session.into();
        session.authorize_case_review()?;

        let db = self.db.lock()?;
        let cases = db.list_emergency_cases(status.map(Into::into))?;
        Ok(cases.into_iter().map(|c| c.into()).collect())
    }

    /// Acknowledge or resolve a case.
    pub fn update_case_status(
        &self,
        session: FfiSession,
        case_id: i64,
        status: FfiCaseStatus,
    ) -> Result<FfiEmergencyCase, RuralCareError> {
        let db = self.db.lock()?;
        let case = db.update_case_status(&session.into(), case_id, status.into())?;
        Ok(case.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiRole {
    Nurse,
    Doctor,
}

/// FFI-safe session.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSession {
    pub user_id: String,
    pub display_name: String,
    pub role: FfiRole,
    pub village: Option<String>,
}

impl From<FfiSession> for Session {
    fn from(s: FfiSession) -> Self {
        Session {
            user_id: s.user_id,
            display_name: s.display_name,
            role: match s.role {
                FfiRole::Nurse => Role::Nurse,
                FfiRole::Doctor => Role::Doctor,
            },
            village: s.village,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiGender {
    Male,
    Female,
    Other,
}

impl From<Gender> for FfiGender {
    fn from(g: Gender) -> Self {
        match g {
            Gender::Male => FfiGender::Male,
            Gender::Female => FfiGender::Female,
            Gender::Other => FfiGender::Other,
        }
    }
}

impl From<FfiGender> for Gender {
    fn from(g: FfiGender) -> Self {
        match g {
            FfiGender::Male => Gender::Male,
            FfiGender::Female => Gender::Female,
            FfiGender::Other => Gender::Other,
        }
    }
}

/// FFI-safe vitals reading.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiVitals {
    pub blood_pressure: String,
    pub heart_rate: u32,
    pub blood_sugar: u32,
    pub temperature: f64,
    pub oxygen_saturation: u32,
}

impl From<VitalSigns> for FfiVitals {
    fn from(v: VitalSigns) -> Self {
        Self {
            blood_pressure: v.blood_pressure,
            heart_rate: v.heart_rate,
            blood_sugar: v.blood_sugar,
            temperature: v.temperature,
            oxygen_saturation: v.oxygen_saturation,
        }
    }
}

impl From<FfiVitals> for VitalSigns {
    fn from(v: FfiVitals) -> Self {
        VitalSigns {
            blood_pressure: v.blood_pressure,
            heart_rate: v.heart_rate,
            blood_sugar: v.blood_sugar,
            temperature: v.temperature,
            oxygen_saturation: v.oxygen_saturation,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: FfiGender,
    pub village: String,
    pub phone: Option<String>,
    /// Most recent first
    pub vitals: Vec<FfiVitals>,
    pub notes: Option<String>,
    /// ISO date of the latest submission
    pub last_checkup: Option<String>,
    pub is_emergency: bool,
    pub medical_history: Option<String>,
    pub allergies: Option<String>,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender.into(),
            village: patient.village,
            phone: patient.phone,
            vitals: patient.vitals.into_iter().map(|v| v.into()).collect(),
            notes: patient.notes,
            last_checkup: patient.last_checkup.map(|d| d.to_string()),
            is_emergency: patient.is_emergency,
            medical_history: patient.medical_history,
            allergies: patient.allergies,
        }
    }
}

/// FFI-safe registration details.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub age: u32,
    pub gender: FfiGender,
    pub phone: Option<String>,
    pub medical_history: Option<String>,
    pub allergies: Option<String>,
}

impl From<FfiNewPatient> for NewPatient {
    fn from(p: FfiNewPatient) -> Self {
        NewPatient {
            name: p.name,
            age: p.age,
            gender: p.gender.into(),
            phone: p.phone,
            medical_history: p.medical_history,
            allergies: p.allergies,
        }
    }
}

/// FFI-safe vitals submission.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVitalsSubmission {
    pub vitals: FfiVitals,
    pub notes: Option<String>,
    pub is_emergency: bool,
    /// ISO date (YYYY-MM-DD)
    pub recorded_on: String,
}

impl TryFrom<FfiVitalsSubmission> for VitalsSubmission {
    type Error = RuralCareError;

    fn try_from(s: FfiVitalsSubmission) -> Result<Self, Self::Error> {
        let recorded_on = NaiveDate::parse_from_str(&s.recorded_on, "%Y-%m-%d")
            .map_err(|_| RuralCareError::InvalidInput(format!("Invalid date: {}", s.recorded_on)))?;
        if s.vitals.oxygen_saturation > MAX_OXYGEN_SATURATION {
            return Err(RuralCareError::InvalidInput(format!(
                "Oxygen saturation cannot exceed {}%: {}",
                MAX_OXYGEN_SATURATION, s.vitals.oxygen_saturation
            )));
        }
        Ok(VitalsSubmission {
            vitals: s.vitals.into(),
            notes: s.notes,
            is_emergency: s.is_emergency,
            recorded_on,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiTier {
    Normal,
    Warning,
    Emergency,
}

impl From<Tier> for FfiTier {
    fn from(t: Tier) -> Self {
        match t {
            Tier::Normal => FfiTier::Normal,
            Tier::Warning => FfiTier::Warning,
            Tier::Emergency => FfiTier::Emergency,
        }
    }
}

/// FFI-safe tiers for one reading.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAssessment {
    pub blood_pressure: FfiTier,
    pub heart_rate: FfiTier,
    pub blood_sugar: FfiTier,
    pub temperature: FfiTier,
    pub oxygen_saturation: FfiTier,
    pub highest: FfiTier,
}

impl From<VitalsAssessment> for FfiAssessment {
    fn from(a: VitalsAssessment) -> Self {
        Self {
            blood_pressure: a.blood_pressure.into(),
            heart_rate: a.heart_rate.into(),
            blood_sugar: a.blood_sugar.into(),
            temperature: a.temperature.into(),
            oxygen_saturation: a.oxygen_saturation.into(),
            highest: a.highest().into(),
        }
    }
}

/// FFI-safe insight.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInsight {
    pub patient_id: String,
    pub text: String,
    pub is_precomputed: bool,
    pub recommendations: Vec<String>,
}

impl From<Insight> for FfiInsight {
    fn from(i: Insight) -> Self {
        Self {
            patient_id: i.patient_id,
            text: i.text,
            is_precomputed: i.source == InsightSource::Precomputed,
            recommendations: i.recommendations,
        }
    }
}

/// FFI-safe chart point.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHistoricalReading {
    pub date: String,
    pub vitals: FfiVitals,
}

impl From<HistoricalReading> for FfiHistoricalReading {
    fn from(h: HistoricalReading) -> Self {
        Self {
            date: h.date.to_string(),
            vitals: h.vitals.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiCaseStatus {
    Pending,
    Acknowledged,
    Resolved,
}

impl From<CaseStatus> for FfiCaseStatus {
    fn from(s: CaseStatus) -> Self {
        match s {
            CaseStatus::Pending => FfiCaseStatus::Pending,
            CaseStatus::Acknowledged => FfiCaseStatus::Acknowledged,
            CaseStatus::Resolved => FfiCaseStatus::Resolved,
        }
    }
}

impl From<FfiCaseStatus> for CaseStatus {
    fn from(s: FfiCaseStatus) -> Self {
        match s {
            FfiCaseStatus::Pending => CaseStatus::Pending,
            FfiCaseStatus::Acknowledged => CaseStatus::Acknowledged,
            FfiCaseStatus::Resolved => CaseStatus::Resolved,
        }
    }
}

/// FFI-safe emergency case.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEmergencyCase {
    pub id: i64,
    pub patient_id: String,
    pub description: String,
    /// "low", "medium" or "high"
    pub severity: String,
    pub reported_by: String,
    pub status: FfiCaseStatus,
    pub created_at: String,
}

impl From<EmergencyCase> for FfiEmergencyCase {
    fn from(c: EmergencyCase) -> Self {
        let severity = match c.severity {
            EmergencySeverity::Low => "low",
            EmergencySeverity::Medium => "medium",
            EmergencySeverity::High => "high",
        };
        Self {
            id: c.id,
            patient_id: c.patient_id,
            description: c.description,
            severity: severity.to_string(),
            reported_by: c.reported_by,
            status: c.status.into(),
            created_at: c.created_at,
        }
    }
}
