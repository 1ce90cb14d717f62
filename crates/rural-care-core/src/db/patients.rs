//! Patient database operations.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::emergencies::insert_emergency_case;
use super::{Database, DbError, DbResult};
use crate::models::{EmergencySeverity, Gender, NewPatient, Patient, VitalSigns, VitalsSubmission};
use crate::session::Session;

/// Case description used when a flagged submission carries no notes.
pub const DEFAULT_EMERGENCY_DESCRIPTION: &str = "Emergency situation reported";

const PATIENT_COLUMNS: &str = r#"
    id, name, age, gender, village, phone, notes, last_checkup,
    is_emergency, medical_history, allergies, created_at, updated_at
"#;

impl Database {
    /// Insert a new patient together with any readings it already carries.
    ///
    /// The patient row and its readings are written in one transaction.
    /// Readings are dated by `last_checkup`, which must be set when any are
    /// present.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        let recorded_on = match (patient.last_checkup, patient.vitals.is_empty()) {
            (Some(date), _) => date_to_string(date),
            (None, true) => String::new(),
            (None, false) => {
                return Err(DbError::Constraint(format!(
                    "Patient {} has readings but no last checkup date",
                    patient.id
                )))
            }
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO patients ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                PATIENT_COLUMNS
            ),
            params![
                patient.id,
                patient.name,
                patient.age,
                gender_to_string(patient.gender),
                patient.village,
                patient.phone,
                patient.notes,
                patient.last_checkup.map(date_to_string),
                patient.is_emergency,
                patient.medical_history,
                patient.allergies,
                patient.created_at,
                patient.updated_at,
            ],
        )?;

        // Oldest first: vitals id order is recording order
        for vitals in patient.vitals.iter().rev() {
            insert_vitals(&tx, &patient.id, vitals, None, None, &recorded_on)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Get a patient by ID, readings most recent first.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                patient_row,
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row)?)),
            None => Ok(None),
        }
    }

    /// List all patients in registration order.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        self.query_patients(None)
    }

    /// Patients visible to a session: a nurse's village, or everyone for a doctor.
    pub fn list_patients_for(&self, session: &Session) -> DbResult<Vec<Patient>> {
        self.query_patients(session.village_scope()?)
    }

    /// Case-insensitive substring search on name or ID, optionally within one village.
    pub fn search_patients(&self, query: &str, village: Option<&str>) -> DbResult<Vec<Patient>> {
        let query = query.trim();
        Ok(self
            .query_patients(village)?
            .into_iter()
            .filter(|patient| patient.matches_search(query))
            .collect())
    }

    /// Register a patient into the session nurse's village.
    pub fn register_patient(&self, session: &Session, details: NewPatient) -> DbResult<Patient> {
        let village = session.authorize_registration()?.to_string();

        if details.name.trim().is_empty() {
            return Err(DbError::Constraint("Patient name cannot be empty".into()));
        }
        if details.age == 0 {
            return Err(DbError::Constraint("Patient age must be positive".into()));
        }

        let patient = Patient::register(details, village);
        self.insert_patient(&patient)?;

        info!(
            patient_id = %patient.id,
            village = %patient.village,
            registered_by = %session.user_id,
            "patient registered"
        );
        Ok(patient)
    }

    /// Record a vitals submission.
    ///
    /// The reading, the patient update and, when flagged, the emergency case
    /// are written in one transaction. Returns the updated patient.
    pub fn submit_vitals(
        &mut self,
        session: &Session,
        patient_id: &str,
        submission: VitalsSubmission,
    ) -> DbResult<Patient> {
        let mut patient = self
            .get_patient(patient_id)?
            .ok_or_else(|| DbError::NotFound(format!("Patient {}", patient_id)))?;
        session.authorize_vitals(&patient)?;

        let recorded_on = date_to_string(submission.recorded_on);
        let description = submission
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_EMERGENCY_DESCRIPTION)
            .to_string();
        let notes = submission.notes.clone();
        let vitals = submission.vitals.clone();
        let is_emergency = submission.is_emergency;

        patient.record_vitals(submission);

        let tx = self.transaction()?;
        insert_vitals(
            &tx,
            &patient.id,
            &vitals,
            notes.as_deref(),
            Some(&session.user_id),
            &recorded_on,
        )?;
        tx.execute(
            r#"
            UPDATE patients SET
                notes = ?2,
                last_checkup = ?3,
                is_emergency = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.notes,
                recorded_on,
                patient.is_emergency,
                patient.updated_at,
            ],
        )?;
        if is_emergency {
            insert_emergency_case(
                &tx,
                &patient.id,
                &description,
                EmergencySeverity::Medium,
                &session.user_id,
            )?;
        }
        tx.commit()?;

        info!(patient_id = %patient.id, recorded_on = %recorded_on, "vitals recorded");
        if is_emergency {
            info!(
                patient_id = %patient.id,
                reported_by = %session.user_id,
                "emergency case opened"
            );
        }
        Ok(patient)
    }

    fn query_patients(&self, village: Option<&str>) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients WHERE (?1 IS NULL OR village = ?1) ORDER BY rowid",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt
            .query_map([village], patient_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut patients = Vec::with_capacity(rows.len());
        for row in rows {
            patients.push(self.hydrate(row)?);
        }
        Ok(patients)
    }

    fn hydrate(&self, row: PatientRow) -> DbResult<Patient> {
        let vitals = load_vitals(&self.conn, &row.id)?;
        let mut patient: Patient = row.try_into()?;
        patient.vitals = vitals;
        Ok(patient)
    }
}

fn insert_vitals(
    conn: &Connection,
    patient_id: &str,
    vitals: &VitalSigns,
    notes: Option<&str>,
    recorded_by: Option<&str>,
    recorded_on: &str,
) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO vitals (
            patient_id, blood_pressure, heart_rate, blood_sugar, temperature,
            oxygen_saturation, notes, recorded_by, recorded_on
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            patient_id,
            vitals.blood_pressure,
            vitals.heart_rate,
            vitals.blood_sugar,
            vitals.temperature,
            vitals.oxygen_saturation,
            notes,
            recorded_by,
            recorded_on,
        ],
    )?;
    Ok(())
}

fn load_vitals(conn: &Connection, patient_id: &str) -> DbResult<Vec<VitalSigns>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT blood_pressure, heart_rate, blood_sugar, temperature, oxygen_saturation
        FROM vitals
        WHERE patient_id = ?
        ORDER BY id DESC
        "#,
    )?;

    let rows = stmt.query_map([patient_id], |row| {
        Ok(VitalSigns {
            blood_pressure: row.get(0)?,
            heart_rate: row.get(1)?,
            blood_sugar: row.get(2)?,
            temperature: row.get(3)?,
            oxygen_saturation: row.get(4)?,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Intermediate row struct for patient queries.
struct PatientRow {
    id: String,
    name: String,
    age: u32,
    gender: String,
    village: String,
    phone: Option<String>,
    notes: Option<String>,
    last_checkup: Option<String>,
    is_emergency: bool,
    medical_history: Option<String>,
    allergies: Option<String>,
    created_at: String,
    updated_at: String,
}

fn patient_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        village: row.get(4)?,
        phone: row.get(5)?,
        notes: row.get(6)?,
        last_checkup: row.get(7)?,
        is_emergency: row.get(8)?,
        medical_history: row.get(9)?,
        allergies: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: row.id,
            name: row.name,
            age: row.age,
            gender: string_to_gender(&row.gender)?,
            village: row.village,
            phone: row.phone,
            vitals: Vec::new(),
            notes: row.notes,
            last_checkup: row.last_checkup.as_deref().map(string_to_date).transpose()?,
            is_emergency: row.is_emergency,
            medical_history: row.medical_history,
            allergies: row.allergies,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn gender_to_string(gender: Gender) -> &'static str {
    gender.as_str()
}

fn string_to_gender(s: &str) -> Result<Gender, DbError> {
    match s {
        "Male" => Ok(Gender::Male),
        "Female" => Ok(Gender::Female),
        "Other" => Ok(Gender::Other),
        _ => Err(DbError::Constraint(format!("Unknown gender: {}", s))),
    }
}

fn date_to_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn string_to_date(s: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| DbError::Constraint(format!("Invalid date: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CaseStatus;
    use crate::session::AccessError;

    fn details(name: &str) -> NewPatient {
        NewPatient {
            name: name.into(),
            age: 45,
            gender: Gender::Male,
            phone: Some("9876543210".into()),
            medical_history: None,
            allergies: None,
        }
    }

    fn submission(bp: &str, notes: Option<&str>, is_emergency: bool, day: u32) -> VitalsSubmission {
        VitalsSubmission {
            vitals: VitalSigns {
                blood_pressure: bp.into(),
                ..VitalSigns::default()
            },
            notes: notes.map(String::from),
            is_emergency,
            recorded_on: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let mut patient = Patient::new("Rajesh Kumar".into(), 45, Gender::Male, "Ranchi".into());
        patient.vitals = vec![
            VitalSigns { blood_pressure: "130/85".into(), ..VitalSigns::default() },
            VitalSigns { blood_pressure: "120/80".into(), ..VitalSigns::default() },
        ];
        patient.last_checkup = NaiveDate::from_ymd_opt(2025, 4, 5);
        db.insert_patient(&patient).unwrap();

        let loaded = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(loaded, patient);
        assert_eq!(loaded.latest_vitals().unwrap().blood_pressure, "130/85");
    }

    #[test]
    fn test_get_missing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_patient("P404").unwrap().is_none());
    }

    #[test]
    fn test_register_uses_session_village() {
        let db = Database::open_in_memory().unwrap();
        let nurse = Session::nurse("n1", "Sunita", "Giridih");

        let patient = db.register_patient(&nurse, details("Sunil Oraon")).unwrap();
        assert_eq!(patient.village, "Giridih");
        assert!(patient.vitals.is_empty());
        assert!(patient.last_checkup.is_none());

        let doctor = Session::doctor("d1", "Dr. Ravi Kumar");
        assert!(matches!(
            db.register_patient(&doctor, details("Other")),
            Err(DbError::Access(AccessError::WrongRole { .. }))
        ));
        assert!(matches!(
            db.register_patient(&nurse, details("  ")),
            Err(DbError::Constraint(_))
        ));
    }

    #[test]
    fn test_submit_vitals_updates_patient() {
        let mut db = Database::open_in_memory().unwrap();
        let nurse = Session::nurse("n1", "Sunita", "Ranchi");
        let patient = db.register_patient(&nurse, details("Rajesh Kumar")).unwrap();

        db.submit_vitals(&nurse, &patient.id, submission("120/80", Some("Routine"), false, 1))
            .unwrap();
        let updated = db
            .submit_vitals(&nurse, &patient.id, submission("150/95", Some("   "), false, 5))
            .unwrap();

        assert_eq!(updated.vitals.len(), 2);
        assert_eq!(updated.notes.as_deref(), Some("Routine"));
        assert_eq!(updated.last_checkup, NaiveDate::from_ymd_opt(2025, 4, 5));

        let stored = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(stored.vitals, updated.vitals);
        assert_eq!(stored.vitals[0].blood_pressure, "150/95");
        assert_eq!(stored.notes.as_deref(), Some("Routine"));
        assert!(db.list_emergency_cases(None).unwrap().is_empty());
    }

    #[test]
    fn test_emergency_submission_opens_case() {
        let mut db = Database::open_in_memory().unwrap();
        let nurse = Session::nurse("n1", "Sunita", "Ranchi");
        let patient = db.register_patient(&nurse, details("Priya Singh")).unwrap();

        let updated = db
            .submit_vitals(&nurse, &patient.id, submission("160/100", None, true, 7))
            .unwrap();
        assert!(updated.is_emergency);

        let cases = db.list_emergency_cases(Some(CaseStatus::Pending)).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].patient_id, patient.id);
        assert_eq!(cases[0].description, DEFAULT_EMERGENCY_DESCRIPTION);
        assert_eq!(cases[0].severity, EmergencySeverity::Medium);
        assert_eq!(cases[0].reported_by, "n1");

        // Clearing the flag is the clinician's call too
        let cleared = db
            .submit_vitals(&nurse, &patient.id, submission("125/82", None, false, 8))
            .unwrap();
        assert!(!cleared.is_emergency);
    }

    #[test]
    fn test_submit_outside_village_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let ranchi = Session::nurse("n1", "Sunita", "Ranchi");
        let dumka = Session::nurse("n2", "Rekha", "Dumka");
        let patient = db.register_patient(&ranchi, details("Rajesh Kumar")).unwrap();

        let result = db.submit_vitals(&dumka, &patient.id, submission("120/80", None, true, 1));
        assert!(matches!(result, Err(DbError::Access(AccessError::OutsideVillage { .. }))));

        // Nothing written
        let stored = db.get_patient(&patient.id).unwrap().unwrap();
        assert!(stored.vitals.is_empty());
        assert!(db.list_emergency_cases(None).unwrap().is_empty());
    }

    #[test]
    fn test_submit_missing_patient() {
        let mut db = Database::open_in_memory().unwrap();
        let nurse = Session::nurse("n1", "Sunita", "Ranchi");
        assert!(matches!(
            db.submit_vitals(&nurse, "P404", submission("120/80", None, false, 1)),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_and_search_scoped() {
        let db = Database::open_in_memory().unwrap();
        let ranchi = Session::nurse("n1", "Sunita", "Ranchi");
        let dumka = Session::nurse("n2", "Rekha", "Dumka");
        db.register_patient(&ranchi, details("Rajesh Kumar")).unwrap();
        db.register_patient(&ranchi, details("Priya Singh")).unwrap();
        db.register_patient(&dumka, details("Vikram Mahato")).unwrap();

        assert_eq!(db.list_patients().unwrap().len(), 3);
        assert_eq!(db.list_patients_for(&ranchi).unwrap().len(), 2);
        assert_eq!(db.list_patients_for(&Session::doctor("d1", "Dr")).unwrap().len(), 3);

        let found = db.search_patients("KUMAR", None).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Rajesh Kumar");

        assert!(db.search_patients("vikram", Some("Ranchi")).unwrap().is_empty());
        assert_eq!(db.search_patients("", Some("Ranchi")).unwrap().len(), 2);
    }

    #[test]
    fn test_unassigned_nurse_lists_nothing() {
        let db = Database::open_in_memory().unwrap();
        let ranchi = Session::nurse("n1", "Sunita", "Ranchi");
        db.register_patient(&ranchi, details("Rajesh Kumar")).unwrap();

        let mut unassigned = ranchi.clone();
        unassigned.village = None;
        assert!(matches!(
            db.list_patients_for(&unassigned),
            Err(DbError::Access(AccessError::NoVillage))
        ));
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let db = Database::open_in_memory().unwrap();
        let nurse = Session::nurse("n1", "Sunita", "Ranchi");
        db.register_patient(&nurse, details("Zoë Müller")).unwrap();

        let found = db.search_patients("MÜLLER", None).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Zoë Müller");
        assert_eq!(db.search_patients("  zoË ", Some("Ranchi")).unwrap().len(), 1);
    }

    #[test]
    fn test_insert_patient_is_atomic() {
        let db = Database::open_in_memory().unwrap();
        let mut patient = Patient::new("Anita Devi".into(), 62, Gender::Female, "Bokaro".into());
        patient.last_checkup = NaiveDate::from_ymd_opt(2025, 4, 2);
        patient.vitals = vec![
            VitalSigns::default(),
            VitalSigns { oxygen_saturation: 150, ..VitalSigns::default() },
        ];

        assert!(db.insert_patient(&patient).is_err());
        assert!(db.get_patient(&patient.id).unwrap().is_none());
        assert!(db.list_patients().unwrap().is_empty());
    }

    #[test]
    fn test_insert_readings_require_checkup_date() {
        let db = Database::open_in_memory().unwrap();
        let mut patient = Patient::new("Anita Devi".into(), 62, Gender::Female, "Bokaro".into());
        patient.vitals = vec![VitalSigns::default()];

        assert!(matches!(db.insert_patient(&patient), Err(DbError::Constraint(_))));
        assert!(db.get_patient(&patient.id).unwrap().is_none());
    }
}
