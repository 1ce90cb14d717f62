//! Emergency case database operations.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::{Database, DbError, DbResult};
use crate::models::{CaseStatus, EmergencyCase, EmergencySeverity};
use crate::session::Session;

impl Database {
    /// List emergency cases, newest first, optionally filtered by status.
    pub fn list_emergency_cases(&self, status: Option<CaseStatus>) -> DbResult<Vec<EmergencyCase>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, description, severity, reported_by, status, created_at
            FROM emergency_cases
            WHERE (?1 IS NULL OR status = ?1)
            ORDER BY id DESC
            "#,
        )?;

        let rows = stmt.query_map([status.map(status_to_string)], |row| {
            Ok(CaseRow {
                id: row.get(0)?,
                patient_id: row.get(1)?,
                description: row.get(2)?,
                severity: row.get(3)?,
                reported_by: row.get(4)?,
                status: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;

        let mut cases: Vec<EmergencyCase> = Vec::new();
        for row in rows {
            cases.push(row?.try_into()?);
        }
        Ok(cases)
    }

    /// Get a single case by ID.
    pub fn get_emergency_case(&self, id: i64) -> DbResult<Option<EmergencyCase>> {
        self.conn
            .query_row(
                r#"
                SELECT id, patient_id, description, severity, reported_by, status, created_at
                FROM emergency_cases
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(CaseRow {
                        id: row.get(0)?,
                        patient_id: row.get(1)?,
                        description: row.get(2)?,
                        severity: row.get(3)?,
                        reported_by: row.get(4)?,
                        status: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Move a case to a new status. Doctors only.
    pub fn update_case_status(
        &self,
        session: &Session,
        id: i64,
        status: CaseStatus,
    ) -> DbResult<EmergencyCase> {
        session.authorize_case_review()?;

        let rows_affected = self.conn.execute(
            "UPDATE emergency_cases SET status = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![id, status_to_string(status)],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("Emergency case {}", id)));
        }

        info!(case_id = id, status = status_to_string(status), reviewed_by = %session.user_id, "emergency case updated");

        self.get_emergency_case(id)?
            .ok_or_else(|| DbError::NotFound(format!("Emergency case {}", id)))
    }
}

/// Open a case; callers pass the submission's transaction.
pub(super) fn insert_emergency_case(
    conn: &Connection,
    patient_id: &str,
    description: &str,
    severity: EmergencySeverity,
    reported_by: &str,
) -> DbResult<i64> {
    conn.execute(
        r#"
        INSERT INTO emergency_cases (patient_id, description, severity, reported_by, status)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            patient_id,
            description,
            severity_to_string(severity),
            reported_by,
            status_to_string(CaseStatus::Pending),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Intermediate row struct for case queries.
struct CaseRow {
    id: i64,
    patient_id: String,
    description: String,
    severity: String,
    reported_by: String,
    status: String,
    created_at: String,
}

impl TryFrom<CaseRow> for EmergencyCase {
    type Error = DbError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        Ok(EmergencyCase {
            id: row.id,
            patient_id: row.patient_id,
            description: row.description,
            severity: string_to_severity(&row.severity)?,
            reported_by: row.reported_by,
            status: string_to_status(&row.status)?,
            created_at: row.created_at,
        })
    }
}

fn severity_to_string(severity: EmergencySeverity) -> &'static str {
    match severity {
        EmergencySeverity::Low => "low",
        EmergencySeverity::Medium => "medium",
        EmergencySeverity::High => "high",
    }
}

fn string_to_severity(s: &str) -> Result<EmergencySeverity, DbError> {
    match s {
        "low" => Ok(EmergencySeverity::Low),
        "medium" => Ok(EmergencySeverity::Medium),
        "high" => Ok(EmergencySeverity::High),
        _ => Err(DbError::Constraint(format!("Unknown case severity: {}", s))),
    }
}

fn status_to_string(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Pending => "pending",
        CaseStatus::Acknowledged => "acknowledged",
        CaseStatus::Resolved => "resolved",
    }
}

fn string_to_status(s: &str) -> Result<CaseStatus, DbError> {
    match s {
        "pending" => Ok(CaseStatus::Pending),
        "acknowledged" => Ok(CaseStatus::Acknowledged),
        "resolved" => Ok(CaseStatus::Resolved),
        _ => Err(DbError::Constraint(format!("Unknown case status: {}", s))),
    }
}
