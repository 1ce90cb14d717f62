//! Stored insight operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::PrecomputedInsights;

impl Database {
    /// Store or replace the insight text for a patient.
    pub fn upsert_insight(&self, patient_id: &str, text: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO insights (patient_id, insight) VALUES (?1, ?2)
            ON CONFLICT(patient_id) DO UPDATE SET
                insight = excluded.insight,
                updated_at = datetime('now')
            "#,
            params![patient_id, text],
        )?;
        Ok(())
    }

    pub fn get_insight(&self, patient_id: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT insight FROM insights WHERE patient_id = ?",
                [patient_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn delete_insight(&self, patient_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM insights WHERE patient_id = ?", [patient_id])?;
        Ok(rows_affected > 0)
    }

    /// Load every stored insight for the triage engine.
    pub fn load_insights(&self) -> DbResult<PrecomputedInsights> {
        let mut stmt = self.conn.prepare("SELECT patient_id, insight FROM insights")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.collect::<Result<PrecomputedInsights, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Patient};

    fn db_with_patient() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new("Sanjay Prasad".into(), 52, Gender::Male, "Bokaro".into());
        db.insert_patient(&patient).unwrap();
        (db, patient.id)
    }

    #[test]
    fn test_upsert_replaces() {
        let (db, id) = db_with_patient();
        db.upsert_insight(&id, "first").unwrap();
        db.upsert_insight(&id, "second").unwrap();
        assert_eq!(db.get_insight(&id).unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_load_and_delete() {
        let (db, id) = db_with_patient();
        assert!(db.load_insights().unwrap().is_empty());

        db.upsert_insight(&id, "Uncontrolled diabetes").unwrap();
        let loaded = db.load_insights().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(&id), Some("Uncontrolled diabetes"));

        assert!(db.delete_insight(&id).unwrap());
        assert!(!db.delete_insight(&id).unwrap());
        assert!(db.get_insight(&id).unwrap().is_none());
    }

    #[test]
    fn test_insight_requires_patient() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.upsert_insight("P404", "orphan").is_err());
    }
}
