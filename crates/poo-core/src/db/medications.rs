//! Medication operations

use rusqlite::{params, OptionalExtension, Row};

use super::{format_datetime, parse_datetime, parse_optional_datetime, Database};
use crate::error::Result;
use crate::models::{Medication, NewMedication};

const SELECT_COLUMNS: &str = "SELECT id, user_id, name, dosage, category, is_active, start_date, end_date, taken_at, created_at FROM medications";

fn row_to_medication(row: &Row<'_>) -> rusqlite::Result<Medication> {
    let category: Option<String> = row.get(4)?;
    let created_at: String = row.get(9)?;

    Ok(Medication {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        dosage: row.get(3)?,
        category: category.and_then(|s| s.parse().ok()),
        is_active: row.get(5)?,
        start_date: parse_optional_datetime(row.get(6)?)?,
        end_date: parse_optional_datetime(row.get(7)?)?,
        taken_at: parse_optional_datetime(row.get(8)?)?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl Database {
    /// Validate and insert a medication, returning its ID
    pub fn insert_medication(&self, med: &NewMedication) -> Result<i64> {
        med.validate()?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO medications (user_id, name, dosage, category, is_active, start_date, end_date, taken_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                med.user_id,
                med.name.trim(),
                med.dosage,
                med.category.map(|c| c.as_str()),
                med.is_active,
                med.start_date.as_ref().map(format_datetime),
                med.end_date.as_ref().map(format_datetime),
                med.taken_at.as_ref().map(format_datetime),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn get_medication(&self, id: i64) -> Result<Option<Medication>> {
        let conn = self.conn()?;
        let med = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                params![id],
                row_to_medication,
            )
            .optional()?;
        Ok(med)
    }

    /// Medications for a user, newest first
    pub fn list_medications(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Medication>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS
        ))?;

        let meds = stmt
            .query_map(params![user_id, limit, offset], row_to_medication)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(meds)
    }

    /// Mark a medication as stopped
    pub fn deactivate_medication(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE medications SET is_active = 0 WHERE id = ?",
            params![id],
        )?;
        Ok(updated > 0)
    }

    pub fn delete_medication(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM medications WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
