//! Symptom operations

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewSymptom, Symptom};

const SELECT_COLUMNS: &str = "SELECT id, user_id, name, severity, category, symptom_type, triggers, recorded_at, created_at FROM symptoms";

fn row_to_symptom(row: &Row<'_>) -> rusqlite::Result<Symptom> {
    let category: Option<String> = row.get(4)?;
    let symptom_type: Option<String> = row.get(5)?;
    let triggers: String = row.get(6)?;
    let recorded_at: String = row.get(7)?;
    let created_at: String = row.get(8)?;

    let triggers: Vec<String> = serde_json::from_str(&triggers).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Symptom {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        severity: row.get(3)?,
        category: category.and_then(|s| s.parse().ok()),
        symptom_type: symptom_type.and_then(|s| s.parse().ok()),
        triggers,
        recorded_at: parse_datetime(&recorded_at)?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl Database {
    /// Validate and insert a symptom, returning its ID
    ///
    /// Triggers are trimmed and de-duplicated before storage.
    pub fn insert_symptom(&self, symptom: &NewSymptom) -> Result<i64> {
        symptom.validate()?;

        let mut triggers: Vec<String> = Vec::with_capacity(symptom.triggers.len());
        for trigger in &symptom.triggers {
            let trigger = trigger.trim().to_lowercase();
            if !triggers.contains(&trigger) {
                triggers.push(trigger);
            }
        }
        let triggers_json = serde_json::to_string(&triggers)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO symptoms (user_id, name, severity, category, symptom_type, triggers, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                symptom.user_id,
                symptom.name.trim(),
                symptom.severity,
                symptom.category.map(|c| c.as_str()),
                symptom.symptom_type.map(|t| t.as_str()),
                triggers_json,
                format_datetime(&symptom.recorded_at),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn get_symptom(&self, id: i64) -> Result<Option<Symptom>> {
        let conn = self.conn()?;
        let symptom = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                params![id],
                row_to_symptom,
            )
            .optional()?;
        Ok(symptom)
    }

    /// Symptoms recorded within `[start, end]`, oldest first
    pub fn list_symptoms_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Symptom>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? AND recorded_at >= ? AND recorded_at <= ? ORDER BY recorded_at, id",
            SELECT_COLUMNS
        ))?;

        let symptoms = stmt
            .query_map(
                params![user_id, format_datetime(&start), format_datetime(&end)],
                row_to_symptom,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(symptoms)
    }

    pub fn list_symptoms(&self, user_id: &str, limit: u32, offset: u32) -> Result<Vec<Symptom>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? ORDER BY recorded_at DESC, id DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS
        ))?;

        let symptoms = stmt
            .query_map(params![user_id, limit, offset], row_to_symptom)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(symptoms)
    }

    pub fn delete_symptom(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM symptoms WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
