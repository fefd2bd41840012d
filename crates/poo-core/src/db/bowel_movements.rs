//! Bowel movement operations

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::{BowelMovement, NewBowelMovement};

const SELECT_COLUMNS: &str = "SELECT id, user_id, bristol_type, pain, strain, satisfaction, notes, recorded_at, created_at FROM bowel_movements";

fn row_to_bowel_movement(row: &Row<'_>) -> rusqlite::Result<BowelMovement> {
    let recorded_at: String = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(BowelMovement {
        id: row.get(0)?,
        user_id: row.get(1)?,
        bristol_type: row.get(2)?,
        pain: row.get(3)?,
        strain: row.get(4)?,
        satisfaction: row.get(5)?,
        notes: row.get(6)?,
        recorded_at: parse_datetime(&recorded_at)?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl Database {
    /// Validate and insert a bowel movement, returning its ID
    pub fn insert_bowel_movement(&self, bm: &NewBowelMovement) -> Result<i64> {
        bm.validate()?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO bowel_movements (user_id, bristol_type, pain, strain, satisfaction, notes, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                bm.user_id,
                bm.bristol_type,
                bm.pain,
                bm.strain,
                bm.satisfaction,
                bm.notes,
                format_datetime(&bm.recorded_at),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn get_bowel_movement(&self, id: i64) -> Result<Option<BowelMovement>> {
        let conn = self.conn()?;
        let bm = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                params![id],
                row_to_bowel_movement,
            )
            .optional()?;
        Ok(bm)
    }

    /// Bowel movements recorded within `[start, end]`, oldest first
    pub fn list_bowel_movements_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BowelMovement>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? AND recorded_at >= ? AND recorded_at <= ? ORDER BY recorded_at, id",
            SELECT_COLUMNS
        ))?;

        let rows = stmt
            .query_map(
                params![user_id, format_datetime(&start), format_datetime(&end)],
                row_to_bowel_movement,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Most recent bowel movements first
    pub fn list_bowel_movements(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BowelMovement>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? ORDER BY recorded_at DESC, id DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![user_id, limit, offset], row_to_bowel_movement)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Delete a bowel movement; returns false if it did not exist
    pub fn delete_bowel_movement(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM bowel_movements WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
