//! Meal operations

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::{Meal, NewMeal};

const SELECT_COLUMNS: &str = "SELECT id, user_id, name, category, calories, fiber_rich, dairy, gluten, spicy_level, meal_time, created_at FROM meals";

fn row_to_meal(row: &Row<'_>) -> rusqlite::Result<Meal> {
    let category: Option<String> = row.get(3)?;
    let meal_time: String = row.get(9)?;
    let created_at: String = row.get(10)?;

    Ok(Meal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        category: category.and_then(|s| s.parse().ok()),
        calories: row.get(4)?,
        fiber_rich: row.get(5)?,
        dairy: row.get(6)?,
        gluten: row.get(7)?,
        spicy_level: row.get(8)?,
        meal_time: parse_datetime(&meal_time)?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl Database {
    /// Validate and insert a meal, returning its ID
    pub fn insert_meal(&self, meal: &NewMeal) -> Result<i64> {
        meal.validate()?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO meals (user_id, name, category, calories, fiber_rich, dairy, gluten, spicy_level, meal_time)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                meal.user_id,
                meal.name.trim(),
                meal.category.map(|c| c.as_str()),
                meal.calories,
                meal.fiber_rich,
                meal.dairy,
                meal.gluten,
                meal.spicy_level,
                format_datetime(&meal.meal_time),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn get_meal(&self, id: i64) -> Result<Option<Meal>> {
        let conn = self.conn()?;
        let meal = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                params![id],
                row_to_meal,
            )
            .optional()?;
        Ok(meal)
    }

    /// Meals eaten within `[start, end]`, oldest first
    pub fn list_meals_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Meal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? AND meal_time >= ? AND meal_time <= ? ORDER BY meal_time, id",
            SELECT_COLUMNS
        ))?;

        let meals = stmt
            .query_map(
                params![user_id, format_datetime(&start), format_datetime(&end)],
                row_to_meal,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    pub fn list_meals(&self, user_id: &str, limit: u32, offset: u32) -> Result<Vec<Meal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? ORDER BY meal_time DESC, id DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS
        ))?;

        let meals = stmt
            .query_map(params![user_id, limit, offset], row_to_meal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    pub fn delete_meal(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM meals WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
