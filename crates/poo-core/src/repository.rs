//! Read-side repository traits consumed by the analytics engine
//!
//! The engine only needs ranged reads. `Database` implements every trait by
//! moving the blocking SQLite call onto tokio's blocking pool; tests swap in
//! `test_utils::MockStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{BowelMovement, Meal, Medication, Symptom};

#[async_trait]
pub trait BowelMovementRepository: Send + Sync {
    async fn get_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BowelMovement>>;
}

#[async_trait]
pub trait MealRepository: Send + Sync {
    async fn get_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Meal>>;
}

#[async_trait]
pub trait SymptomRepository: Send + Sync {
    async fn get_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Symptom>>;
}

#[async_trait]
pub trait MedicationRepository: Send + Sync {
    async fn get_by_user_id(&self, user_id: &str, limit: u32, offset: u32)
        -> Result<Vec<Medication>>;
}

/// Run a database call on the blocking pool
async fn blocking<T, F>(db: &Database, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Database) -> Result<T> + Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| Error::Task(e.to_string()))?
}

#[async_trait]
impl BowelMovementRepository for Database {
    async fn get_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BowelMovement>> {
        let user_id = user_id.to_string();
        blocking(self, move |db| {
            db.list_bowel_movements_in_range(&user_id, start, end)
        })
        .await
    }
}

#[async_trait]
impl MealRepository for Database {
    async fn get_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Meal>> {
        let user_id = user_id.to_string();
        blocking(self, move |db| db.list_meals_in_range(&user_id, start, end)).await
    }
}

#[async_trait]
impl SymptomRepository for Database {
    async fn get_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Symptom>> {
        let user_id = user_id.to_string();
        blocking(self, move |db| {
            db.list_symptoms_in_range(&user_id, start, end)
        })
        .await
    }
}

#[async_trait]
impl MedicationRepository for Database {
    async fn get_by_user_id(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Medication>> {
        let user_id = user_id.to_string();
        blocking(self, move |db| db.list_medications(&user_id, limit, offset)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewMeal;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_database_implements_repositories() {
        let db = Database::in_memory().unwrap();
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        db.insert_meal(&NewMeal {
            user_id: "u1".into(),
            name: "Toast".into(),
            category: None,
            calories: 200,
            fiber_rich: false,
            dairy: false,
            gluten: true,
            spicy_level: None,
            meal_time: t,
        })
        .unwrap();

        let meals = MealRepository::get_by_date_range(&db, "u1", t, t).await.unwrap();
        assert_eq!(meals.len(), 1);

        let bms = BowelMovementRepository::get_by_date_range(&db, "u1", t, t)
            .await
            .unwrap();
        assert!(bms.is_empty());

        let meds = db.get_by_user_id("u1", 100, 0).await.unwrap();
        assert!(meds.is_empty());
    }
}
