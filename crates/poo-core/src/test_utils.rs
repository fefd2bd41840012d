//! Test utilities for poo-core
//!
//! Record fixtures plus an in-memory [`MockStore`] implementing every
//! repository trait, with call counting, failure injection and latency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::models::{
    BowelMovement, Meal, Medication, MedicationCategory, Symptom, SymptomCategory,
};
use crate::repository::{
    BowelMovementRepository, MealRepository, MedicationRepository, SymptomRepository,
};

/// User every fixture belongs to
pub const TEST_USER: &str = "local";

/// Fixed reference time: 2025-03-01 08:00 UTC
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
}

/// Bowel movement with full control over the scales
pub fn bowel(
    at: DateTime<Utc>,
    bristol_type: u8,
    pain: u8,
    strain: u8,
    satisfaction: u8,
) -> BowelMovement {
    BowelMovement {
        id: 0,
        user_id: TEST_USER.to_string(),
        bristol_type,
        pain,
        strain,
        satisfaction,
        notes: None,
        recorded_at: at,
        created_at: at,
    }
}

/// Comfortable bowel movement of the given Bristol type
pub fn bowel_at(at: DateTime<Utc>, bristol_type: u8) -> BowelMovement {
    bowel(at, bristol_type, 1, 1, 8)
}

pub fn meal_at(at: DateTime<Utc>, calories: u32, fiber_rich: bool) -> Meal {
    Meal {
        id: 0,
        user_id: TEST_USER.to_string(),
        name: "Test meal".to_string(),
        category: None,
        calories,
        fiber_rich,
        dairy: false,
        gluten: false,
        spicy_level: None,
        meal_time: at,
        created_at: at,
    }
}

pub fn symptom_at(at: DateTime<Utc>, severity: u8) -> Symptom {
    Symptom {
        id: 0,
        user_id: TEST_USER.to_string(),
        name: "Test symptom".to_string(),
        severity,
        category: Some(SymptomCategory::Digestive),
        symptom_type: None,
        triggers: vec![],
        recorded_at: at,
        created_at: at,
    }
}

/// Active supplement started at `start`
pub fn medication(name: &str, start: DateTime<Utc>) -> Medication {
    Medication {
        id: 0,
        user_id: TEST_USER.to_string(),
        name: name.to_string(),
        dosage: None,
        category: Some(MedicationCategory::Supplements),
        is_active: true,
        start_date: Some(start),
        end_date: None,
        taken_at: None,
        created_at: start,
    }
}

/// Which collection a [`MockStore`] should fail to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    BowelMovements,
    Meals,
    Symptoms,
    Medications,
}

/// In-memory repositories for service tests
#[derive(Default)]
pub struct MockStore {
    bowel_movements: Vec<BowelMovement>,
    meals: Vec<Meal>,
    symptoms: Vec<Symptom>,
    medications: Vec<Medication>,
    failing: Option<Collection>,
    delay: Option<StdDuration>,
    calls: [AtomicUsize; 4],
    medication_query: Mutex<Option<(u32, u32)>>,
}

impl MockStore {
    pub fn with_bowel_movements(mut self, records: Vec<BowelMovement>) -> Self {
        self.bowel_movements = records;
        self
    }

    pub fn with_meals(mut self, records: Vec<Meal>) -> Self {
        self.meals = records;
        self
    }

    pub fn with_symptoms(mut self, records: Vec<Symptom>) -> Self {
        self.symptoms = records;
        self
    }

    pub fn with_medications(mut self, records: Vec<Medication>) -> Self {
        self.medications = records;
        self
    }

    /// Make every fetch of `collection` fail
    pub fn failing(mut self, collection: Collection) -> Self {
        self.failing = Some(collection);
        self
    }

    /// Sleep this long before answering any fetch
    pub fn with_delay(mut self, delay: StdDuration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of repository calls made so far, across all collections
    pub fn calls(&self) -> usize {
        self.calls.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    pub fn calls_to(&self, collection: Collection) -> usize {
        self.calls[collection as usize].load(Ordering::SeqCst)
    }

    /// `(limit, offset)` of the last medication fetch
    pub fn medication_query(&self) -> Option<(u32, u32)> {
        *self.medication_query.lock().unwrap()
    }

    async fn enter(&self, collection: Collection) -> Result<()> {
        self.calls[collection as usize].fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing == Some(collection) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "mock store unavailable",
            )));
        }
        Ok(())
    }
}

fn in_range<T: Clone>(
    records: &[T],
    user_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    key: impl Fn(&T) -> (&str, DateTime<Utc>),
) -> Vec<T> {
    records
        .iter()
        .filter(|r| {
            let (owner, at) = key(*r);
            owner == user_id && at >= start && at <= end
        })
        .cloned()
        .collect()
}

#[async_trait]
impl BowelMovementRepository for MockStore {
    async fn get_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BowelMovement>> {
        self.enter(Collection::BowelMovements).await?;
        Ok(in_range(&self.bowel_movements, user_id, start, end, |m| {
            (m.user_id.as_str(), m.recorded_at)
        }))
    }
}

#[async_trait]
impl MealRepository for MockStore {
    async fn get_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Meal>> {
        self.enter(Collection::Meals).await?;
        Ok(in_range(&self.meals, user_id, start, end, |m| {
            (m.user_id.as_str(), m.meal_time)
        }))
    }
}

#[async_trait]
impl SymptomRepository for MockStore {
    async fn get_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Symptom>> {
        self.enter(Collection::Symptoms).await?;
        Ok(in_range(&self.symptoms, user_id, start, end, |s| {
            (s.user_id.as_str(), s.recorded_at)
        }))
    }
}

#[async_trait]
impl MedicationRepository for MockStore {
    async fn get_by_user_id(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Medication>> {
        *self.medication_query.lock().unwrap() = Some((limit, offset));
        self.enter(Collection::Medications).await?;
        Ok(self
            .medications
            .iter()
            .filter(|m| m.user_id == user_id)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
