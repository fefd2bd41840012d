//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn bowel(user: &str, recorded_at: DateTime<Utc>) -> NewBowelMovement {
        NewBowelMovement {
            user_id: user.into(),
            bristol_type: 4,
            pain: 2,
            strain: 3,
            satisfaction: 8,
            notes: Some("morning".into()),
            recorded_at,
        }
    }

    fn meal(user: &str, meal_time: DateTime<Utc>) -> NewMeal {
        NewMeal {
            user_id: user.into(),
            name: "Lentil soup".into(),
            category: Some(MealCategory::Lunch),
            calories: 450,
            fiber_rich: true,
            dairy: false,
            gluten: false,
            spicy_level: Some(3),
            meal_time,
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        let counts = db.table_counts().unwrap();
        assert_eq!(counts.len(), 4);
        assert!(counts.iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn test_bowel_movement_crud() {
        let db = Database::in_memory().unwrap();

        let id = db.insert_bowel_movement(&bowel("u1", at(1, 8))).unwrap();
        assert!(id > 0);

        let stored = db.get_bowel_movement(id).unwrap().unwrap();
        assert_eq!(stored.bristol_type, 4);
        assert_eq!(stored.satisfaction, 8);
        assert_eq!(stored.notes.as_deref(), Some("morning"));
        assert_eq!(stored.recorded_at, at(1, 8));

        assert!(db.delete_bowel_movement(id).unwrap());
        assert!(db.get_bowel_movement(id).unwrap().is_none());
        assert!(!db.delete_bowel_movement(id).unwrap());
    }

    #[test]
    fn test_insert_rejects_invalid_record() {
        let db = Database::in_memory().unwrap();
        let mut bm = bowel("u1", at(1, 8));
        bm.bristol_type = 8;

        let err = db.insert_bowel_movement(&bm).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(db.table_counts().unwrap()[0].1, 0);
    }

    #[test]
    fn test_date_range_is_inclusive_and_per_user() {
        let db = Database::in_memory().unwrap();
        for day in 1..=5 {
            db.insert_bowel_movement(&bowel("u1", at(day, 8))).unwrap();
        }
        db.insert_bowel_movement(&bowel("u2", at(3, 8))).unwrap();

        let rows = db
            .list_bowel_movements_in_range("u1", at(2, 8), at(4, 8))
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].recorded_at, at(2, 8));
        assert_eq!(rows[2].recorded_at, at(4, 8));

        let other = db
            .list_bowel_movements_in_range("u2", at(1, 0), at(5, 23))
            .unwrap();
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_list_paginates_newest_first() {
        let db = Database::in_memory().unwrap();
        for day in 1..=5 {
            db.insert_meal(&meal("u1", at(day, 12))).unwrap();
        }

        let page = db.list_meals("u1", 2, 0).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].meal_time, at(5, 12));

        let page = db.list_meals("u1", 2, 4).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].meal_time, at(1, 12));
    }

    #[test]
    fn test_meal_round_trips_flags() {
        let db = Database::in_memory().unwrap();
        let mut new_meal = meal("u1", at(2, 19));
        new_meal.dairy = true;
        new_meal.spicy_level = None;
        new_meal.category = None;

        let id = db.insert_meal(&new_meal).unwrap();
        let stored = db.get_meal(id).unwrap().unwrap();
        assert!(stored.fiber_rich);
        assert!(stored.dairy);
        assert!(!stored.gluten);
        assert_eq!(stored.spicy_level, None);
        assert_eq!(stored.category, None);
        assert_eq!(stored.calories, 450);

        let in_range = db.list_meals_in_range("u1", at(2, 0), at(2, 23)).unwrap();
        assert_eq!(in_range.len(), 1);
    }

    #[test]
    fn test_symptom_triggers_normalized() {
        let db = Database::in_memory().unwrap();
        let id = db
            .insert_symptom(&NewSymptom {
                user_id: "u1".into(),
                name: "Bloating".into(),
                severity: 6,
                category: Some(SymptomCategory::Digestive),
                symptom_type: Some(SymptomType::Bloating),
                triggers: vec!["Coffee".into(), " coffee ".into(), "stress".into()],
                recorded_at: at(3, 15),
            })
            .unwrap();

        let stored = db.get_symptom(id).unwrap().unwrap();
        assert_eq!(stored.triggers, vec!["coffee", "stress"]);
        assert_eq!(stored.symptom_type, Some(SymptomType::Bloating));
        assert_eq!(stored.category, Some(SymptomCategory::Digestive));

        assert_eq!(db.list_symptoms("u1", 10, 0).unwrap().len(), 1);
        assert_eq!(
            db.list_symptoms_in_range("u1", at(1, 0), at(2, 0))
                .unwrap()
                .len(),
            0
        );
    }

    #[test]
    fn test_medication_lifecycle() {
        let db = Database::in_memory().unwrap();
        let start = at(1, 9);
        let id = db
            .insert_medication(&NewMedication {
                user_id: "u1".into(),
                name: "Psyllium husk".into(),
                dosage: Some("5g".into()),
                category: Some(MedicationCategory::Supplements),
                is_active: true,
                start_date: Some(start),
                end_date: Some(start + Duration::days(30)),
                taken_at: None,
            })
            .unwrap();

        let stored = db.get_medication(id).unwrap().unwrap();
        assert!(stored.is_active);
        assert_eq!(stored.start_date, Some(start));
        assert_eq!(stored.taken_at, None);
        assert_eq!(stored.category, Some(MedicationCategory::Supplements));

        assert!(db.deactivate_medication(id).unwrap());
        let meds = db.list_medications("u1", 100, 0).unwrap();
        assert_eq!(meds.len(), 1);
        assert!(!meds[0].is_active);

        assert!(db.delete_medication(id).unwrap());
        assert!(db.list_medications("u1", 100, 0).unwrap().is_empty());
    }

    #[test]
    fn test_encrypted_database_requires_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enc.db");
        let path = path.to_string_lossy();

        let db = Database::new_with_key(&path, Some("correct horse")).unwrap();
        db.insert_bowel_movement(&bowel("u1", at(1, 8))).unwrap();
        drop(db);

        let reopened = Database::new_with_key(&path, Some("correct horse")).unwrap();
        assert_eq!(reopened.table_counts().unwrap()[0].1, 1);

        assert!(Database::new_with_key(&path, Some("wrong")).is_err());
    }

    #[test]
    fn test_derive_key_is_stable() {
        let a = derive_key("secret").unwrap();
        let b = derive_key("secret").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, derive_key("other").unwrap());
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
