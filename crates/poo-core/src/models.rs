//! Domain models for poo-tracker
//!
//! Raw records are written by the CRUD layer (CLI, HTTP API) and only read
//! by the analytics engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;

/// A logged bowel movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BowelMovement {
    pub id: i64,
    pub user_id: String,
    /// Bristol Stool Scale type, 1-7
    pub bristol_type: u8,
    /// 1-10
    pub pain: u8,
    /// 1-10
    pub strain: u8,
    /// 1-10
    pub satisfaction: u8,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// New bowel movement for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBowelMovement {
    /// Filled from the request context when omitted
    #[serde(default)]
    pub user_id: String,
    pub bristol_type: u8,
    pub pain: u8,
    pub strain: u8,
    pub satisfaction: u8,
    #[serde(default)]
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl NewBowelMovement {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_user(&mut errors, &self.user_id);
        errors.check_range("bristol_type", self.bristol_type.into(), 1, 7);
        errors.check_range("pain", self.pain.into(), 1, 10);
        errors.check_range("strain", self.strain.into(), 1, 10);
        errors.check_range("satisfaction", self.satisfaction.into(), 1, 10);
        errors.into_result()
    }
}

/// Meal category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "BREAKFAST",
            Self::Lunch => "LUNCH",
            Self::Dinner => "DINNER",
            Self::Snack => "SNACK",
        }
    }
}

impl std::str::FromStr for MealCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BREAKFAST" => Ok(Self::Breakfast),
            "LUNCH" => Ok(Self::Lunch),
            "DINNER" => Ok(Self::Dinner),
            "SNACK" => Ok(Self::Snack),
            _ => Err(format!("Unknown meal category: {}", s)),
        }
    }
}

impl std::fmt::Display for MealCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A logged meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub category: Option<MealCategory>,
    pub calories: u32,
    pub fiber_rich: bool,
    pub dairy: bool,
    pub gluten: bool,
    /// 1-10 when recorded
    pub spicy_level: Option<u8>,
    pub meal_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// New meal for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMeal {
    /// Filled from the request context when omitted
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<MealCategory>,
    #[serde(default)]
    pub calories: u32,
    #[serde(default)]
    pub fiber_rich: bool,
    #[serde(default)]
    pub dairy: bool,
    #[serde(default)]
    pub gluten: bool,
    #[serde(default)]
    pub spicy_level: Option<u8>,
    pub meal_time: DateTime<Utc>,
}

impl NewMeal {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_user(&mut errors, &self.user_id);
        if self.name.trim().is_empty() {
            errors.add("name", "must not be empty");
        }
        if let Some(level) = self.spicy_level {
            errors.check_range("spicy_level", level.into(), 1, 10);
        }
        errors.into_result()
    }
}

/// Body region or system a symptom belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymptomCategory {
    Digestive,
    Abdominal,
    Systemic,
    Neurological,
    Other,
}

impl SymptomCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Digestive => "DIGESTIVE",
            Self::Abdominal => "ABDOMINAL",
            Self::Systemic => "SYSTEMIC",
            Self::Neurological => "NEUROLOGICAL",
            Self::Other => "OTHER",
        }
    }
}

impl std::str::FromStr for SymptomCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DIGESTIVE" => Ok(Self::Digestive),
            "ABDOMINAL" => Ok(Self::Abdominal),
            "SYSTEMIC" => Ok(Self::Systemic),
            "NEUROLOGICAL" => Ok(Self::Neurological),
            "OTHER" => Ok(Self::Other),
            _ => Err(format!("Unknown symptom category: {}", s)),
        }
    }
}

impl std::fmt::Display for SymptomCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Specific kind of symptom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymptomType {
    Bloating,
    Cramps,
    Nausea,
    Heartburn,
    Constipation,
    Diarrhea,
    Gas,
    Fatigue,
    Other,
}

impl SymptomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bloating => "BLOATING",
            Self::Cramps => "CRAMPS",
            Self::Nausea => "NAUSEA",
            Self::Heartburn => "HEARTBURN",
            Self::Constipation => "CONSTIPATION",
            Self::Diarrhea => "DIARRHEA",
            Self::Gas => "GAS",
            Self::Fatigue => "FATIGUE",
            Self::Other => "OTHER",
        }
    }
}

impl std::str::FromStr for SymptomType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BLOATING" => Ok(Self::Bloating),
            "CRAMPS" => Ok(Self::Cramps),
            "NAUSEA" => Ok(Self::Nausea),
            "HEARTBURN" => Ok(Self::Heartburn),
            "CONSTIPATION" => Ok(Self::Constipation),
            "DIARRHEA" => Ok(Self::Diarrhea),
            "GAS" => Ok(Self::Gas),
            "FATIGUE" => Ok(Self::Fatigue),
            "OTHER" => Ok(Self::Other),
            _ => Err(format!("Unknown symptom type: {}", s)),
        }
    }
}

impl std::fmt::Display for SymptomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A logged symptom
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symptom {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    /// 1-10
    pub severity: u8,
    pub category: Option<SymptomCategory>,
    #[serde(rename = "type")]
    pub symptom_type: Option<SymptomType>,
    /// Free-form triggers the user suspects (e.g. "coffee", "stress")
    pub triggers: Vec<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// New symptom for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSymptom {
    /// Filled from the request context when omitted
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    pub severity: u8,
    #[serde(default)]
    pub category: Option<SymptomCategory>,
    #[serde(default, rename = "type")]
    pub symptom_type: Option<SymptomType>,
    #[serde(default)]
    pub triggers: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

impl NewSymptom {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_user(&mut errors, &self.user_id);
        if self.name.trim().is_empty() {
            errors.add("name", "must not be empty");
        }
        errors.check_range("severity", self.severity.into(), 1, 10);
        if self.triggers.iter().any(|t| t.trim().is_empty()) {
            errors.add("triggers", "must not contain empty entries");
        }
        errors.into_result()
    }
}

/// Medication class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MedicationCategory {
    Gastrointestinal,
    PainRelief,
    Antibiotic,
    Probiotics,
    Supplements,
    AntiInflammatory,
    Other,
}

impl MedicationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gastrointestinal => "GASTROINTESTINAL",
            Self::PainRelief => "PAIN_RELIEF",
            Self::Antibiotic => "ANTIBIOTIC",
            Self::Probiotics => "PROBIOTICS",
            Self::Supplements => "SUPPLEMENTS",
            Self::AntiInflammatory => "ANTI_INFLAMMATORY",
            Self::Other => "OTHER",
        }
    }
}

impl std::str::FromStr for MedicationCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "GASTROINTESTINAL" => Ok(Self::Gastrointestinal),
            "PAIN_RELIEF" => Ok(Self::PainRelief),
            "ANTIBIOTIC" => Ok(Self::Antibiotic),
            "PROBIOTICS" => Ok(Self::Probiotics),
            "SUPPLEMENTS" => Ok(Self::Supplements),
            "ANTI_INFLAMMATORY" => Ok(Self::AntiInflammatory),
            "OTHER" => Ok(Self::Other),
            _ => Err(format!("Unknown medication category: {}", s)),
        }
    }
}

impl std::fmt::Display for MedicationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A medication the user takes or has taken
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub dosage: Option<String>,
    pub category: Option<MedicationCategory>,
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Last dose, for as-needed medications
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Medication {
    /// Active flag set and not past its end date
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.end_date.map_or(true, |end| end > now)
    }
}

/// New medication for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedication {
    /// Filled from the request context when omitted
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub category: Option<MedicationCategory>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl NewMedication {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_user(&mut errors, &self.user_id);
        if self.name.trim().is_empty() {
            errors.add("name", "must not be empty");
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                errors.add("end_date", "must not be before start_date");
            }
        }
        errors.into_result()
    }
}

fn validate_user(errors: &mut ValidationErrors, user_id: &str) {
    if user_id.trim().is_empty() {
        errors.add("user_id", "must not be empty");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_bowel_movement_validation_collects_all_errors() {
        let bm = NewBowelMovement {
            user_id: "u1".into(),
            bristol_type: 9,
            pain: 0,
            strain: 5,
            satisfaction: 11,
            notes: None,
            recorded_at: ts(),
        };
        let errors = bm.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.to_string().starts_with("bristol_type:"));
    }

    #[test]
    fn test_meal_spicy_level_optional() {
        let mut meal = NewMeal {
            user_id: "u1".into(),
            name: "Oatmeal".into(),
            category: Some(MealCategory::Breakfast),
            calories: 350,
            fiber_rich: true,
            dairy: false,
            gluten: true,
            spicy_level: None,
            meal_time: ts(),
        };
        assert!(meal.validate().is_ok());

        meal.spicy_level = Some(11);
        assert!(meal.validate().is_err());
    }

    #[test]
    fn test_medication_end_before_start() {
        let med = NewMedication {
            user_id: "u1".into(),
            name: "Loperamide".into(),
            dosage: None,
            category: Some(MedicationCategory::Gastrointestinal),
            is_active: true,
            start_date: Some(ts()),
            end_date: Some(ts() - Duration::days(1)),
            taken_at: None,
        };
        let errors = med.validate().unwrap_err();
        assert_eq!(errors.errors()[0].field, "end_date");
    }

    #[test]
    fn test_medication_is_current() {
        let now = ts();
        let mut med = Medication {
            id: 1,
            user_id: "u1".into(),
            name: "Psyllium".into(),
            dosage: None,
            category: Some(MedicationCategory::Supplements),
            is_active: true,
            start_date: None,
            end_date: None,
            taken_at: None,
            created_at: now,
        };
        assert!(med.is_current(now));

        med.end_date = Some(now - Duration::hours(1));
        assert!(!med.is_current(now));

        med.end_date = None;
        med.is_active = false;
        assert!(!med.is_current(now));
    }

    #[test]
    fn test_enum_round_trip_strings() {
        assert_eq!(
            "pain_relief".parse::<MedicationCategory>().unwrap(),
            MedicationCategory::PainRelief
        );
        assert_eq!("snack".parse::<MealCategory>().unwrap(), MealCategory::Snack);
        assert_eq!(SymptomType::Heartburn.to_string(), "HEARTBURN");
        assert!("SOMETHING".parse::<SymptomCategory>().is_err());
    }
}
