//! Record logging commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use poo_core::db::Database;
use poo_core::models::{
    MealCategory, MedicationCategory, NewBowelMovement, NewMeal, NewMedication, NewSymptom,
    SymptomCategory, SymptomType,
};

pub struct BowelArgs {
    pub bristol_type: u8,
    pub pain: u8,
    pub strain: u8,
    pub satisfaction: u8,
    pub notes: Option<String>,
    pub at: DateTime<Utc>,
}

pub fn cmd_log_bowel(db: &Database, user: &str, args: BowelArgs) -> Result<i64> {
    let id = db
        .insert_bowel_movement(&NewBowelMovement {
            user_id: user.to_string(),
            bristol_type: args.bristol_type,
            pain: args.pain,
            strain: args.strain,
            satisfaction: args.satisfaction,
            notes: args.notes,
            recorded_at: args.at,
        })
        .context("Failed to log bowel movement")?;
    debug!(id, user, "Inserted bowel movement");

    println!(
        "💩 Logged bowel movement #{} (Bristol type {}) at {}",
        id,
        args.bristol_type,
        args.at.format("%Y-%m-%d %H:%M")
    );
    Ok(id)
}

pub struct MealArgs {
    pub name: String,
    pub category: Option<MealCategory>,
    pub calories: u32,
    pub fiber_rich: bool,
    pub dairy: bool,
    pub gluten: bool,
    pub spicy_level: Option<u8>,
    pub at: DateTime<Utc>,
}

pub fn cmd_log_meal(db: &Database, user: &str, args: MealArgs) -> Result<i64> {
    let id = db
        .insert_meal(&NewMeal {
            user_id: user.to_string(),
            name: args.name.clone(),
            category: args.category,
            calories: args.calories,
            fiber_rich: args.fiber_rich,
            dairy: args.dairy,
            gluten: args.gluten,
            spicy_level: args.spicy_level,
            meal_time: args.at,
        })
        .context("Failed to log meal")?;
    debug!(id, user, "Inserted meal");

    let mut tags = Vec::new();
    if args.fiber_rich {
        tags.push("fiber");
    }
    if args.dairy {
        tags.push("dairy");
    }
    if args.gluten {
        tags.push("gluten");
    }
    if args.spicy_level.is_some() {
        tags.push("spicy");
    }

    print!("🍽️  Logged meal #{}: {}", id, args.name);
    if !tags.is_empty() {
        print!(" [{}]", tags.join(", "));
    }
    println!();
    Ok(id)
}

pub struct SymptomArgs {
    pub name: String,
    pub severity: u8,
    pub category: Option<SymptomCategory>,
    pub symptom_type: Option<SymptomType>,
    pub triggers: Vec<String>,
    pub at: DateTime<Utc>,
}

pub fn cmd_log_symptom(db: &Database, user: &str, args: SymptomArgs) -> Result<i64> {
    let triggers: Vec<String> = args
        .triggers
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let id = db
        .insert_symptom(&NewSymptom {
            user_id: user.to_string(),
            name: args.name.clone(),
            severity: args.severity,
            category: args.category,
            symptom_type: args.symptom_type,
            triggers,
            recorded_at: args.at,
        })
        .context("Failed to log symptom")?;
    debug!(id, user, "Inserted symptom");

    println!(
        "🤢 Logged symptom #{}: {} (severity {}/10)",
        id, args.name, args.severity
    );
    Ok(id)
}

pub struct MedicationArgs {
    pub name: String,
    pub dosage: Option<String>,
    pub category: Option<MedicationCategory>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub active: bool,
}

pub fn cmd_log_medication(db: &Database, user: &str, args: MedicationArgs) -> Result<i64> {
    let id = db
        .insert_medication(&NewMedication {
            user_id: user.to_string(),
            name: args.name.clone(),
            dosage: args.dosage,
            category: args.category,
            is_active: args.active,
            start_date: Some(args.start),
            end_date: args.end,
            taken_at: None,
        })
        .context("Failed to record medication")?;
    debug!(id, user, "Inserted medication");

    let state = if args.active { "active" } else { "inactive" };
    println!("💊 Recorded medication #{}: {} ({})", id, args.name, state);
    Ok(id)
}
