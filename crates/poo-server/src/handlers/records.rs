//! Record logging handlers
//!
//! Raw records are written here and only read by the analytics engine.
//! The owning user comes from the `x-user-id` header unless the body names one.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::info;

use crate::{get_user_id, AppError, AppState, MAX_PAGE_LIMIT};
use poo_core::models::{
    BowelMovement, Meal, Medication, NewBowelMovement, NewMeal, NewMedication, NewSymptom, Symptom,
};

/// Largest accepted record body
const MAX_BODY_BYTES: usize = 1024 * 10;

/// Query parameters for listing records
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl ListQuery {
    /// Clamp pagination parameters
    fn bounds(&self) -> (u32, u32) {
        let limit = self.limit.clamp(1, MAX_PAGE_LIMIT as i64) as u32;
        let offset = self.offset.clamp(0, u32::MAX as i64) as u32;
        (limit, offset)
    }
}

/// Read the JSON body and the requesting user
async fn read_body<T: DeserializeOwned>(request: Request) -> Result<(String, T), AppError> {
    let user_id = get_user_id(request.headers());
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let body = serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))?;
    Ok((user_id, body))
}

fn fill_user(field: &mut String, user_id: String) {
    if field.trim().is_empty() {
        *field = user_id;
    }
}

/// POST /api/bowel-movements - Log a bowel movement
pub async fn create_bowel_movement(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<BowelMovement>), AppError> {
    let (user_id, mut req): (_, NewBowelMovement) = read_body(request).await?;
    fill_user(&mut req.user_id, user_id);

    let id = state
        .db
        .insert_bowel_movement(&req)
        .map_err(AppError::from_core)?;
    info!(id, "Logged bowel movement");

    let record = state
        .db
        .get_bowel_movement(id)?
        .ok_or_else(|| AppError::internal("Bowel movement not found after creation"))?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/bowel-movements - Most recent bowel movements first
pub async fn list_bowel_movements(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
    request: Request,
) -> Result<Json<Vec<BowelMovement>>, AppError> {
    let user_id = get_user_id(request.headers());
    let (limit, offset) = params.bounds();
    Ok(Json(state.db.list_bowel_movements(&user_id, limit, offset)?))
}

/// POST /api/meals - Log a meal
pub async fn create_meal(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Meal>), AppError> {
    let (user_id, mut req): (_, NewMeal) = read_body(request).await?;
    fill_user(&mut req.user_id, user_id);

    let id = state.db.insert_meal(&req).map_err(AppError::from_core)?;
    info!(id, "Logged meal");

    let record = state
        .db
        .get_meal(id)?
        .ok_or_else(|| AppError::internal("Meal not found after creation"))?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/meals - Most recent meals first
pub async fn list_meals(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
    request: Request,
) -> Result<Json<Vec<Meal>>, AppError> {
    let user_id = get_user_id(request.headers());
    let (limit, offset) = params.bounds();
    Ok(Json(state.db.list_meals(&user_id, limit, offset)?))
}

/// POST /api/symptoms - Log a symptom
pub async fn create_symptom(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Symptom>), AppError> {
    let (user_id, mut req): (_, NewSymptom) = read_body(request).await?;
    fill_user(&mut req.user_id, user_id);

    let id = state.db.insert_symptom(&req).map_err(AppError::from_core)?;
    info!(id, "Logged symptom");

    let record = state
        .db
        .get_symptom(id)?
        .ok_or_else(|| AppError::internal("Symptom not found after creation"))?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/symptoms - Most recent symptoms first
pub async fn list_symptoms(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
    request: Request,
) -> Result<Json<Vec<Symptom>>, AppError> {
    let user_id = get_user_id(request.headers());
    let (limit, offset) = params.bounds();
    Ok(Json(state.db.list_symptoms(&user_id, limit, offset)?))
}

/// POST /api/medications - Record a medication
pub async fn create_medication(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Medication>), AppError> {
    let (user_id, mut req): (_, NewMedication) = read_body(request).await?;
    fill_user(&mut req.user_id, user_id);

    let id = state
        .db
        .insert_medication(&req)
        .map_err(AppError::from_core)?;
    info!(id, "Recorded medication");

    let record = state
        .db
        .get_medication(id)?
        .ok_or_else(|| AppError::internal("Medication not found after creation"))?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/medications - Newest medications first
pub async fn list_medications(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
    request: Request,
) -> Result<Json<Vec<Medication>>, AppError> {
    let user_id = get_user_id(request.headers());
    let (limit, offset) = params.bounds();
    Ok(Json(state.db.list_medications(&user_id, limit, offset)?))
}
