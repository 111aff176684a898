use axum::{extract::State, Extension};

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::{CreatePlan, Plan, Profile};

pub async fn create_plan(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(input): Json<CreatePlan>,
) -> Result<Json<Plan>> {
    if !profile.is_creator {
        return Err(AppError::Forbidden("Only creators can publish plans".into()));
    }
    if input.price.is_sign_negative() || input.price.is_zero() {
        return Err(AppError::BadRequest("Price must be positive".into()));
    }

    let conn = state.db.get()?;
    let plan = queries::create_plan(&conn, &profile.id, &input)?;

    tracing::info!("Plan created: {} by {}", plan.id, profile.username);

    Ok(Json(plan))
}
