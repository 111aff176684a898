use axum::extract::State;

use crate::db::{queries, AppState};
use crate::error::{msg, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::Plan;

/// Catalog view: all plans published by a creator.
pub async fn list_creator_plans(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Plan>>> {
    let conn = state.db.get()?;

    let creator = queries::get_profile_by_username(&conn, &username)?
        .or_not_found(msg::PROFILE_NOT_FOUND)?;

    let plans = queries::list_plans_by_creator(&conn, &creator.id)?;
    Ok(Json(plans))
}

pub async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<Plan>> {
    let conn = state.db.get()?;

    let plan = queries::get_plan_by_id(&conn, &plan_id)?.or_not_found(msg::PLAN_NOT_FOUND)?;
    Ok(Json(plan))
}
