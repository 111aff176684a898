use axum::extract::State;
use serde::Serialize;

use crate::db::{queries, AppState};
use crate::error::Result;
use crate::extractors::Json;
use crate::models::{CreateProfile, Profile};

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub profile: Profile,
    /// Shown once at registration; sent as `Authorization: Bearer <key>`
    pub api_key: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateProfile>,
) -> Result<Json<RegisterResponse>> {
    let conn = state.db.get()?;

    let profile = queries::create_profile(&conn, &input)?;
    let api_key = profile.api_key.clone();

    tracing::info!("Registered profile {} ({})", profile.username, profile.id);

    Ok(Json(RegisterResponse { profile, api_key }))
}
