use axum::extract::State;

use crate::db::{queries, AppState};
use crate::error::{msg, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::Profile;

/// Public profile lookup. The API key is never serialized, so this is
/// safe to expose unauthenticated.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Profile>> {
    let conn = state.db.get()?;

    let profile = queries::get_profile_by_username(&conn, &username)?
        .or_not_found(msg::PROFILE_NOT_FOUND)?;
    Ok(Json(profile))
}
