use axum::{extract::State, Extension};

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::{Profile, Subscription};

pub async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
) -> Result<Json<Vec<Subscription>>> {
    let conn = state.db.get()?;
    let subs = queries::list_subscriptions_for_buyer(&conn, &profile.id)?;
    Ok(Json(subs))
}

/// Buyer-initiated cancel. Deactivates the row; a later successful
/// payment for the same plan re-activates it in place.
pub async fn cancel_subscription(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<String>,
) -> Result<Json<Subscription>> {
    let conn = state.db.get()?;

    let subscription = queries::get_subscription_by_id(&conn, &id)?
        .or_not_found(msg::SUBSCRIPTION_NOT_FOUND)?;

    if subscription.buyer_id != profile.id {
        return Err(AppError::NotFound(msg::SUBSCRIPTION_NOT_FOUND.into()));
    }

    queries::deactivate_subscription(&conn, &subscription.id)?;

    let updated = queries::get_subscription_by_id(&conn, &subscription.id)?
        .or_not_found(msg::SUBSCRIPTION_NOT_FOUND)?;
    Ok(Json(updated))
}
