mod integrations;
mod payments;
mod plans;
mod subscriptions;

pub use integrations::*;
pub use payments::*;
pub use plans::*;
pub use subscriptions::*;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Extension, Router,
};

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::middleware::profile_auth;
use crate::models::Profile;

async fn me(Extension(profile): Extension<Profile>) -> Result<Json<Profile>> {
    Ok(Json(profile))
}

/// Routes requiring a bearer API key. The profile_auth middleware resolves
/// the caller's profile and attaches it as an extension.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/plans", post(create_plan))
        .route("/subscriptions", get(list_subscriptions))
        .route("/subscriptions/{id}", delete(cancel_subscription))
        .route("/payments/initiate", post(initiate_payment))
        .route("/payments/{id}", get(get_payment))
        .route("/integrations/discord/link", post(link_discord))
        .route("/integrations/discord/sync", post(sync_discord))
        .route("/integrations/discord/{plan_id}", delete(unlink_discord))
        .route("/integrations/whatsapp/link", post(link_whatsapp))
        .route("/integrations/whatsapp/{plan_id}", delete(unlink_whatsapp))
        .route("/integrations/whatsapp/invite/{subscription_id}", get(get_whatsapp_invite))
        .layer(from_fn_with_state(state, profile_auth))
}
