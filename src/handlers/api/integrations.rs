use axum::{extract::State, Extension};
use serde::Serialize;

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::{
    DiscordGrant, DiscordIntegration, LinkDiscord, LinkWhatsApp, Plan, Profile,
    WhatsAppIntegration,
};

/// Only the plan's creator may manage its integrations.
fn require_plan_owner(
    conn: &rusqlite::Connection,
    plan_id: &str,
    profile: &Profile,
) -> Result<Plan> {
    let plan = queries::get_plan_by_id(conn, plan_id)?.or_not_found(msg::PLAN_NOT_FOUND)?;
    if plan.creator_id != profile.id {
        return Err(AppError::Forbidden("Not your plan".into()));
    }
    Ok(plan)
}

pub async fn link_discord(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(input): Json<LinkDiscord>,
) -> Result<Json<DiscordIntegration>> {
    let conn = state.db.get()?;
    require_plan_owner(&conn, &input.plan_id, &profile)?;

    let integration = queries::link_discord(&conn, &input)?;
    tracing::info!("Discord linked to plan {}", input.plan_id);
    Ok(Json(integration))
}

pub async fn unlink_discord(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(plan_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    require_plan_owner(&conn, &plan_id, &profile)?;

    if !queries::unlink_discord(&conn, &plan_id)? {
        return Err(AppError::NotFound(msg::INTEGRATION_NOT_FOUND.into()));
    }
    Ok(Json(serde_json::json!({ "unlinked": true })))
}

#[derive(Debug, Serialize)]
pub struct SyncDiscordResponse {
    pub discord_id: Option<String>,
    pub grants: Vec<DiscordGrant>,
}

/// Routing signal for the Discord bot: which (guild, role) pairs the
/// caller is currently entitled to. The bot applies the grants; this
/// endpoint only reports them.
pub async fn sync_discord(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
) -> Result<Json<SyncDiscordResponse>> {
    let conn = state.db.get()?;

    let grants = queries::list_discord_grants(&conn, &profile.id, queries::now())?;
    Ok(Json(SyncDiscordResponse {
        discord_id: profile.discord_id.clone(),
        grants,
    }))
}

pub async fn link_whatsapp(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(input): Json<LinkWhatsApp>,
) -> Result<Json<WhatsAppIntegration>> {
    let conn = state.db.get()?;
    require_plan_owner(&conn, &input.plan_id, &profile)?;

    let integration = queries::link_whatsapp(&conn, &input)?;
    tracing::info!("WhatsApp linked to plan {}", input.plan_id);
    Ok(Json(integration))
}

pub async fn unlink_whatsapp(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(plan_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    require_plan_owner(&conn, &plan_id, &profile)?;

    if !queries::unlink_whatsapp(&conn, &plan_id)? {
        return Err(AppError::NotFound(msg::INTEGRATION_NOT_FOUND.into()));
    }
    Ok(Json(serde_json::json!({ "unlinked": true })))
}

#[derive(Debug, Serialize)]
pub struct WhatsAppInviteResponse {
    pub group_link: String,
}

/// The WhatsApp group invite for an active subscription. Gated on the
/// subscription belonging to the caller and still being current.
pub async fn get_whatsapp_invite(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(subscription_id): Path<String>,
) -> Result<Json<WhatsAppInviteResponse>> {
    let conn = state.db.get()?;

    let subscription = queries::get_subscription_by_id(&conn, &subscription_id)?
        .or_not_found(msg::SUBSCRIPTION_NOT_FOUND)?;

    if subscription.buyer_id != profile.id {
        return Err(AppError::NotFound(msg::SUBSCRIPTION_NOT_FOUND.into()));
    }
    if !subscription.is_current(queries::now()) {
        return Err(AppError::Forbidden("Subscription is not active".into()));
    }

    let integration = queries::get_whatsapp_integration(&conn, &subscription.plan_id)?
        .or_not_found(msg::INTEGRATION_NOT_FOUND)?;

    Ok(Json(WhatsAppInviteResponse {
        group_link: integration.group_link,
    }))
}
