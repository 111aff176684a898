use axum::{extract::State, Extension};
use serde::Deserialize;

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::gateway::{EsewaCheckoutRequest, EsewaClient, Gateway};
use crate::models::{Payment, Profile};

#[derive(Debug, Deserialize)]
pub struct InitiatePaymentRequest {
    pub plan_id: String,
    /// Defaults to eSewa, the only wired-up gateway
    #[serde(default)]
    pub gateway: Option<String>,
}

/// Create a payment intent: a pending Payment row plus the signed form
/// fields the buyer's browser posts to the gateway's hosted checkout.
///
/// The returned transaction id is exactly the one persisted, and the
/// signature already binds the amount, so neither can be forged after
/// the fact.
pub async fn initiate_payment(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<Json<EsewaCheckoutRequest>> {
    let gateway = match &request.gateway {
        Some(tag) => tag
            .parse::<Gateway>()
            .map_err(|_| AppError::UnsupportedGateway(tag.clone()))?,
        None => Gateway::Esewa,
    };

    // Reject before touching the store: no Payment row for a gateway we
    // cannot hand the buyer to.
    if gateway != Gateway::Esewa {
        return Err(AppError::UnsupportedGateway(gateway.to_string()));
    }

    let conn = state.db.get()?;

    let plan =
        queries::get_plan_by_id(&conn, &request.plan_id)?.or_not_found(msg::PLAN_NOT_FOUND)?;

    let payment = queries::create_payment(&conn, &profile.id, &plan.id, &plan.price, gateway)?;

    // Both outcomes land on the same reconciler; it decides from the
    // signed payload, not from which URL the gateway picked.
    let callback_url = format!("{}/webhook/esewa", state.base_url);

    let client = EsewaClient::new(state.esewa.clone());
    let checkout = client.checkout_request(
        &payment.amount,
        &payment.transaction_id,
        &callback_url,
        &callback_url,
    )?;

    tracing::info!(
        "Payment initiated: transaction_id={}, plan={}, amount={}",
        payment.transaction_id,
        plan.id,
        payment.amount
    );

    Ok(Json(checkout))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<String>,
) -> Result<Json<Payment>> {
    let conn = state.db.get()?;

    let payment = queries::get_payment_by_id(&conn, &id)?.or_not_found(msg::PAYMENT_NOT_FOUND)?;

    // Payments are only visible to their buyer
    if payment.buyer_id != profile.id {
        return Err(AppError::NotFound(msg::PAYMENT_NOT_FOUND.into()));
    }

    Ok(Json(payment))
}
