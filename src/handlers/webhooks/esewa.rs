//! eSewa result callback reconciliation.
//!
//! The gateway redirects here after checkout with an encoded result blob.
//! Reconciliation matches the blob to the pending Payment it settles and
//! applies the state transition exactly once: verify the response
//! signature, look up the payment, compare-and-swap it out of `pending`,
//! and activate the subscription on success. Replays and concurrent
//! duplicates are no-ops.
//!
//! The caller is an external gateway (or the buyer's browser), so this
//! endpoint never returns an error body - every path ends in a redirect
//! to the success or failure landing page.

use axum::{extract::State, response::Redirect};
use rusqlite::Connection;
use serde::Deserialize;

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::extractors::Query;
use crate::gateway::EsewaClient;
use crate::models::PaymentStatus;

/// Status value eSewa reports for a settled, successful transaction.
const STATUS_COMPLETE: &str = "COMPLETE";

#[derive(Debug, Deserialize)]
pub struct EsewaCallbackQuery {
    /// Absent on some gateway failure redirects; treated as a failed
    /// payment rather than a client error.
    pub data: Option<String>,
}

/// Outcome of one reconciliation attempt. `Activated` and `Failed` mean
/// this call performed the transition; everything else was a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Payment completed and the subscription was activated/renewed
    Activated {
        payment_id: String,
        subscription_id: String,
    },
    /// Payment transitioned to failed; no subscription side effect
    Failed { payment_id: String },
    /// Replayed callback for a payment already in a terminal state
    AlreadySettled(PaymentStatus),
    /// No pending payment matches the transaction id
    UnknownTransaction,
    /// Response signature missing or wrong; status field not trusted
    BadSignature,
    /// Blob was not decodable base64 JSON with the required fields
    Malformed,
}

impl ReconcileOutcome {
    /// The routing signal: should the buyer land on the success page?
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Activated { .. } | Self::AlreadySettled(PaymentStatus::Completed)
        )
    }
}

/// Reconcile one callback blob against the payment ledger.
///
/// Returns `Err` only for store failures; every gateway-facing anomaly
/// (garbage input, bad signature, unknown transaction, replay) maps to a
/// deterministic outcome instead.
pub fn reconcile_esewa(
    conn: &Connection,
    client: &EsewaClient,
    data: &str,
) -> Result<ReconcileOutcome> {
    let callback = match EsewaClient::decode_callback(data) {
        Ok(cb) => cb,
        Err(e) => {
            tracing::warn!("Malformed eSewa callback: {}", e);
            return Ok(ReconcileOutcome::Malformed);
        }
    };

    // Verify authenticity before trusting anything in the payload. The
    // status field alone proves nothing - anyone can base64 a JSON blob.
    if !client.verify_callback(&callback)? {
        tracing::warn!(
            "eSewa callback with bad signature for transaction_uuid={}",
            callback.transaction_uuid
        );
        return Ok(ReconcileOutcome::BadSignature);
    }

    let payment = match queries::get_payment_by_transaction_id(conn, &callback.transaction_uuid)? {
        Some(p) => p,
        None => {
            // A signed callback for a transaction we never issued is
            // suspicious, not just a client error.
            tracing::warn!(
                "eSewa callback for unknown transaction_uuid={}",
                callback.transaction_uuid
            );
            return Ok(ReconcileOutcome::UnknownTransaction);
        }
    };

    // Idempotency: a replayed callback for a settled payment returns the
    // recorded outcome without re-applying side effects.
    if payment.status.is_terminal() {
        return Ok(ReconcileOutcome::AlreadySettled(payment.status));
    }

    if callback.status == STATUS_COMPLETE {
        if !queries::try_settle_payment(conn, &payment.transaction_id, PaymentStatus::Completed)? {
            // Lost the race against a concurrent callback; report what the
            // winner recorded.
            return already_settled(conn, &payment.transaction_id);
        }

        let plan = queries::get_plan_by_id(conn, &payment.plan_id)?.ok_or_else(|| {
            AppError::Internal(format!(
                "Payment {} references missing plan {}",
                payment.id, payment.plan_id
            ))
        })?;

        let until = queries::now() + plan.interval.renewal_days() * 86400;
        let subscription =
            queries::activate_subscription(conn, &payment.buyer_id, &payment.plan_id, until)?;

        tracing::info!(
            "Payment completed: transaction_uuid={}, subscription={} active until {}",
            payment.transaction_id,
            subscription.id,
            until
        );

        Ok(ReconcileOutcome::Activated {
            payment_id: payment.id,
            subscription_id: subscription.id,
        })
    } else {
        if !queries::try_settle_payment(conn, &payment.transaction_id, PaymentStatus::Failed)? {
            return already_settled(conn, &payment.transaction_id);
        }

        tracing::info!(
            "Payment failed: transaction_uuid={}, gateway status={}",
            payment.transaction_id,
            callback.status
        );

        Ok(ReconcileOutcome::Failed {
            payment_id: payment.id,
        })
    }
}

fn already_settled(conn: &Connection, transaction_id: &str) -> Result<ReconcileOutcome> {
    let payment = queries::get_payment_by_transaction_id(conn, transaction_id)?.ok_or_else(|| {
        AppError::Internal(format!(
            "Payment {} vanished after losing the settlement race",
            transaction_id
        ))
    })?;
    Ok(ReconcileOutcome::AlreadySettled(payment.status))
}

pub async fn handle_esewa_callback(
    State(state): State<AppState>,
    Query(query): Query<EsewaCallbackQuery>,
) -> Redirect {
    let data = match query.data {
        Some(data) => data,
        None => {
            tracing::warn!("eSewa callback arrived without a data parameter");
            return Redirect::temporary(&state.failure_page_url);
        }
    };

    let conn = match state.db.get() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("DB connection error during callback: {}", e);
            return Redirect::temporary(&state.failure_page_url);
        }
    };

    let client = EsewaClient::new(state.esewa.clone());

    match reconcile_esewa(&conn, &client, &data) {
        Ok(outcome) if outcome.is_success() => Redirect::temporary(&state.success_page_url),
        Ok(_) => Redirect::temporary(&state.failure_page_url),
        Err(e) => {
            tracing::error!("Reconciliation error: {}", e);
            Redirect::temporary(&state.failure_page_url)
        }
    }
}
