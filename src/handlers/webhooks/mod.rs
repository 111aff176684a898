mod esewa;

pub use esewa::{handle_esewa_callback, reconcile_esewa, ReconcileOutcome};

use axum::{routing::get, Router};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    // eSewa reports the result by redirecting the buyer's browser, so the
    // callback arrives as a GET with a base64 `data` query parameter.
    Router::new().route("/webhook/esewa", get(handle_esewa_callback))
}
