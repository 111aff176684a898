mod plans;
mod profiles;
mod register;

pub use plans::*;
pub use profiles::*;
pub use register::*;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/creators/{username}", get(get_profile))
        .route("/creators/{username}/plans", get(list_creator_plans))
        .route("/plans/{plan_id}", get(get_plan))
}
