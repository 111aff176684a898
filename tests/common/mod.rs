//! Test utilities and fixtures for CreatorPay integration tests

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rusqlite::Connection;

pub use creatorpay::db::{init_db, queries};
pub use creatorpay::gateway::{EsewaClient, EsewaConfig, Gateway};
pub use creatorpay::models::*;

/// eSewa sandbox credentials (public test values from the gateway docs)
pub const TEST_SECRET_KEY: &str = "8gBm/:&EnhH.1/q";
pub const TEST_PRODUCT_CODE: &str = "EPAYTEST";

pub fn test_esewa_config() -> EsewaConfig {
    EsewaConfig {
        secret_key: TEST_SECRET_KEY.to_string(),
        product_code: TEST_PRODUCT_CODE.to_string(),
        checkout_url: "https://rc-epay.esewa.com.np/api/epay/main/v2/form".to_string(),
    }
}

pub fn test_esewa_client() -> EsewaClient {
    EsewaClient::new(test_esewa_config())
}

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

pub fn create_test_profile(conn: &Connection, username: &str, is_creator: bool) -> Profile {
    let input = CreateProfile {
        username: username.to_string(),
        phone_number: "9800000000".to_string(),
        discord_id: None,
        is_creator,
    };
    queries::create_profile(conn, &input).expect("Failed to create test profile")
}

pub fn create_test_plan(
    conn: &Connection,
    creator_id: &str,
    name: &str,
    interval: PlanInterval,
) -> Plan {
    let input = CreatePlan {
        name: name.to_string(),
        bio: "test plan".to_string(),
        price: "100".parse().expect("valid price"),
        interval,
    };
    queries::create_plan(conn, creator_id, &input).expect("Failed to create test plan")
}

pub fn create_test_payment(conn: &Connection, buyer_id: &str, plan: &Plan) -> Payment {
    queries::create_payment(conn, buyer_id, &plan.id, &plan.price, Gateway::Esewa)
        .expect("Failed to create test payment")
}

/// Build a correctly signed callback blob the way the gateway would:
/// base64 JSON whose signature covers the fields it lists in
/// `signed_field_names`.
pub fn signed_callback_data(
    client: &EsewaClient,
    transaction_uuid: &str,
    status: &str,
    total_amount: &str,
) -> String {
    let signed_field_names =
        "transaction_code,status,total_amount,transaction_uuid,product_code,signed_field_names";
    let signature = client
        .sign(&[
            ("transaction_code", "000ABC"),
            ("status", status),
            ("total_amount", total_amount),
            ("transaction_uuid", transaction_uuid),
            ("product_code", TEST_PRODUCT_CODE),
            ("signed_field_names", signed_field_names),
        ])
        .expect("signing should succeed");

    let payload = serde_json::json!({
        "transaction_code": "000ABC",
        "status": status,
        "total_amount": total_amount,
        "transaction_uuid": transaction_uuid,
        "product_code": TEST_PRODUCT_CODE,
        "signed_field_names": signed_field_names,
        "signature": signature,
    });

    BASE64.encode(serde_json::to_vec(&payload).expect("payload serializes"))
}

/// An unsigned callback blob: valid base64 JSON, no signature fields.
pub fn unsigned_callback_data(transaction_uuid: &str, status: &str) -> String {
    let payload = serde_json::json!({
        "transaction_uuid": transaction_uuid,
        "status": status,
    });
    BASE64.encode(serde_json::to_vec(&payload).expect("payload serializes"))
}
