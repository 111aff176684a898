use chrono::Utc;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::gateway::Gateway;
use crate::models::*;

use super::from_row::{
    query_all, query_one, FromRow, DISCORD_INTEGRATION_COLS, PAYMENT_COLS, PLAN_COLS,
    PROFILE_COLS, SUBSCRIPTION_COLS, WHATSAPP_INTEGRATION_COLS,
};

pub fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn generate_api_key() -> String {
    format!("cp_{}", Uuid::new_v4().simple())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ============ Profiles ============

pub fn create_profile(conn: &Connection, input: &CreateProfile) -> Result<Profile> {
    let id = gen_id();
    let api_key = generate_api_key();
    let now = now();
    let username = input.username.trim().to_lowercase();

    conn.execute(
        "INSERT INTO profiles (id, username, phone_number, discord_id, is_creator, api_key, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &id,
            &username,
            &input.phone_number,
            &input.discord_id,
            input.is_creator,
            &api_key,
            now
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Username '{}' is taken", username))
        } else {
            e.into()
        }
    })?;

    Ok(Profile {
        id,
        username,
        phone_number: input.phone_number.clone(),
        discord_id: input.discord_id.clone(),
        is_creator: input.is_creator,
        api_key,
        created_at: now,
    })
}

pub fn get_profile_by_id(conn: &Connection, id: &str) -> Result<Option<Profile>> {
    query_one(
        conn,
        &format!("SELECT {} FROM profiles WHERE id = ?1", PROFILE_COLS),
        &[&id],
    )
}

pub fn get_profile_by_username(conn: &Connection, username: &str) -> Result<Option<Profile>> {
    query_one(
        conn,
        &format!("SELECT {} FROM profiles WHERE username = ?1", PROFILE_COLS),
        &[&username.trim().to_lowercase()],
    )
}

pub fn get_profile_by_api_key(conn: &Connection, api_key: &str) -> Result<Option<Profile>> {
    query_one(
        conn,
        &format!("SELECT {} FROM profiles WHERE api_key = ?1", PROFILE_COLS),
        &[&api_key],
    )
}

// ============ Plans ============

pub fn create_plan(conn: &Connection, creator_id: &str, input: &CreatePlan) -> Result<Plan> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO plans (id, creator_id, name, bio, price, interval, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &id,
            creator_id,
            &input.name,
            &input.bio,
            input.price.to_string(),
            input.interval.as_str(),
            now
        ],
    )?;

    Ok(Plan {
        id,
        creator_id: creator_id.to_string(),
        name: input.name.clone(),
        bio: input.bio.clone(),
        price: input.price,
        interval: input.interval,
        created_at: now,
    })
}

pub fn get_plan_by_id(conn: &Connection, id: &str) -> Result<Option<Plan>> {
    query_one(
        conn,
        &format!("SELECT {} FROM plans WHERE id = ?1", PLAN_COLS),
        &[&id],
    )
}

pub fn list_plans_by_creator(conn: &Connection, creator_id: &str) -> Result<Vec<Plan>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM plans WHERE creator_id = ?1 ORDER BY created_at",
            PLAN_COLS
        ),
        &[&creator_id],
    )
}

// ============ Payments ============

/// Create a pending payment with a fresh transaction id.
///
/// The transaction id is UUID-grade entropy and globally unique. A
/// collision is retried once with a new id; a second collision means
/// something is deeply wrong with id generation and is surfaced as fatal.
pub fn create_payment(
    conn: &Connection,
    buyer_id: &str,
    plan_id: &str,
    amount: &Decimal,
    gateway: Gateway,
) -> Result<Payment> {
    for attempt in 0..2 {
        let id = gen_id();
        let transaction_id = Uuid::new_v4().to_string();
        let now = now();

        let inserted = conn.execute(
            "INSERT INTO payments (id, buyer_id, plan_id, amount, gateway, transaction_id, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7)",
            params![
                &id,
                buyer_id,
                plan_id,
                amount.to_string(),
                gateway.as_str(),
                &transaction_id,
                now
            ],
        );

        match inserted {
            Ok(_) => {
                return Ok(Payment {
                    id,
                    buyer_id: buyer_id.to_string(),
                    plan_id: plan_id.to_string(),
                    amount: *amount,
                    gateway,
                    transaction_id,
                    status: PaymentStatus::Pending,
                    created_at: now,
                });
            }
            Err(e) if is_unique_violation(&e) && attempt == 0 => {
                tracing::warn!("Transaction id collision on insert, retrying with a fresh id");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(
        "Transaction id generation collided twice".into(),
    ))
}

pub fn get_payment_by_id(conn: &Connection, id: &str) -> Result<Option<Payment>> {
    query_one(
        conn,
        &format!("SELECT {} FROM payments WHERE id = ?1", PAYMENT_COLS),
        &[&id],
    )
}

pub fn get_payment_by_transaction_id(
    conn: &Connection,
    transaction_id: &str,
) -> Result<Option<Payment>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM payments WHERE transaction_id = ?1",
            PAYMENT_COLS
        ),
        &[&transaction_id],
    )
}

/// Compare-and-swap settlement: move a payment out of `pending` into a
/// terminal status. Returns true if this call performed the transition,
/// false if the payment was already settled (or does not exist).
///
/// Concurrent callbacks for the same transaction race on this single
/// conditional update, so exactly one of them wins.
pub fn try_settle_payment(
    conn: &Connection,
    transaction_id: &str,
    status: PaymentStatus,
) -> Result<bool> {
    debug_assert!(status.is_terminal());
    let affected = conn.execute(
        "UPDATE payments SET status = ?1 WHERE transaction_id = ?2 AND status = 'pending'",
        params![status.as_str(), transaction_id],
    )?;
    Ok(affected > 0)
}

// ============ Subscriptions ============

/// Idempotent activate-or-renew for a (buyer, plan) pair.
///
/// First successful payment creates the row with `start_date = now`;
/// later payments update the same row: end date overwritten (not
/// stacked), active flag re-asserted. The UNIQUE(buyer_id, plan_id)
/// constraint makes the upsert race-free.
pub fn activate_subscription(
    conn: &Connection,
    buyer_id: &str,
    plan_id: &str,
    until: i64,
) -> Result<Subscription> {
    let id = gen_id();
    let start = now();

    conn.query_row(
        &format!(
            "INSERT INTO subscriptions (id, buyer_id, plan_id, start_date, end_date, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)
             ON CONFLICT(buyer_id, plan_id)
             DO UPDATE SET end_date = excluded.end_date, is_active = 1
             RETURNING {}",
            SUBSCRIPTION_COLS
        ),
        params![&id, buyer_id, plan_id, start, until],
        Subscription::from_row,
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Subscription upsert conflict".into())
        } else {
            e.into()
        }
    })
}

pub fn get_subscription(
    conn: &Connection,
    buyer_id: &str,
    plan_id: &str,
) -> Result<Option<Subscription>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM subscriptions WHERE buyer_id = ?1 AND plan_id = ?2",
            SUBSCRIPTION_COLS
        ),
        &[&buyer_id, &plan_id],
    )
}

pub fn get_subscription_by_id(conn: &Connection, id: &str) -> Result<Option<Subscription>> {
    query_one(
        conn,
        &format!("SELECT {} FROM subscriptions WHERE id = ?1", SUBSCRIPTION_COLS),
        &[&id],
    )
}

pub fn list_subscriptions_for_buyer(
    conn: &Connection,
    buyer_id: &str,
) -> Result<Vec<Subscription>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM subscriptions WHERE buyer_id = ?1 ORDER BY start_date",
            SUBSCRIPTION_COLS
        ),
        &[&buyer_id],
    )
}

/// Deactivate a subscription (buyer-initiated cancel). The row is kept so
/// a later payment renews it in place.
pub fn deactivate_subscription(conn: &Connection, id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE subscriptions SET is_active = 0 WHERE id = ?1",
        params![id],
    )?;
    Ok(affected > 0)
}

// ============ Integrations ============

pub fn link_discord(conn: &Connection, input: &LinkDiscord) -> Result<DiscordIntegration> {
    let now = now();
    conn.execute(
        "INSERT INTO discord_integrations (plan_id, guild_id, role_id, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(plan_id)
         DO UPDATE SET guild_id = excluded.guild_id, role_id = excluded.role_id",
        params![&input.plan_id, &input.guild_id, &input.role_id, now],
    )?;

    Ok(DiscordIntegration {
        plan_id: input.plan_id.clone(),
        guild_id: input.guild_id.clone(),
        role_id: input.role_id.clone(),
        created_at: now,
    })
}

pub fn get_discord_integration(
    conn: &Connection,
    plan_id: &str,
) -> Result<Option<DiscordIntegration>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM discord_integrations WHERE plan_id = ?1",
            DISCORD_INTEGRATION_COLS
        ),
        &[&plan_id],
    )
}

pub fn unlink_discord(conn: &Connection, plan_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "DELETE FROM discord_integrations WHERE plan_id = ?1",
        params![plan_id],
    )?;
    Ok(affected > 0)
}

pub fn link_whatsapp(conn: &Connection, input: &LinkWhatsApp) -> Result<WhatsAppIntegration> {
    let now = now();
    conn.execute(
        "INSERT INTO whatsapp_integrations (plan_id, group_link, created_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(plan_id) DO UPDATE SET group_link = excluded.group_link",
        params![&input.plan_id, &input.group_link, now],
    )?;

    Ok(WhatsAppIntegration {
        plan_id: input.plan_id.clone(),
        group_link: input.group_link.clone(),
        created_at: now,
    })
}

pub fn get_whatsapp_integration(
    conn: &Connection,
    plan_id: &str,
) -> Result<Option<WhatsAppIntegration>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM whatsapp_integrations WHERE plan_id = ?1",
            WHATSAPP_INTEGRATION_COLS
        ),
        &[&plan_id],
    )
}

pub fn unlink_whatsapp(conn: &Connection, plan_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "DELETE FROM whatsapp_integrations WHERE plan_id = ?1",
        params![plan_id],
    )?;
    Ok(affected > 0)
}

/// Discord roles a buyer is entitled to through subscriptions that are
/// active and not past their end date.
pub fn list_discord_grants(
    conn: &Connection,
    buyer_id: &str,
    now: i64,
) -> Result<Vec<DiscordGrant>> {
    let mut stmt = conn.prepare(
        "SELECT d.guild_id, d.role_id, d.plan_id
         FROM subscriptions s
         JOIN discord_integrations d ON d.plan_id = s.plan_id
         WHERE s.buyer_id = ?1 AND s.is_active = 1
           AND (s.end_date IS NULL OR s.end_date > ?2)",
    )?;
    let grants = stmt
        .query_map(params![buyer_id, now], |row| {
            Ok(DiscordGrant {
                guild_id: row.get(0)?,
                role_id: row.get(1)?,
                plan_id: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(grants)
}
