//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};
use rust_decimal::Decimal;

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on corrupted values.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Parse a TEXT column holding a fixed-point decimal amount.
fn parse_decimal(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<Decimal> {
    row.get::<_, String>(col)?.parse::<Decimal>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const PROFILE_COLS: &str =
    "id, username, phone_number, discord_id, is_creator, api_key, created_at";

pub const PLAN_COLS: &str = "id, creator_id, name, bio, price, interval, created_at";

pub const SUBSCRIPTION_COLS: &str = "id, buyer_id, plan_id, start_date, end_date, is_active";

pub const PAYMENT_COLS: &str =
    "id, buyer_id, plan_id, amount, gateway, transaction_id, status, created_at";

pub const DISCORD_INTEGRATION_COLS: &str = "plan_id, guild_id, role_id, created_at";

pub const WHATSAPP_INTEGRATION_COLS: &str = "plan_id, group_link, created_at";

// ============ FromRow Implementations ============

impl FromRow for Profile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Profile {
            id: row.get(0)?,
            username: row.get(1)?,
            phone_number: row.get(2)?,
            discord_id: row.get(3)?,
            is_creator: row.get(4)?,
            api_key: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

impl FromRow for Plan {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Plan {
            id: row.get(0)?,
            creator_id: row.get(1)?,
            name: row.get(2)?,
            bio: row.get(3)?,
            price: parse_decimal(row, 4, "price")?,
            interval: parse_enum(row, 5, "interval")?,
            created_at: row.get(6)?,
        })
    }
}

impl FromRow for Subscription {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Subscription {
            id: row.get(0)?,
            buyer_id: row.get(1)?,
            plan_id: row.get(2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
            is_active: row.get(5)?,
        })
    }
}

impl FromRow for Payment {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Payment {
            id: row.get(0)?,
            buyer_id: row.get(1)?,
            plan_id: row.get(2)?,
            amount: parse_decimal(row, 3, "amount")?,
            gateway: parse_enum(row, 4, "gateway")?,
            transaction_id: row.get(5)?,
            status: parse_enum(row, 6, "status")?,
            created_at: row.get(7)?,
        })
    }
}

impl FromRow for DiscordIntegration {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(DiscordIntegration {
            plan_id: row.get(0)?,
            guild_id: row.get(1)?,
            role_id: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

impl FromRow for WhatsAppIntegration {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(WhatsAppIntegration {
            plan_id: row.get(0)?,
            group_link: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}
