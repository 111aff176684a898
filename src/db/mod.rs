mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::gateway::EsewaConfig;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state holding the database pool and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Base URL for gateway callbacks (e.g., https://api.example.com)
    pub base_url: String,
    /// eSewa credentials, loaded once at startup
    pub esewa: EsewaConfig,
    /// Landing page the buyer is sent to after a successful payment
    pub success_page_url: String,
    /// Landing page for failed or rejected payments
    pub failure_page_url: String,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    // foreign_keys is per-connection in SQLite, so every pooled connection
    // re-enables it; the durable pragmas (WAL etc.) are set in init_db.
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.pragma_update(None, "foreign_keys", "ON")
    });
    Pool::builder().max_size(10).build(manager)
}
