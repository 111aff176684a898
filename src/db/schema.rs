use rusqlite::Connection;

/// Initialize the database schema
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;

        -- Profiles (platform users - creators and buyers)
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            phone_number TEXT NOT NULL,
            discord_id TEXT,
            is_creator INTEGER NOT NULL DEFAULT 0,
            api_key TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_profiles_api_key ON profiles(api_key);

        -- Subscription plans (creator-owned, purchasable)
        CREATE TABLE IF NOT EXISTS plans (
            id TEXT PRIMARY KEY,
            creator_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            bio TEXT NOT NULL DEFAULT 'not provided',
            price TEXT NOT NULL,
            interval TEXT NOT NULL CHECK (interval IN ('monthly', 'yearly')),
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_plans_creator ON plans(creator_id);

        -- Subscriptions: one row per (buyer, plan), renewed in place
        CREATE TABLE IF NOT EXISTS subscriptions (
            id TEXT PRIMARY KEY,
            buyer_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            plan_id TEXT NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
            start_date INTEGER NOT NULL,
            end_date INTEGER,
            is_active INTEGER NOT NULL DEFAULT 0,
            UNIQUE(buyer_id, plan_id)
        );
        CREATE INDEX IF NOT EXISTS idx_subscriptions_buyer ON subscriptions(buyer_id);
        CREATE INDEX IF NOT EXISTS idx_subscriptions_active ON subscriptions(is_active);

        -- Payments: one row per transaction attempt, settled exactly once.
        -- transaction_id correlates the gateway callback with this row.
        CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY,
            buyer_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            plan_id TEXT NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
            amount TEXT NOT NULL,
            gateway TEXT NOT NULL CHECK (gateway IN ('esewa', 'khalti')),
            transaction_id TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'completed', 'failed')),
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_payments_buyer ON payments(buyer_id);
        CREATE INDEX IF NOT EXISTS idx_payments_status ON payments(status);

        -- Discord access artifact: at most one per plan
        CREATE TABLE IF NOT EXISTS discord_integrations (
            plan_id TEXT PRIMARY KEY REFERENCES plans(id) ON DELETE CASCADE,
            guild_id TEXT NOT NULL,
            role_id TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        -- WhatsApp access artifact: at most one per plan
        CREATE TABLE IF NOT EXISTS whatsapp_integrations (
            plan_id TEXT PRIMARY KEY REFERENCES plans(id) ON DELETE CASCADE,
            group_link TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        "#,
    )
}
