use serde::{Deserialize, Serialize};

/// Discord access artifact linked to a plan: subscribers get `role_id`
/// in guild `guild_id`. At most one per plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordIntegration {
    pub plan_id: String,
    pub guild_id: String,
    pub role_id: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct LinkDiscord {
    pub plan_id: String,
    pub guild_id: String,
    pub role_id: String,
}

/// WhatsApp access artifact linked to a plan: subscribers get the group
/// invite link. At most one per plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppIntegration {
    pub plan_id: String,
    pub group_link: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct LinkWhatsApp {
    pub plan_id: String,
    pub group_link: String,
}

/// A (guild, role) pair a buyer is entitled to through an active
/// subscription. Consumed by the Discord bot when syncing roles.
#[derive(Debug, Clone, Serialize)]
pub struct DiscordGrant {
    pub guild_id: String,
    pub role_id: String,
    pub plan_id: String,
}
