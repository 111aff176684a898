use serde::{Deserialize, Serialize};

/// A platform user. Creators publish plans; buyers subscribe to them.
/// The same profile can do both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub phone_number: String,
    /// Discord user ID, needed before a Discord role can be granted
    pub discord_id: Option<String>,
    pub is_creator: bool,
    /// API key for authenticated calls. Never serialized in responses.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateProfile {
    pub username: String,
    pub phone_number: String,
    #[serde(default)]
    pub discord_id: Option<String>,
    #[serde(default)]
    pub is_creator: bool,
}
