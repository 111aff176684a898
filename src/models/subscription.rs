use serde::{Deserialize, Serialize};

/// A buyer's subscription to a plan. Unique on (buyer, plan): renewals
/// update this row in place rather than inserting a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub buyer_id: String,
    pub plan_id: String,
    pub start_date: i64,
    pub end_date: Option<i64>,
    pub is_active: bool,
}

impl Subscription {
    /// Active and not past its end date at `now`.
    pub fn is_current(&self, now: i64) -> bool {
        self.is_active && self.end_date.map(|end| end > now).unwrap_or(true)
    }
}
