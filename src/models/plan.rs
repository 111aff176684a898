use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable subscription plan created by a creator.
/// Controls billing amount and renewal interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub creator_id: String,
    pub name: String,
    pub bio: String,
    pub price: Decimal,
    pub interval: PlanInterval,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlan {
    pub name: String,
    #[serde(default = "default_bio")]
    pub bio: String,
    pub price: Decimal,
    pub interval: PlanInterval,
}

fn default_bio() -> String {
    "not provided".to_string()
}

/// Billing interval of a plan. Determines how far a successful payment
/// extends the subscription's end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanInterval {
    Monthly,
    Yearly,
}

impl PlanInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Renewal window in days granted by one successful payment.
    pub fn renewal_days(&self) -> i64 {
        match self {
            Self::Monthly => 30,
            Self::Yearly => 365,
        }
    }
}

impl std::str::FromStr for PlanInterval {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PlanInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
