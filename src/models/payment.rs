use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::gateway::Gateway;

/// A single payment attempt. Created in `Pending` state by the intent
/// issuer, settled exactly once by the callback reconciler.
///
/// `transaction_id` is the opaque token that correlates the gateway
/// callback with this row. It is globally unique and never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub buyer_id: String,
    pub plan_id: String,
    pub amount: Decimal,
    pub gateway: Gateway,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub created_at: i64,
}

/// Payment lifecycle. Transitions only Pending -> Completed or
/// Pending -> Failed, never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
