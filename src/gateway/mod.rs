mod esewa;

pub use esewa::*;

use serde::{Deserialize, Serialize};

/// Payment gateways the platform knows about. Only eSewa is wired up;
/// Khalti is an enumerated tag that fails fast at intent creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gateway {
    Esewa,
    Khalti,
}

impl Gateway {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Esewa => "esewa",
            Self::Khalti => "khalti",
        }
    }
}

impl std::str::FromStr for Gateway {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "esewa" => Ok(Self::Esewa),
            "khalti" => Ok(Self::Khalti),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
