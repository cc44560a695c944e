//! Payment provider identifiers.

use serde::{Deserialize, Serialize};

/// Payment providers the platform settles with.
///
/// Card acquirers and mobile-wallet providers each report transactions in
/// their own vocabulary; see `tally-core::provider` for the mapping tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Stripe (card payments).
    Stripe,
    /// Adyen (card payments).
    Adyen,
    /// GoPay (mobile wallet).
    Gopay,
    /// DANA (mobile wallet).
    Dana,
}

impl Provider {
    /// All providers reconciled daily.
    pub const ALL: [Self; 4] = [Self::Stripe, Self::Adyen, Self::Gopay, Self::Dana];

    /// Returns true for card acquirers, false for wallets.
    #[must_use]
    pub const fn is_card_acquirer(self) -> bool {
        matches!(self, Self::Stripe | Self::Adyen)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stripe => write!(f, "stripe"),
            Self::Adyen => write!(f, "adyen"),
            Self::Gopay => write!(f, "gopay"),
            Self::Dana => write!(f, "dana"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stripe" => Ok(Self::Stripe),
            "adyen" => Ok(Self::Adyen),
            "gopay" => Ok(Self::Gopay),
            "dana" => Ok(Self::Dana),
            _ => Err(format!("Unknown provider: {s}")),
        }
    }
}
