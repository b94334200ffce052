use std::{fmt, str::FromStr};

use bon::Builder;
use serde::{Deserialize, Serialize};

/// Platform cut of every contract, in basis points (0.5%).
pub const PLATFORM_FEE_RATE: u64 = 50;
pub const BASIS_POINTS: u64 = 10_000;
pub const MAX_REPUTATION: u64 = 100;
pub const MAX_FILE_NAME_LEN: usize = 64;

/// An authenticated caller identity. Authentication happens upstream; the ledger only
/// compares identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Principal {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.0
    }
}

impl FromStr for Principal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("principal cannot be empty".to_string());
        }
        Ok(Self(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct Provider {
    pub total_space: u64,
    pub available_space: u64,
    pub price_per_gb: u64,
    #[builder(default = MAX_REPUTATION)]
    pub reputation_score: u64,
    #[builder(default = 0)]
    pub total_contracts: u64,
    #[builder(default = 0)]
    pub successful_contracts: u64,
    #[builder(default = true)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct Listing {
    pub provider: Principal,
    /// Space still purchasable from this listing.
    pub space_gb: u64,
    pub price_per_gb: u64,
    pub duration_days: u64,
    #[builder(default = true)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct Contract {
    pub listing_id: u64,
    pub provider: Principal,
    pub buyer: Principal,
    pub space_gb: u64,
    pub duration_days: u64,
    pub total_price: u64,
    pub platform_fee: u64,
    #[builder(default = false)]
    pub is_completed: bool,
    #[builder(default = false)]
    pub is_disputed: bool,
}

impl Contract {
    /// Amount released to the provider once the contract completes.
    pub fn provider_payout(&self) -> u64 {
        self.total_price - self.platform_fee
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct Dispute {
    pub contract_id: u64,
    pub complainant: Principal,
    pub reason: String,
    #[builder(default = false)]
    pub is_resolved: bool,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
pub struct FileMetadata {
    pub contract_id: u64,
    #[serde(with = "hex::serde")]
    pub content_hash: [u8; 32],
    pub file_size: u64,
    pub file_name: String,
    #[serde(with = "hex::serde")]
    pub encryption_key: [u8; 32],
    pub uploader: Principal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformStats {
    pub total_listings: u64,
    pub total_contracts: u64,
    pub platform_fee_rate: u64,
    pub contract_owner: Principal,
    pub total_disputes: u64,
    pub total_files: u64,
    pub total_fees: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_principal_rejects_empty() {
        assert!("".parse::<Principal>().is_err());
        assert!("   ".parse::<Principal>().is_err());
        assert!(serde_json::from_value::<Principal>(json!("")).is_err());
        assert!(serde_json::from_value::<Principal>(json!("  ")).is_err());

        let principal: Principal = serde_json::from_value(json!("wallet_1")).unwrap();
        assert_eq!(principal, Principal::new("wallet_1"));
        assert_eq!(serde_json::to_value(&principal).unwrap(), json!("wallet_1"));
    }
}
