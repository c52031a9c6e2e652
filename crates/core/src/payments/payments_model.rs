//! Payment and catalog models.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::TX_REF_MAX_LEN;
use crate::errors::{Error, ValidationError};

/// A coin package a user can purchase.
///
/// `target_net_etb` is the net top-up the platform keeps;
/// `price_total_etb` is what the customer pays, grossed up for VAT and
/// gateway fees at creation time.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPackage {
    pub id: String,
    pub name: String,
    pub target_net_etb: Decimal,
    pub coins: u64,
    pub base_etb: Decimal,
    pub vat_etb: Decimal,
    pub price_total_etb: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a package; pricing is computed by the service.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoinPackage {
    pub name: String,
    pub target_net_etb: Decimal,
    pub coins: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Initiated,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Initiated => "INITIATED",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIATED" => Ok(PaymentStatus::Initiated),
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown payment status '{other}'"
            ))
            .into()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentProvider {
    Chapa,
    Telebirr,
}

impl PaymentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Chapa => "CHAPA",
            PaymentProvider::Telebirr => "TELEBIRR",
        }
    }
}

impl std::str::FromStr for PaymentProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHAPA" => Ok(PaymentProvider::Chapa),
            "TELEBIRR" => Ok(PaymentProvider::Telebirr),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown payment provider '{other}'"
            ))
            .into()),
        }
    }
}

/// One initiated top-up.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub package_id: String,
    pub status: PaymentStatus,
    pub provider: PaymentProvider,
    /// Our reference, carried through checkout and webhooks.
    pub tx_ref: String,
    /// The provider's settlement reference, set on verification.
    pub provider_ref: Option<String>,
    pub checkout_url: Option<String>,
    pub price_total_etb: Decimal,
    pub vat_etb: Decimal,
    pub gw_fee_etb: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewPayment {
    pub user_id: String,
    pub package_id: String,
    pub provider: PaymentProvider,
    pub tx_ref: String,
    pub price_total_etb: Decimal,
    pub vat_etb: Decimal,
}

/// Immutable proof of a settled top-up; one per SUCCESS payment.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    pub payment_id: String,
    pub price_etb: Decimal,
    pub vat_etb: Decimal,
    pub provider_ref: String,
    pub created_at: DateTime<Utc>,
}

/// What the top-up endpoint returns to the client.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUpCheckout {
    pub checkout_url: String,
    pub tx_ref: String,
    pub payment_id: String,
}

/// Builds a `{prefix}-{owner}-{random}` transaction reference, with the
/// owner id compacted so the whole reference fits the provider's cap.
pub fn new_tx_ref(prefix: &str, owner: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    let compact: String = owner
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(12)
        .collect();
    let tx_ref = format!("{prefix}-{compact}-{suffix}");
    debug_assert!(tx_ref.len() <= TX_REF_MAX_LEN);
    tx_ref
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{COIN_TX_REF_PREFIX, SUB_TX_REF_PREFIX};

    #[test]
    fn tx_refs_fit_the_provider_cap() {
        let long_owner = "3f8a9c40-77aa-4fd0-9e1c-0a54ad58e6c2";
        for prefix in [COIN_TX_REF_PREFIX, SUB_TX_REF_PREFIX] {
            let tx_ref = new_tx_ref(prefix, long_owner);
            assert!(tx_ref.len() <= TX_REF_MAX_LEN, "{tx_ref}");
            assert!(tx_ref.starts_with(&format!("{prefix}-")));
        }
    }

    #[test]
    fn tx_refs_are_unique() {
        let a = new_tx_ref("coin", "user");
        let b = new_tx_ref("coin", "user");
        assert_ne!(a, b);
    }

    #[test]
    fn status_round_trips() {
        for status in [
            PaymentStatus::Initiated,
            PaymentStatus::Success,
            PaymentStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
        assert!("BOGUS".parse::<PaymentStatus>().is_err());
    }
}
