//! Gift models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};

/// A catalog gift priced in coins with a reference ETB value used for
/// the commission split.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: String,
    pub name: String,
    pub coins: u64,
    pub value_etb: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGift {
    pub name: String,
    pub coins: u64,
    pub value_etb: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GiftTransactionStatus {
    Success,
    Failed,
}

impl GiftTransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftTransactionStatus::Success => "SUCCESS",
            GiftTransactionStatus::Failed => "FAILED",
        }
    }
}

impl std::str::FromStr for GiftTransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(GiftTransactionStatus::Success),
            "FAILED" => Ok(GiftTransactionStatus::Failed),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown gift transaction status '{other}'"
            ))
            .into()),
        }
    }
}

/// Immutable record of one gift send with its full split breakdown.
///
/// Invariants: `commission_gross + creator_payout = value_etb` and
/// `commission_net + vat_on_commission = commission_gross`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftTransaction {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub gift_id: String,
    /// Catalog name at send time; survives catalog edits.
    pub gift_name: String,
    pub quantity: u32,
    pub coins_spent: u64,
    pub value_etb: Decimal,
    pub commission_gross: Decimal,
    pub vat_on_commission: Decimal,
    pub commission_net: Decimal,
    pub creator_payout: Decimal,
    pub status: GiftTransactionStatus,
    pub failure_reason: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Gift send endpoint payload.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftSendRequest {
    pub recipient_id: String,
    pub gift_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub message: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

/// Result of a successful send, with both wallet snapshots for the
/// realtime envelopes.
#[derive(Clone, Debug)]
pub struct GiftSendOutcome {
    pub transaction: GiftTransaction,
    pub sender_wallet: crate::wallets::Wallet,
    pub recipient_wallet: crate::wallets::Wallet,
}
