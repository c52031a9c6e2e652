//! Subscription models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};

/// The three purchasable perks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanCode {
    Boost,
    LikesReveal,
    AdFree,
}

impl PlanCode {
    pub const ALL: [PlanCode; 3] = [PlanCode::Boost, PlanCode::LikesReveal, PlanCode::AdFree];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanCode::Boost => "BOOST",
            PlanCode::LikesReveal => "LIKES_REVEAL",
            PlanCode::AdFree => "AD_FREE",
        }
    }

    /// Short form used in transaction references.
    pub fn slug(&self) -> &'static str {
        match self {
            PlanCode::Boost => "boost",
            PlanCode::LikesReveal => "likes",
            PlanCode::AdFree => "adfree",
        }
    }
}

impl std::str::FromStr for PlanCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOOST" => Ok(PlanCode::Boost),
            "LIKES_REVEAL" => Ok(PlanCode::LikesReveal),
            "AD_FREE" => Ok(PlanCode::AdFree),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown plan '{other}'"
            ))
            .into()),
        }
    }
}

/// Plan as served by the plans endpoint, straight from the price table.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub code: PlanCode,
    pub name: String,
    pub description: String,
    pub price_etb: Decimal,
    pub duration_days: i64,
    pub icon: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Initiated,
    Completed,
    Failed,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Initiated => "INITIATED",
            SubscriptionStatus::Completed => "COMPLETED",
            SubscriptionStatus::Failed => "FAILED",
        }
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIATED" => Ok(SubscriptionStatus::Initiated),
            "COMPLETED" => Ok(SubscriptionStatus::Completed),
            "FAILED" => Ok(SubscriptionStatus::Failed),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown subscription status '{other}'"
            ))
            .into()),
        }
    }
}

/// One perk purchase. `expires_at` on a COMPLETED purchase is mirrored
/// onto the user's perk columns.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPurchase {
    pub id: String,
    pub user_id: String,
    pub plan: PlanCode,
    pub amount_etb: Decimal,
    pub duration_days: i64,
    pub tx_ref: String,
    pub status: SubscriptionStatus,
    pub checkout_url: Option<String>,
    pub activated_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewSubscriptionPurchase {
    pub user_id: String,
    pub plan: PlanCode,
    pub amount_etb: Decimal,
    pub duration_days: i64,
    pub tx_ref: String,
}

/// What the subscribe endpoint returns.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCheckout {
    pub checkout_url: String,
    pub tx_ref: String,
    pub purchase_id: String,
}
