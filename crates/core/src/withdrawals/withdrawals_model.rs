//! Withdrawal models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Paid,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "PENDING",
            WithdrawalStatus::Approved => "APPROVED",
            WithdrawalStatus::Rejected => "REJECTED",
            WithdrawalStatus::Paid => "PAID",
        }
    }

    /// REJECTED and PAID are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WithdrawalStatus::Rejected | WithdrawalStatus::Paid)
    }
}

impl std::str::FromStr for WithdrawalStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(WithdrawalStatus::Pending),
            "APPROVED" => Ok(WithdrawalStatus::Approved),
            "REJECTED" => Ok(WithdrawalStatus::Rejected),
            "PAID" => Ok(WithdrawalStatus::Paid),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown withdrawal status '{other}'"
            ))
            .into()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalMethod {
    Chapa,
    Telebirr,
}

impl WithdrawalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalMethod::Chapa => "CHAPA",
            WithdrawalMethod::Telebirr => "TELEBIRR",
        }
    }
}

impl std::str::FromStr for WithdrawalMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHAPA" | "CH" => Ok(WithdrawalMethod::Chapa),
            "TELEBIRR" => Ok(WithdrawalMethod::Telebirr),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown withdrawal method '{other}'"
            ))
            .into()),
        }
    }
}

/// One withdrawal request. While PENDING or APPROVED its amount is
/// counted in the wallet's `hold_etb`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub id: String,
    pub user_id: String,
    pub method: WithdrawalMethod,
    /// Account identifier at the payout rail.
    pub destination: String,
    pub amount_etb: Decimal,
    pub status: WithdrawalStatus,
    pub provider_ref: Option<String>,
    pub failure_reason: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Withdrawal endpoint payload.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWithdrawal {
    pub method: WithdrawalMethod,
    pub destination: String,
    pub amount_etb: Decimal,
}
