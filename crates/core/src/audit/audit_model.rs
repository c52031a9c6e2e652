//! Audit log model and the closed event vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed vocabulary of audit event tags.
pub mod events {
    pub const PAYMENT_SUCCESS: &str = "PAYMENT_SUCCESS";
    pub const GW_FEE_MISMATCH: &str = "GW_FEE_MISMATCH";
    pub const GIFT_SENT: &str = "GIFT_SENT";
    pub const GIFT_RECEIVED: &str = "GIFT_RECEIVED";
    pub const GIFT_SEND_FAILED: &str = "GIFT_SEND_FAILED";
    pub const WITHDRAWAL_REQUESTED: &str = "WITHDRAWAL_REQUESTED";
    pub const WITHDRAWAL_APPROVED: &str = "WITHDRAWAL_APPROVED";
    pub const WITHDRAWAL_REJECTED: &str = "WITHDRAWAL_REJECTED";
    pub const WITHDRAWAL_PAID: &str = "WITHDRAWAL_PAID";
    pub const KYC_SUBMITTED: &str = "KYC_SUBMITTED";
    pub const KYC_VERIFIED: &str = "KYC_VERIFIED";
    pub const KYC_REJECTED: &str = "KYC_REJECTED";
    pub const RISK_FLAGGED: &str = "RISK_FLAGGED";
    pub const RISK_CLEARED: &str = "RISK_CLEARED";
    pub const SUBSCRIPTION_ACTIVATED: &str = "SUBSCRIPTION_ACTIVATED";
}

/// One append-only audit row.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    pub user_id: String,
    /// Tag from [`events`].
    pub event: String,
    pub metadata: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}
