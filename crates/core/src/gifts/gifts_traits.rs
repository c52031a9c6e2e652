//! Gift repository traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::gifts_model::{Gift, GiftSendOutcome, GiftTransaction};
use crate::errors::Result;
use crate::money::GiftSplit;

#[async_trait]
pub trait GiftRepositoryTrait: Send + Sync {
    /// Active gifts ordered by coin price.
    fn list_active(&self) -> Result<Vec<Gift>>;

    fn get_active(&self, gift_id: &str) -> Result<Option<Gift>>;

    /// Inserts a catalog gift. Used by seeding and admin tooling.
    async fn create(&self, gift: Gift) -> Result<Gift>;

    fn count(&self) -> Result<i64>;
}

/// Input to the atomic gift-send ledger operation. Totals and the split
/// are computed by the service; the repository only moves them.
#[derive(Clone, Debug)]
pub struct RecordGiftSend {
    pub sender_id: String,
    pub recipient_id: String,
    pub gift_id: String,
    pub gift_name: String,
    pub quantity: u32,
    pub total_coins: u64,
    pub total_value: Decimal,
    pub split: GiftSplit,
    pub message: Option<String>,
}

#[async_trait]
pub trait GiftTransactionRepositoryTrait: Send + Sync {
    /// One ledger transaction: conditional coin debit (fails the whole
    /// operation with `InsufficientCoins` when the balance is short),
    /// creator payout credit, the SUCCESS transaction row, and both
    /// audit rows.
    async fn record_send(&self, send: RecordGiftSend) -> Result<GiftSendOutcome>;

    /// Latest transactions where the user is sender or recipient.
    fn recent_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<GiftTransaction>>;

    /// Total SUCCESS gift value received since `since` (risk window).
    fn sum_received_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<Decimal>;
}
