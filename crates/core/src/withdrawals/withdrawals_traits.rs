//! Withdrawal repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::withdrawals_model::{NewWithdrawal, WithdrawalRequest, WithdrawalStatus};
use crate::errors::Result;
use crate::wallets::Wallet;

/// Sums of non-REJECTED withdrawal amounts inside the rolling windows.
#[derive(Clone, Debug, Default)]
pub struct WithdrawalTotals {
    pub last_day_etb: Decimal,
    pub last_month_etb: Decimal,
}

#[async_trait]
pub trait WithdrawalRepositoryTrait: Send + Sync {
    /// One ledger transaction: re-checks available funds under the
    /// writer, adds the hold, inserts the PENDING row, and appends the
    /// audit entry. Fails with `InsufficientAvailable` when the
    /// re-check loses.
    async fn create_pending(
        &self,
        user_id: &str,
        new_withdrawal: NewWithdrawal,
    ) -> Result<WithdrawalRequest>;

    fn get_by_id(&self, withdrawal_id: &str) -> Result<Option<WithdrawalRequest>>;

    /// Newest-first, optionally filtered by status.
    fn list(&self, status: Option<WithdrawalStatus>) -> Result<Vec<WithdrawalRequest>>;

    fn list_for_user(&self, user_id: &str) -> Result<Vec<WithdrawalRequest>>;

    /// Non-REJECTED totals inside the rolling day/month windows.
    fn totals_since(
        &self,
        user_id: &str,
        day_start: DateTime<Utc>,
        month_start: DateTime<Utc>,
    ) -> Result<WithdrawalTotals>;

    /// PENDING -> APPROVED; anything else is `InvalidState`.
    async fn approve(&self, withdrawal_id: &str) -> Result<WithdrawalRequest>;

    /// PENDING -> REJECTED, releasing the hold
    /// (`hold = max(0, hold - amount)`) in the same transaction.
    async fn reject(
        &self,
        withdrawal_id: &str,
        reason: &str,
    ) -> Result<(WithdrawalRequest, Wallet)>;

    /// APPROVED -> PAID: decrements balance and hold, stamps
    /// `provider_ref`/`paid_at`, audits - one transaction.
    async fn settle_paid(
        &self,
        withdrawal_id: &str,
        provider_ref: &str,
    ) -> Result<(WithdrawalRequest, Wallet)>;

    /// Records a payout failure, leaving the request APPROVED for retry.
    async fn record_payout_failure(&self, withdrawal_id: &str, reason: &str) -> Result<()>;

    /// Most frequent destination for the user since `since`, with its
    /// count (risk window).
    fn top_destination_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<(String, u64)>>;
}
