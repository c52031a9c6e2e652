//! Payment and catalog repository traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::payments_model::{CoinPackage, NewPayment, Payment, Receipt};
use crate::errors::Result;
use crate::wallets::Wallet;

#[async_trait]
pub trait CoinPackageRepositoryTrait: Send + Sync {
    fn list_active(&self) -> Result<Vec<CoinPackage>>;

    fn get_active(&self, package_id: &str) -> Result<Option<CoinPackage>>;

    /// Inserts a fully priced package row. Used by seeding and admin
    /// tooling; the caller computes the pricing invariant.
    async fn create(&self, package: CoinPackage) -> Result<CoinPackage>;

    fn count(&self) -> Result<i64>;
}

/// Input to the atomic settlement operation.
#[derive(Clone, Debug)]
pub struct SettleTopUp {
    pub tx_ref: String,
    /// Settlement reference from the verification payload.
    pub provider_ref: Option<String>,
    /// Gateway fee the provider reported, when it reports one.
    pub provider_fee: Option<Decimal>,
}

/// What the settlement operation found.
#[derive(Clone, Debug)]
pub enum SettlementOutcome {
    /// The payment was already SUCCESS; nothing changed.
    AlreadySettled { payment: Payment },
    /// Coins were credited exactly once.
    Credited {
        payment: Payment,
        wallet: Wallet,
        coins_credited: u64,
    },
}

#[async_trait]
pub trait PaymentRepositoryTrait: Send + Sync {
    async fn create_initiated(&self, new_payment: NewPayment) -> Result<Payment>;

    /// Stores the provider checkout URL on an INITIATED payment.
    async fn attach_checkout(&self, payment_id: &str, checkout_url: &str) -> Result<Payment>;

    fn get_by_id(&self, payment_id: &str) -> Result<Option<Payment>>;

    fn get_by_tx_ref(&self, tx_ref: &str) -> Result<Option<Payment>>;

    fn get_receipt(&self, payment_id: &str) -> Result<Option<Receipt>>;

    /// Atomic, idempotent settlement keyed on the payment row:
    /// marks SUCCESS, records the gateway fee, credits the wallet,
    /// creates the receipt if absent, and appends the audit row - all in
    /// one ledger transaction. A replay finds SUCCESS and changes
    /// nothing.
    async fn settle_success(&self, settle: SettleTopUp) -> Result<SettlementOutcome>;

    /// SUCCESS payments for a user since `since` (risk window).
    fn count_success_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u64>;
}
