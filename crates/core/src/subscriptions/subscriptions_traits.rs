//! Subscription repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::subscriptions_model::{NewSubscriptionPurchase, SubscriptionPurchase};
use crate::errors::Result;

/// What an activation attempt found.
#[derive(Clone, Debug)]
pub enum ActivationOutcome {
    /// The purchase was already COMPLETED; nothing changed.
    AlreadyCompleted { purchase: SubscriptionPurchase },
    /// The purchase completed and the perk was switched on.
    Activated {
        purchase: SubscriptionPurchase,
        expires_at: DateTime<Utc>,
    },
}

#[async_trait]
pub trait SubscriptionRepositoryTrait: Send + Sync {
    async fn create_initiated(
        &self,
        new_purchase: NewSubscriptionPurchase,
    ) -> Result<SubscriptionPurchase>;

    async fn attach_checkout(
        &self,
        purchase_id: &str,
        checkout_url: &str,
    ) -> Result<SubscriptionPurchase>;

    fn get_by_tx_ref(&self, tx_ref: &str) -> Result<Option<SubscriptionPurchase>>;

    /// One ledger transaction keyed on the purchase row: marks it
    /// COMPLETED, stamps `activated_at`/`expires_at = now + duration`,
    /// mirrors the expiry onto the user's perk columns, and audits.
    /// Idempotent: a COMPLETED purchase is returned unchanged.
    async fn activate_by_tx_ref(&self, tx_ref: &str) -> Result<ActivationOutcome>;

    /// Dev/explicit activation path: creates a COMPLETED purchase and
    /// enables the perk in one transaction.
    async fn activate_direct(
        &self,
        new_purchase: NewSubscriptionPurchase,
    ) -> Result<ActivationOutcome>;

    /// Clears every perk whose expiry is not after `now`. Idempotent;
    /// returns how many perk flags were cleared.
    async fn clear_expired_perks(&self, now: DateTime<Utc>) -> Result<usize>;
}
