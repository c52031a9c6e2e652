//! Payout rail adapter.

use async_trait::async_trait;
use chrono::Utc;

use crate::errors::Result;
use crate::withdrawals::WithdrawalRequest;

/// What the rail reported for one payout attempt.
#[derive(Clone, Debug)]
pub enum PayoutOutcome {
    Paid { provider_ref: String },
    Failed { reason: String },
}

/// Pays an approved withdrawal out to its destination. Real Chapa /
/// Telebirr transfer integrations plug in here.
#[async_trait]
pub trait PayoutAdapterTrait: Send + Sync {
    async fn pay(&self, withdrawal: &WithdrawalRequest) -> Result<PayoutOutcome>;
}

/// Default adapter: always pays, with a synthetic reference.
pub struct StubPayoutAdapter;

#[async_trait]
impl PayoutAdapterTrait for StubPayoutAdapter {
    async fn pay(&self, withdrawal: &WithdrawalRequest) -> Result<PayoutOutcome> {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        Ok(PayoutOutcome::Paid {
            provider_ref: format!("STUB-{}-{}", withdrawal.id, stamp),
        })
    }
}
