//! Withdrawal engine: policy checks, review transitions, and payout.

use std::sync::Arc;

use chrono::{Duration, Utc};
use log::{info, warn};

use super::withdrawals_model::{NewWithdrawal, WithdrawalRequest, WithdrawalStatus};
use super::withdrawals_traits::WithdrawalRepositoryTrait;
use crate::config::PaymentConfig;
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, EventSink, Group};
use crate::money::{is_two_dp, round2};
use crate::providers::{PayoutAdapterTrait, PayoutOutcome};
use crate::wallets::WalletRepositoryTrait;

/// Wallet KYC level withdrawals require.
const REQUIRED_KYC_LEVEL: u8 = 2;

pub struct WithdrawalService {
    withdrawals: Arc<dyn WithdrawalRepositoryTrait>,
    wallets: Arc<dyn WalletRepositoryTrait>,
    payout: Arc<dyn PayoutAdapterTrait>,
    sink: Arc<dyn EventSink>,
    config: Arc<PaymentConfig>,
}

impl WithdrawalService {
    pub fn new(
        withdrawals: Arc<dyn WithdrawalRepositoryTrait>,
        wallets: Arc<dyn WalletRepositoryTrait>,
        payout: Arc<dyn PayoutAdapterTrait>,
        sink: Arc<dyn EventSink>,
        config: Arc<PaymentConfig>,
    ) -> Self {
        Self {
            withdrawals,
            wallets,
            payout,
            sink,
            config,
        }
    }

    /// Creates a withdrawal: policy checks first, then the atomic
    /// hold-and-insert. All failures leave state unchanged.
    pub async fn create_withdrawal(
        &self,
        user_id: &str,
        new_withdrawal: NewWithdrawal,
    ) -> Result<WithdrawalRequest> {
        let amount = new_withdrawal.amount_etb;
        if amount <= rust_decimal::Decimal::ZERO || !is_two_dp(amount) {
            return Err(ValidationError::InvalidInput(
                "amount must be a positive ETB value with at most 2 decimal places".into(),
            )
            .into());
        }
        if new_withdrawal.destination.trim().is_empty() {
            return Err(ValidationError::MissingField("destination".into()).into());
        }

        let wallet = self.wallets.get_or_create(user_id).await?;
        if wallet.kyc_level < REQUIRED_KYC_LEVEL {
            return Err(Error::KycInsufficient);
        }
        if wallet.withdrawals_blocked {
            return Err(Error::WithdrawalsBlocked);
        }
        if amount < self.config.min_withdrawal_etb {
            return Err(Error::BelowMinimumWithdrawal(self.config.min_withdrawal_etb));
        }
        if amount > wallet.available_etb() {
            return Err(Error::InsufficientAvailable);
        }

        let now = Utc::now();
        let totals = self.withdrawals.totals_since(
            user_id,
            now - Duration::hours(24),
            now - Duration::days(30),
        )?;
        if totals.last_day_etb + amount > self.config.max_daily_withdrawal_etb {
            return Err(Error::LimitExceeded("Daily".into()));
        }
        if totals.last_month_etb + amount > self.config.max_monthly_withdrawal_etb {
            return Err(Error::LimitExceeded("Monthly".into()));
        }

        // Available funds are re-checked inside the ledger transaction;
        // the hold and the PENDING row commit together.
        let withdrawal = self
            .withdrawals
            .create_pending(
                user_id,
                NewWithdrawal {
                    amount_etb: round2(amount),
                    ..new_withdrawal
                },
            )
            .await?;

        info!(
            "withdrawal {} requested by {} for {} ETB",
            withdrawal.id, user_id, withdrawal.amount_etb
        );
        self.sink.emit(
            Group::Admins,
            DomainEvent::WithdrawalNew {
                id: withdrawal.id.clone(),
                user_id: user_id.to_string(),
                amount_etb: withdrawal.amount_etb,
            },
        );
        Ok(withdrawal)
    }

    pub fn list(&self, status: Option<WithdrawalStatus>) -> Result<Vec<WithdrawalRequest>> {
        self.withdrawals.list(status)
    }

    /// Admin approval; triggers the payout attempt. A payout failure
    /// leaves the request APPROVED so the task can be retried.
    pub async fn approve(&self, withdrawal_id: &str) -> Result<WithdrawalRequest> {
        let withdrawal = self.withdrawals.approve(withdrawal_id).await?;
        info!("withdrawal {} approved", withdrawal_id);

        if let Err(err) = self.process_payout(withdrawal_id).await {
            warn!(
                "payout for withdrawal {} failed, left APPROVED for retry: {}",
                withdrawal_id, err
            );
        }

        // Return the current row; the payout may already have settled it.
        match self.withdrawals.get_by_id(withdrawal_id)? {
            Some(current) => Ok(current),
            None => Ok(withdrawal),
        }
    }

    /// Admin rejection; releases the hold and notifies the user.
    pub async fn reject(&self, withdrawal_id: &str, reason: &str) -> Result<WithdrawalRequest> {
        let reason = if reason.trim().is_empty() {
            "Rejected by admin"
        } else {
            reason.trim()
        };
        let (withdrawal, wallet) = self.withdrawals.reject(withdrawal_id, reason).await?;
        info!("withdrawal {} rejected: {}", withdrawal_id, reason);

        let group = Group::User(withdrawal.user_id.clone());
        self.sink.emit(
            group.clone(),
            DomainEvent::WithdrawalRejected {
                id: withdrawal.id.clone(),
                reason: reason.to_string(),
            },
        );
        self.sink.emit(group, DomainEvent::wallet_updated(&wallet));
        Ok(withdrawal)
    }

    /// Payout task. Retriable and idempotent: a non-APPROVED request is
    /// a noop, and a failed rail attempt records the reason without
    /// changing state.
    pub async fn process_payout(&self, withdrawal_id: &str) -> Result<()> {
        let Some(withdrawal) = self.withdrawals.get_by_id(withdrawal_id)? else {
            return Ok(());
        };
        if withdrawal.status != WithdrawalStatus::Approved {
            return Ok(());
        }

        match self.payout.pay(&withdrawal).await? {
            PayoutOutcome::Paid { provider_ref } => {
                let (withdrawal, wallet) = self
                    .withdrawals
                    .settle_paid(withdrawal_id, &provider_ref)
                    .await?;
                info!(
                    "withdrawal {} paid out ({} ETB, ref {})",
                    withdrawal_id, withdrawal.amount_etb, provider_ref
                );

                let group = Group::User(withdrawal.user_id.clone());
                self.sink.emit(
                    group.clone(),
                    DomainEvent::WithdrawalPaid {
                        id: withdrawal.id.clone(),
                        amount_etb: withdrawal.amount_etb,
                    },
                );
                self.sink.emit(group, DomainEvent::wallet_updated(&wallet));
                Ok(())
            }
            PayoutOutcome::Failed { reason } => {
                warn!("payout for withdrawal {} failed: {}", withdrawal_id, reason);
                self.withdrawals
                    .record_payout_failure(withdrawal_id, &reason)
                    .await
            }
        }
    }
}
