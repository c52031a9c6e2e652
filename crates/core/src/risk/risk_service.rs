//! Risk engine.
//!
//! Evaluates three tunable rules over rolling windows and toggles the
//! per-wallet `withdrawals_blocked` flag. Re-entrant: it runs after
//! money-moving events for one user and periodically across all users.

use std::sync::Arc;

use chrono::{Duration, Utc};
use log::{info, warn};
use serde_json::json;

use crate::audit::{events, AuditLogRepositoryTrait};
use crate::config::PaymentConfig;
use crate::errors::Result;
use crate::events::{DomainEvent, EventSink, Group};
use crate::gifts::GiftTransactionRepositoryTrait;
use crate::payments::PaymentRepositoryTrait;
use crate::users::UserRepositoryTrait;
use crate::wallets::WalletRepositoryTrait;
use crate::withdrawals::WithdrawalRepositoryTrait;

pub struct RiskService {
    payments: Arc<dyn PaymentRepositoryTrait>,
    gift_transactions: Arc<dyn GiftTransactionRepositoryTrait>,
    withdrawals: Arc<dyn WithdrawalRepositoryTrait>,
    wallets: Arc<dyn WalletRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    audit: Arc<dyn AuditLogRepositoryTrait>,
    sink: Arc<dyn EventSink>,
    config: Arc<PaymentConfig>,
}

impl RiskService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        payments: Arc<dyn PaymentRepositoryTrait>,
        gift_transactions: Arc<dyn GiftTransactionRepositoryTrait>,
        withdrawals: Arc<dyn WithdrawalRepositoryTrait>,
        wallets: Arc<dyn WalletRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        audit: Arc<dyn AuditLogRepositoryTrait>,
        sink: Arc<dyn EventSink>,
        config: Arc<PaymentConfig>,
    ) -> Self {
        Self {
            payments,
            gift_transactions,
            withdrawals,
            wallets,
            users,
            audit,
            sink,
            config,
        }
    }

    /// Evaluates every rule for one user. Pure with respect to wallet
    /// state: only reads activity windows.
    pub fn evaluate_rules(&self, user_id: &str) -> Result<Vec<String>> {
        let now = Utc::now();
        let risk = &self.config.risk;
        let mut reasons = Vec::new();

        let topups = self
            .payments
            .count_success_since(user_id, now - Duration::minutes(risk.topups_window_min))?;
        if topups >= risk.topups_count {
            reasons.push(format!(
                "excessive_topups:{} in {}m",
                topups, risk.topups_window_min
            ));
        }

        let gifts_sum = self
            .gift_transactions
            .sum_received_since(user_id, now - Duration::minutes(risk.gifts_window_min))?;
        if gifts_sum >= risk.gifts_etb_threshold {
            reasons.push(format!(
                "large_gifts:{} in {}m",
                gifts_sum, risk.gifts_window_min
            ));
        }

        if let Some((destination, count)) = self.withdrawals.top_destination_since(
            user_id,
            now - Duration::minutes(risk.withdrawals_window_min),
        )? {
            if count >= risk.withdrawals_same_dest_threshold {
                reasons.push(format!("repeat_withdraw_destination:{destination} x{count}"));
            }
        }

        Ok(reasons)
    }

    /// Evaluates and applies the block flag for one user.
    pub async fn evaluate_user(&self, user_id: &str) -> Result<Vec<String>> {
        let reasons = self.evaluate_rules(user_id)?;

        if reasons.is_empty() {
            let was_blocked = self.wallets.set_withdrawals_blocked(user_id, false).await?;
            if was_blocked {
                info!("risk cleared for user {}", user_id);
                self.audit
                    .append(user_id, events::RISK_CLEARED, json!({}))
                    .await?;
            }
        } else {
            let was_blocked = self.wallets.set_withdrawals_blocked(user_id, true).await?;
            if !was_blocked {
                info!("risk flagged for user {}: {:?}", user_id, reasons);
            }
            self.audit
                .append(user_id, events::RISK_FLAGGED, json!({ "reasons": reasons }))
                .await?;
            self.sink.emit(
                Group::Admins,
                DomainEvent::RiskFlagged {
                    user_id: user_id.to_string(),
                    reasons: reasons.clone(),
                },
            );
        }

        Ok(reasons)
    }

    /// Periodic sweep across all users. Per-user failures are logged and
    /// skipped so one bad row never stalls the sweep.
    pub async fn sweep(&self) -> Result<usize> {
        let mut flagged = 0;
        for user_id in self.users.list_ids()? {
            match self.evaluate_user(&user_id).await {
                Ok(reasons) if !reasons.is_empty() => flagged += 1,
                Ok(_) => {}
                Err(err) => warn!("risk evaluation failed for {}: {}", user_id, err),
            }
        }
        Ok(flagged)
    }
}
