//! Webhook settlement.
//!
//! The endpoint is reachable without authentication, so nothing is
//! trusted from the callback itself: settlement always re-verifies the
//! transaction server-to-server and the ledger operation is idempotent
//! on the payment row.

use std::sync::Arc;

use log::{info, warn};
use serde::Deserialize;

use super::payments_traits::{PaymentRepositoryTrait, SettleTopUp, SettlementOutcome};
use crate::constants::SUB_TX_REF_PREFIX;
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, EventSink, Group};
use crate::providers::PaymentProviderTrait;
use crate::subscriptions::{ActivationOutcome, SubscriptionRepositoryTrait};

/// Callback payload; the provider uses both `tx_ref` and `trx_ref`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WebhookEvent {
    pub tx_ref: Option<String>,
    pub trx_ref: Option<String>,
    pub status: Option<String>,
    pub reference: Option<String>,
}

impl WebhookEvent {
    pub fn tx_ref(&self) -> Option<&str> {
        self.tx_ref.as_deref().or(self.trx_ref.as_deref())
    }
}

/// How the webhook was handled. All variants acknowledge with 200.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookAck {
    /// Non-success status or failed re-verification; no state change.
    Ignored,
    /// Replay of an already settled event; no state change.
    Idempotent,
    /// Coins were credited to this user.
    Settled { user_id: String },
    /// A subscription perk was activated.
    Activated,
}

pub struct SettlementService {
    payments: Arc<dyn PaymentRepositoryTrait>,
    subscriptions: Arc<dyn SubscriptionRepositoryTrait>,
    provider: Arc<dyn PaymentProviderTrait>,
    sink: Arc<dyn EventSink>,
}

impl SettlementService {
    pub fn new(
        payments: Arc<dyn PaymentRepositoryTrait>,
        subscriptions: Arc<dyn SubscriptionRepositoryTrait>,
        provider: Arc<dyn PaymentProviderTrait>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            payments,
            subscriptions,
            provider,
            sink,
        }
    }

    /// Full webhook algorithm: extract, short-circuit non-success,
    /// re-verify, then settle idempotently.
    pub async fn handle(&self, event: WebhookEvent) -> Result<WebhookAck> {
        let tx_ref = event
            .tx_ref()
            .ok_or_else(|| -> Error {
                ValidationError::MissingField("tx_ref".to_string()).into()
            })?
            .to_string();

        let status = event.status.as_deref().unwrap_or_default();
        if !status.eq_ignore_ascii_case("success") {
            info!("webhook for {} ignored (status {})", tx_ref, status);
            return Ok(WebhookAck::Ignored);
        }

        // Security measure: never settle on the callback's word alone.
        let verification = self.provider.verify(&tx_ref).await?;
        if !verification.is_success() {
            warn!(
                "webhook verification for {} resulted in status {}",
                tx_ref, verification.status
            );
            return Ok(WebhookAck::Ignored);
        }

        if tx_ref.starts_with(&format!("{SUB_TX_REF_PREFIX}-")) {
            return self.activate_subscription(&tx_ref).await;
        }
        self.settle_topup(&tx_ref, verification.reference, verification.gateway_fee)
            .await
    }

    async fn settle_topup(
        &self,
        tx_ref: &str,
        provider_ref: Option<String>,
        provider_fee: Option<rust_decimal::Decimal>,
    ) -> Result<WebhookAck> {
        let outcome = self
            .payments
            .settle_success(SettleTopUp {
                tx_ref: tx_ref.to_string(),
                provider_ref,
                provider_fee,
            })
            .await?;

        match outcome {
            SettlementOutcome::AlreadySettled { payment } => {
                info!("webhook replay for settled payment {}", payment.id);
                Ok(WebhookAck::Idempotent)
            }
            SettlementOutcome::Credited {
                payment,
                wallet,
                coins_credited,
            } => {
                info!(
                    "settled payment {}: credited {} coins to user {}",
                    payment.id, coins_credited, payment.user_id
                );
                let group = Group::User(payment.user_id.clone());
                self.sink.emit(
                    group.clone(),
                    DomainEvent::PaymentSettled {
                        payment_id: payment.id.clone(),
                        coins_credited,
                    },
                );
                self.sink.emit(group, DomainEvent::wallet_updated(&wallet));
                Ok(WebhookAck::Settled {
                    user_id: payment.user_id,
                })
            }
        }
    }

    async fn activate_subscription(&self, tx_ref: &str) -> Result<WebhookAck> {
        match self.subscriptions.activate_by_tx_ref(tx_ref).await? {
            ActivationOutcome::AlreadyCompleted { .. } => Ok(WebhookAck::Idempotent),
            ActivationOutcome::Activated {
                purchase,
                expires_at,
            } => {
                self.sink.emit(
                    Group::User(purchase.user_id.clone()),
                    DomainEvent::SubscriptionActivated {
                        plan: purchase.plan.as_str().to_string(),
                        expires_at,
                    },
                );
                Ok(WebhookAck::Activated)
            }
        }
    }
}
