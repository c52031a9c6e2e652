//! Gift send engine.

use std::sync::Arc;

use log::{info, warn};
use rust_decimal::Decimal;
use serde_json::json;

use super::gifts_model::{Gift, GiftSendOutcome, GiftSendRequest};
use super::gifts_traits::{GiftRepositoryTrait, GiftTransactionRepositoryTrait, RecordGiftSend};
use crate::audit::{events, AuditLogRepositoryTrait};
use crate::config::PaymentConfig;
use crate::constants::GIFT_MAX_QUANTITY;
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, EventSink, Group};
use crate::money::split_gift;
use crate::users::UserRepositoryTrait;
use crate::wallets::WalletRepositoryTrait;

pub struct GiftService {
    gifts: Arc<dyn GiftRepositoryTrait>,
    gift_transactions: Arc<dyn GiftTransactionRepositoryTrait>,
    wallets: Arc<dyn WalletRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    audit: Arc<dyn AuditLogRepositoryTrait>,
    sink: Arc<dyn EventSink>,
    config: Arc<PaymentConfig>,
}

impl GiftService {
    pub fn new(
        gifts: Arc<dyn GiftRepositoryTrait>,
        gift_transactions: Arc<dyn GiftTransactionRepositoryTrait>,
        wallets: Arc<dyn WalletRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        audit: Arc<dyn AuditLogRepositoryTrait>,
        sink: Arc<dyn EventSink>,
        config: Arc<PaymentConfig>,
    ) -> Self {
        Self {
            gifts,
            gift_transactions,
            wallets,
            users,
            audit,
            sink,
            config,
        }
    }

    pub fn list_gifts(&self) -> Result<Vec<Gift>> {
        self.gifts.list_active()
    }

    /// Sends a gift. Guards fail without touching state; once past them,
    /// the whole movement happens in one ledger transaction.
    pub async fn send_gift(
        &self,
        sender_id: &str,
        request: GiftSendRequest,
    ) -> Result<GiftSendOutcome> {
        if request.quantity == 0 || request.quantity > GIFT_MAX_QUANTITY {
            return Err(ValidationError::InvalidInput(format!(
                "quantity must be between 1 and {GIFT_MAX_QUANTITY}"
            ))
            .into());
        }
        if sender_id == request.recipient_id {
            return Err(Error::SelfGift);
        }

        let gift = self
            .gifts
            .get_active(&request.gift_id)?
            .ok_or_else(|| Error::InvalidGift(request.gift_id.clone()))?;

        if self.users.get_by_id(&request.recipient_id)?.is_none() {
            return Err(Error::InvalidRecipient(request.recipient_id.clone()));
        }

        let sender_wallet = self.wallets.get_or_create(sender_id).await?;
        if sender_wallet.is_banned {
            return Err(Error::SenderBanned);
        }
        self.wallets.get_or_create(&request.recipient_id).await?;

        let quantity = request.quantity;
        let total_coins = gift.coins * u64::from(quantity);
        let total_value = gift.value_etb * Decimal::from(quantity);
        let split = split_gift(total_value, self.config.commission_rate, self.config.vat_rate);

        let outcome = self
            .gift_transactions
            .record_send(RecordGiftSend {
                sender_id: sender_id.to_string(),
                recipient_id: request.recipient_id.clone(),
                gift_id: gift.id.clone(),
                gift_name: gift.name.clone(),
                quantity,
                total_coins,
                total_value,
                split,
                message: request.message.clone(),
            })
            .await;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(Error::InsufficientCoins) => return Err(Error::InsufficientCoins),
            Err(err) => {
                // Rollback already restored balances; keep a trace.
                warn!("gift send from {} failed: {}", sender_id, err);
                let _ = self
                    .audit
                    .append(
                        sender_id,
                        events::GIFT_SEND_FAILED,
                        json!({
                            "error": err.to_string(),
                            "recipient_id": request.recipient_id,
                            "gift_id": request.gift_id,
                        }),
                    )
                    .await;
                return Err(err);
            }
        };

        info!(
            "gift {} x{} sent {} -> {}",
            gift.name, quantity, sender_id, request.recipient_id
        );
        self.emit_events(&outcome);
        Ok(outcome)
    }

    // Realtime events after commit; best-effort by construction.
    fn emit_events(&self, outcome: &GiftSendOutcome) {
        let tx = &outcome.transaction;
        let sender = Group::User(tx.sender_id.clone());
        let recipient = Group::User(tx.recipient_id.clone());

        self.sink.emit(
            sender.clone(),
            DomainEvent::GiftSent {
                tx_id: tx.id.clone(),
                gift: tx.gift_name.clone(),
                coins: tx.coins_spent,
                value_etb: tx.value_etb,
            },
        );
        self.sink.emit(
            recipient.clone(),
            DomainEvent::GiftReceived {
                tx_id: tx.id.clone(),
                gift: tx.gift_name.clone(),
                coins: tx.coins_spent,
                value_etb: tx.value_etb,
                creator_payout: tx.creator_payout,
            },
        );
        self.sink.emit(
            sender,
            DomainEvent::wallet_updated(&outcome.sender_wallet),
        );
        self.sink.emit(
            recipient,
            DomainEvent::wallet_updated(&outcome.recipient_wallet),
        );
    }
}
