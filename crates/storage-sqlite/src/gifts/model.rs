//! Database models for the gift catalog and gift transactions.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::error;

use amora_core::gifts::{Gift, GiftTransaction, GiftTransactionStatus, RecordGiftSend};

use crate::utils::{dec_to_text, new_id, now_naive, text_to_dec, to_utc};

#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::gifts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GiftDb {
    pub id: String,
    pub name: String,
    pub coins: i64,
    pub value_etb: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<GiftDb> for Gift {
    fn from(db: GiftDb) -> Self {
        Self {
            id: db.id,
            name: db.name,
            coins: db.coins.max(0) as u64,
            value_etb: text_to_dec(&db.value_etb, "gifts.value_etb"),
            is_active: db.is_active,
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        }
    }
}

impl From<Gift> for GiftDb {
    fn from(gift: Gift) -> Self {
        let now = now_naive();
        Self {
            id: if gift.id.is_empty() { new_id() } else { gift.id },
            name: gift.name,
            coins: gift.coins as i64,
            value_etb: dec_to_text(gift.value_etb),
            is_active: gift.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::gift_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GiftTransactionDb {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub gift_id: String,
    pub gift_name: String,
    pub quantity: i32,
    pub coins_spent: i64,
    pub value_etb: String,
    pub commission_gross: String,
    pub vat_on_commission: String,
    pub commission_net: String,
    pub creator_payout: String,
    pub status: String,
    pub failure_reason: Option<String>,
    pub message: Option<String>,
    pub created_at: NaiveDateTime,
}

impl GiftTransactionDb {
    pub fn success(send: &RecordGiftSend) -> Self {
        Self {
            id: new_id(),
            sender_id: send.sender_id.clone(),
            recipient_id: send.recipient_id.clone(),
            gift_id: send.gift_id.clone(),
            gift_name: send.gift_name.clone(),
            quantity: send.quantity as i32,
            coins_spent: send.total_coins as i64,
            value_etb: dec_to_text(send.total_value),
            commission_gross: dec_to_text(send.split.commission_gross),
            vat_on_commission: dec_to_text(send.split.vat_on_commission),
            commission_net: dec_to_text(send.split.commission_net),
            creator_payout: dec_to_text(send.split.creator_payout),
            status: GiftTransactionStatus::Success.as_str().to_string(),
            failure_reason: None,
            message: send.message.clone(),
            created_at: now_naive(),
        }
    }
}

impl From<GiftTransactionDb> for GiftTransaction {
    fn from(db: GiftTransactionDb) -> Self {
        let status = db
            .status
            .parse::<GiftTransactionStatus>()
            .unwrap_or_else(|_| {
                error!("gift transaction {} has unknown status '{}'", db.id, db.status);
                GiftTransactionStatus::Failed
            });
        Self {
            id: db.id,
            sender_id: db.sender_id,
            recipient_id: db.recipient_id,
            gift_id: db.gift_id,
            gift_name: db.gift_name,
            quantity: db.quantity.max(0) as u32,
            coins_spent: db.coins_spent.max(0) as u64,
            value_etb: text_to_dec(&db.value_etb, "gift_transactions.value_etb"),
            commission_gross: text_to_dec(
                &db.commission_gross,
                "gift_transactions.commission_gross",
            ),
            vat_on_commission: text_to_dec(
                &db.vat_on_commission,
                "gift_transactions.vat_on_commission",
            ),
            commission_net: text_to_dec(&db.commission_net, "gift_transactions.commission_net"),
            creator_payout: text_to_dec(&db.creator_payout, "gift_transactions.creator_payout"),
            status,
            failure_reason: db.failure_reason,
            message: db.message,
            created_at: to_utc(db.created_at),
        }
    }
}
