use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;

use amora_core::audit::events;
use amora_core::errors::{Error, Result};
use amora_core::gifts::{
    Gift, GiftRepositoryTrait, GiftSendOutcome, GiftTransaction, GiftTransactionRepositoryTrait,
    GiftTransactionStatus, RecordGiftSend,
};

use super::model::{GiftDb, GiftTransactionDb};
use crate::audit::append_tx;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{gift_transactions, gifts};
use crate::utils::{text_to_dec, to_naive};
use crate::wallets::{credit_balance_tx, get_or_create_tx, get_wallet_tx, try_debit_coins_tx};

pub struct GiftRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GiftRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl GiftRepositoryTrait for GiftRepository {
    fn list_active(&self) -> Result<Vec<Gift>> {
        let mut conn = get_connection(&self.pool)?;
        gifts::table
            .select(GiftDb::as_select())
            .filter(gifts::is_active.eq(true))
            .order(gifts::coins.asc())
            .load::<GiftDb>(&mut conn)
            .into_core()
            .map(|rows| rows.into_iter().map(Gift::from).collect())
    }

    fn get_active(&self, gift_id: &str) -> Result<Option<Gift>> {
        let mut conn = get_connection(&self.pool)?;
        gifts::table
            .select(GiftDb::as_select())
            .find(gift_id)
            .filter(gifts::is_active.eq(true))
            .first::<GiftDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(Gift::from))
    }

    async fn create(&self, gift: Gift) -> Result<Gift> {
        self.writer
            .exec(move |conn| {
                let row: GiftDb = gift.into();
                diesel::insert_into(gifts::table).values(&row).execute(conn)?;
                Ok(row.into())
            })
            .await
    }

    fn count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        gifts::table.count().get_result(&mut conn).into_core()
    }
}

pub struct GiftTransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GiftTransactionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl GiftTransactionRepositoryTrait for GiftTransactionRepository {
    async fn record_send(&self, send: RecordGiftSend) -> Result<GiftSendOutcome> {
        self.writer
            .exec(move |conn| {
                get_or_create_tx(conn, &send.sender_id)?;
                get_or_create_tx(conn, &send.recipient_id)?;

                // Conditional debit; zero rows means the balance lost a
                // race or was short all along. Rolls the whole
                // transaction back either way.
                if !try_debit_coins_tx(conn, &send.sender_id, send.total_coins)? {
                    return Err(Error::InsufficientCoins.into());
                }

                let recipient_wallet =
                    credit_balance_tx(conn, &send.recipient_id, send.split.creator_payout)?;
                let recipient_before =
                    recipient_wallet.balance() - send.split.creator_payout;

                let row = GiftTransactionDb::success(&send);
                diesel::insert_into(gift_transactions::table)
                    .values(&row)
                    .execute(conn)?;

                append_tx(
                    conn,
                    &send.sender_id,
                    events::GIFT_SENT,
                    &json!({
                        "tx_id": row.id,
                        "gift": send.gift_name,
                        "coins": send.total_coins,
                        "value_etb": send.total_value.to_string(),
                        "to": send.recipient_id,
                    }),
                )?;
                append_tx(
                    conn,
                    &send.recipient_id,
                    events::GIFT_RECEIVED,
                    &json!({
                        "tx_id": row.id,
                        "gift": send.gift_name,
                        "coins": send.total_coins,
                        "value_etb": send.total_value.to_string(),
                        "creator_payout": send.split.creator_payout.to_string(),
                        "from": send.sender_id,
                        "balance_before": recipient_before.to_string(),
                        "balance_after": recipient_wallet.balance().to_string(),
                    }),
                )?;

                let sender_wallet = get_wallet_tx(conn, &send.sender_id)?;
                Ok(GiftSendOutcome {
                    transaction: row.into(),
                    sender_wallet: sender_wallet.into(),
                    recipient_wallet: recipient_wallet.into(),
                })
            })
            .await
    }

    fn recent_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<GiftTransaction>> {
        let mut conn = get_connection(&self.pool)?;
        gift_transactions::table
            .select(GiftTransactionDb::as_select())
            .filter(
                gift_transactions::sender_id
                    .eq(user_id)
                    .or(gift_transactions::recipient_id.eq(user_id)),
            )
            .order(gift_transactions::created_at.desc())
            .limit(limit)
            .load::<GiftTransactionDb>(&mut conn)
            .into_core()
            .map(|rows| rows.into_iter().map(GiftTransaction::from).collect())
    }

    fn sum_received_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)?;
        let values: Vec<String> = gift_transactions::table
            .select(gift_transactions::value_etb)
            .filter(gift_transactions::recipient_id.eq(user_id))
            .filter(gift_transactions::status.eq(GiftTransactionStatus::Success.as_str()))
            .filter(gift_transactions::created_at.ge(to_naive(since)))
            .load::<String>(&mut conn)
            .into_core()?;

        Ok(values
            .iter()
            .map(|v| text_to_dec(v, "gift_transactions.value_etb"))
            .sum())
    }
}
