use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::json;

use amora_core::audit::events;
use amora_core::errors::{Error, Result};
use amora_core::money::round2;
use amora_core::payments::{
    NewPayment, Payment, PaymentRepositoryTrait, PaymentStatus, Receipt, SettleTopUp,
    SettlementOutcome,
};

use super::model::{CoinPackageDb, PaymentDb, ReceiptDb};
use crate::audit::append_tx;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{coin_packages, payments, receipts};
use crate::utils::{dec_to_text, new_id, now_naive, text_to_dec, to_naive};
use crate::wallets::{credit_coins_tx, get_or_create_tx};

pub struct PaymentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PaymentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PaymentRepositoryTrait for PaymentRepository {
    async fn create_initiated(&self, new_payment: NewPayment) -> Result<Payment> {
        self.writer
            .exec(move |conn| {
                let row = PaymentDb::from_new(new_payment);
                diesel::insert_into(payments::table)
                    .values(&row)
                    .execute(conn)?;
                Ok(row.into())
            })
            .await
    }

    async fn attach_checkout(&self, payment_id: &str, checkout_url: &str) -> Result<Payment> {
        let pid = payment_id.to_string();
        let url = checkout_url.to_string();
        self.writer
            .exec(move |conn| {
                diesel::update(payments::table.find(&pid))
                    .set((
                        payments::checkout_url.eq(&url),
                        payments::updated_at.eq(now_naive()),
                    ))
                    .execute(conn)?;
                let row = payments::table
                    .select(PaymentDb::as_select())
                    .find(&pid)
                    .first::<PaymentDb>(conn)?;
                Ok(row.into())
            })
            .await
    }

    fn get_by_id(&self, payment_id: &str) -> Result<Option<Payment>> {
        let mut conn = get_connection(&self.pool)?;
        payments::table
            .select(PaymentDb::as_select())
            .find(payment_id)
            .first::<PaymentDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(Payment::from))
    }

    fn get_by_tx_ref(&self, tx_ref: &str) -> Result<Option<Payment>> {
        let mut conn = get_connection(&self.pool)?;
        payments::table
            .select(PaymentDb::as_select())
            .filter(payments::tx_ref.eq(tx_ref))
            .first::<PaymentDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(Payment::from))
    }

    fn get_receipt(&self, payment_id: &str) -> Result<Option<Receipt>> {
        let mut conn = get_connection(&self.pool)?;
        receipts::table
            .select(ReceiptDb::as_select())
            .filter(receipts::payment_id.eq(payment_id))
            .first::<ReceiptDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(Receipt::from))
    }

    async fn settle_success(&self, settle: SettleTopUp) -> Result<SettlementOutcome> {
        self.writer
            .exec(move |conn| {
                // The webhook keys on our tx_ref; replays of older
                // callbacks may instead carry the provider's reference.
                let row = payments::table
                    .select(PaymentDb::as_select())
                    .filter(
                        payments::tx_ref
                            .eq(settle.tx_ref.as_str())
                            .or(payments::provider_ref.eq(settle.tx_ref.as_str())),
                    )
                    .first::<PaymentDb>(conn)
                    .optional()?
                    .ok_or_else(|| {
                        Error::NotFound(format!("payment for tx_ref {}", settle.tx_ref))
                    })?;

                if row.status == PaymentStatus::Success.as_str() {
                    return Ok(SettlementOutcome::AlreadySettled {
                        payment: row.into(),
                    });
                }

                let package = coin_packages::table
                    .select(CoinPackageDb::as_select())
                    .find(&row.package_id)
                    .first::<CoinPackageDb>(conn)?;

                // Gateway fee: prefer what the provider reported, fall
                // back to the residual of the grossed price. A mismatch
                // between the two is flagged in the audit trail.
                let price_total = text_to_dec(&row.price_total_etb, "payments.price_total_etb");
                let vat = text_to_dec(&row.vat_etb, "payments.vat_etb");
                let base = text_to_dec(&package.base_etb, "coin_packages.base_etb");
                let residual_fee = round2(price_total - base - vat);
                let gw_fee = settle.provider_fee.map(round2).unwrap_or(residual_fee);

                let provider_ref = settle
                    .provider_ref
                    .clone()
                    .or_else(|| row.provider_ref.clone())
                    .unwrap_or_else(|| settle.tx_ref.clone());

                diesel::update(payments::table.find(&row.id))
                    .set((
                        payments::status.eq(PaymentStatus::Success.as_str()),
                        payments::provider_ref.eq(Some(provider_ref.clone())),
                        payments::gw_fee_etb.eq(Some(dec_to_text(gw_fee))),
                        payments::updated_at.eq(now_naive()),
                    ))
                    .execute(conn)?;

                let before = get_or_create_tx(conn, &row.user_id)?;
                let coins_credited = package.coins.max(0) as u64;
                let wallet = credit_coins_tx(conn, &row.user_id, coins_credited)?;

                let receipt_exists = receipts::table
                    .select(ReceiptDb::as_select())
                    .filter(receipts::payment_id.eq(&row.id))
                    .first::<ReceiptDb>(conn)
                    .optional()?
                    .is_some();
                if !receipt_exists {
                    let receipt = ReceiptDb {
                        id: new_id(),
                        payment_id: row.id.clone(),
                        price_etb: row.price_total_etb.clone(),
                        vat_etb: row.vat_etb.clone(),
                        provider_ref: provider_ref.clone(),
                        created_at: now_naive(),
                    };
                    diesel::insert_into(receipts::table)
                        .values(&receipt)
                        .execute(conn)?;
                }

                append_tx(
                    conn,
                    &row.user_id,
                    events::PAYMENT_SUCCESS,
                    &json!({
                        "payment_id": row.id,
                        "provider": row.provider,
                        "provider_ref": provider_ref,
                        "credited_coins": coins_credited,
                        "balance_before": before.coin_balance,
                        "balance_after": wallet.coin_balance,
                    }),
                )?;

                if let Some(reported) = settle.provider_fee.map(round2) {
                    if reported != residual_fee {
                        append_tx(
                            conn,
                            &row.user_id,
                            events::GW_FEE_MISMATCH,
                            &json!({
                                "payment_id": row.id,
                                "reported_fee": reported.to_string(),
                                "residual_fee": residual_fee.to_string(),
                            }),
                        )?;
                    }
                }

                let settled = payments::table
                    .select(PaymentDb::as_select())
                    .find(&row.id)
                    .first::<PaymentDb>(conn)?;

                Ok(SettlementOutcome::Credited {
                    payment: settled.into(),
                    wallet: wallet.into(),
                    coins_credited,
                })
            })
            .await
    }

    fn count_success_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u64> {
        let mut conn = get_connection(&self.pool)?;
        payments::table
            .filter(payments::user_id.eq(user_id))
            .filter(payments::status.eq(PaymentStatus::Success.as_str()))
            .filter(payments::updated_at.ge(to_naive(since)))
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()
            .map(|count| count.max(0) as u64)
    }
}
