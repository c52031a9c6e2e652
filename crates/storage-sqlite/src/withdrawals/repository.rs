use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use serde_json::json;

use amora_core::audit::events;
use amora_core::errors::{Error, Result};
use amora_core::wallets::Wallet;
use amora_core::withdrawals::{
    NewWithdrawal, WithdrawalRepositoryTrait, WithdrawalRequest, WithdrawalStatus,
    WithdrawalTotals,
};

use super::model::WithdrawalRequestDb;
use crate::audit::append_tx;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::withdrawal_requests;
use crate::utils::{now_naive, text_to_dec, to_naive};
use crate::wallets::{get_or_create_tx, get_wallet_tx, update_money_tx};

pub struct WithdrawalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl WithdrawalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn get_by_id_tx(
    conn: &mut SqliteConnection,
    withdrawal_id: &str,
) -> std::result::Result<Option<WithdrawalRequestDb>, StorageError> {
    Ok(withdrawal_requests::table
        .select(WithdrawalRequestDb::as_select())
        .find(withdrawal_id)
        .first::<WithdrawalRequestDb>(conn)
        .optional()?)
}

fn require_status(
    row: &WithdrawalRequestDb,
    expected: WithdrawalStatus,
    action: &str,
) -> std::result::Result<(), StorageError> {
    if row.status != expected.as_str() {
        return Err(Error::InvalidState(format!(
            "only {} withdrawals can be {action}, found {}",
            expected.as_str(),
            row.status
        ))
        .into());
    }
    Ok(())
}

#[async_trait]
impl WithdrawalRepositoryTrait for WithdrawalRepository {
    async fn create_pending(
        &self,
        user_id: &str,
        new_withdrawal: NewWithdrawal,
    ) -> Result<WithdrawalRequest> {
        let owner = user_id.to_string();
        self.writer
            .exec(move |conn| {
                let wallet = get_or_create_tx(conn, &owner)?;
                let amount = new_withdrawal.amount_etb;

                // The service already checked; re-check under the writer
                // so a racing payout or gift cannot overspend the hold.
                let available = wallet.balance() - wallet.hold();
                if amount > available {
                    return Err(Error::InsufficientAvailable.into());
                }

                update_money_tx(conn, &owner, wallet.balance(), wallet.hold() + amount)?;

                let row = WithdrawalRequestDb::pending(&owner, &new_withdrawal);
                diesel::insert_into(withdrawal_requests::table)
                    .values(&row)
                    .execute(conn)?;

                append_tx(
                    conn,
                    &owner,
                    events::WITHDRAWAL_REQUESTED,
                    &json!({
                        "withdrawal_id": row.id,
                        "amount": row.amount_etb,
                        "method": row.method,
                        "destination": row.destination,
                    }),
                )?;

                Ok(row.into())
            })
            .await
    }

    fn get_by_id(&self, withdrawal_id: &str) -> Result<Option<WithdrawalRequest>> {
        let mut conn = get_connection(&self.pool)?;
        withdrawal_requests::table
            .select(WithdrawalRequestDb::as_select())
            .find(withdrawal_id)
            .first::<WithdrawalRequestDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(WithdrawalRequest::from))
    }

    fn list(&self, status: Option<WithdrawalStatus>) -> Result<Vec<WithdrawalRequest>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = withdrawal_requests::table.into_boxed();
        if let Some(status) = status {
            query = query.filter(withdrawal_requests::status.eq(status.as_str()));
        }
        query
            .select(WithdrawalRequestDb::as_select())
            .order(withdrawal_requests::created_at.desc())
            .load::<WithdrawalRequestDb>(&mut conn)
            .into_core()
            .map(|rows| rows.into_iter().map(WithdrawalRequest::from).collect())
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<WithdrawalRequest>> {
        let mut conn = get_connection(&self.pool)?;
        withdrawal_requests::table
            .select(WithdrawalRequestDb::as_select())
            .filter(withdrawal_requests::user_id.eq(user_id))
            .order(withdrawal_requests::created_at.desc())
            .load::<WithdrawalRequestDb>(&mut conn)
            .into_core()
            .map(|rows| rows.into_iter().map(WithdrawalRequest::from).collect())
    }

    fn totals_since(
        &self,
        user_id: &str,
        day_start: DateTime<Utc>,
        month_start: DateTime<Utc>,
    ) -> Result<WithdrawalTotals> {
        let mut conn = get_connection(&self.pool)?;
        // Non-REJECTED requests inside the month window; the day total
        // is a subset, so one query covers both.
        let rows: Vec<(String, chrono::NaiveDateTime)> = withdrawal_requests::table
            .select((
                withdrawal_requests::amount_etb,
                withdrawal_requests::created_at,
            ))
            .filter(withdrawal_requests::user_id.eq(user_id))
            .filter(withdrawal_requests::status.ne(WithdrawalStatus::Rejected.as_str()))
            .filter(withdrawal_requests::created_at.ge(to_naive(month_start)))
            .load(&mut conn)
            .into_core()?;

        let day_naive = to_naive(day_start);
        let mut totals = WithdrawalTotals::default();
        for (amount, created) in rows {
            let amount = text_to_dec(&amount, "withdrawal_requests.amount_etb");
            totals.last_month_etb += amount;
            if created >= day_naive {
                totals.last_day_etb += amount;
            }
        }
        Ok(totals)
    }

    async fn approve(&self, withdrawal_id: &str) -> Result<WithdrawalRequest> {
        let wid = withdrawal_id.to_string();
        self.writer
            .exec(move |conn| {
                let row = get_by_id_tx(conn, &wid)?
                    .ok_or_else(|| Error::NotFound(format!("withdrawal {wid}")))?;
                require_status(&row, WithdrawalStatus::Pending, "approved")?;

                let now = now_naive();
                diesel::update(withdrawal_requests::table.find(&wid))
                    .set((
                        withdrawal_requests::status.eq(WithdrawalStatus::Approved.as_str()),
                        withdrawal_requests::approved_at.eq(Some(now)),
                        withdrawal_requests::updated_at.eq(now),
                    ))
                    .execute(conn)?;

                append_tx(
                    conn,
                    &row.user_id,
                    events::WITHDRAWAL_APPROVED,
                    &json!({
                        "withdrawal_id": row.id,
                        "amount": row.amount_etb,
                        "method": row.method,
                    }),
                )?;

                let updated = get_by_id_tx(conn, &wid)?
                    .ok_or_else(|| Error::NotFound(format!("withdrawal {wid}")))?;
                Ok(updated.into())
            })
            .await
    }

    async fn reject(
        &self,
        withdrawal_id: &str,
        reason: &str,
    ) -> Result<(WithdrawalRequest, Wallet)> {
        let wid = withdrawal_id.to_string();
        let reason = reason.to_string();
        self.writer
            .exec(move |conn| {
                let row = get_by_id_tx(conn, &wid)?
                    .ok_or_else(|| Error::NotFound(format!("withdrawal {wid}")))?;
                require_status(&row, WithdrawalStatus::Pending, "rejected")?;

                // Release the hold back to available.
                let wallet = get_wallet_tx(conn, &row.user_id)?;
                let released = (wallet.hold() - row.amount()).max(Decimal::ZERO);
                update_money_tx(conn, &row.user_id, wallet.balance(), released)?;

                diesel::update(withdrawal_requests::table.find(&wid))
                    .set((
                        withdrawal_requests::status.eq(WithdrawalStatus::Rejected.as_str()),
                        withdrawal_requests::failure_reason.eq(Some(reason.clone())),
                        withdrawal_requests::updated_at.eq(now_naive()),
                    ))
                    .execute(conn)?;

                append_tx(
                    conn,
                    &row.user_id,
                    events::WITHDRAWAL_REJECTED,
                    &json!({ "withdrawal_id": row.id, "reason": reason }),
                )?;

                let updated = get_by_id_tx(conn, &wid)?
                    .ok_or_else(|| Error::NotFound(format!("withdrawal {wid}")))?;
                let wallet = get_wallet_tx(conn, &row.user_id)?;
                Ok((updated.into(), wallet.into()))
            })
            .await
    }

    async fn settle_paid(
        &self,
        withdrawal_id: &str,
        provider_ref: &str,
    ) -> Result<(WithdrawalRequest, Wallet)> {
        let wid = withdrawal_id.to_string();
        let reference = provider_ref.to_string();
        self.writer
            .exec(move |conn| {
                let row = get_by_id_tx(conn, &wid)?
                    .ok_or_else(|| Error::NotFound(format!("withdrawal {wid}")))?;
                require_status(&row, WithdrawalStatus::Approved, "paid")?;

                let wallet = get_wallet_tx(conn, &row.user_id)?;
                let amount = row.amount();
                let balance = wallet.balance() - amount;
                let hold = (wallet.hold() - amount).max(Decimal::ZERO);
                update_money_tx(conn, &row.user_id, balance, hold)?;

                let now = now_naive();
                diesel::update(withdrawal_requests::table.find(&wid))
                    .set((
                        withdrawal_requests::status.eq(WithdrawalStatus::Paid.as_str()),
                        withdrawal_requests::provider_ref.eq(Some(reference.clone())),
                        withdrawal_requests::paid_at.eq(Some(now)),
                        withdrawal_requests::updated_at.eq(now),
                    ))
                    .execute(conn)?;

                append_tx(
                    conn,
                    &row.user_id,
                    events::WITHDRAWAL_PAID,
                    &json!({
                        "withdrawal_id": row.id,
                        "amount": row.amount_etb,
                        "provider_ref": reference,
                    }),
                )?;

                let updated = get_by_id_tx(conn, &wid)?
                    .ok_or_else(|| Error::NotFound(format!("withdrawal {wid}")))?;
                let wallet = get_wallet_tx(conn, &row.user_id)?;
                Ok((updated.into(), wallet.into()))
            })
            .await
    }

    async fn record_payout_failure(&self, withdrawal_id: &str, reason: &str) -> Result<()> {
        let wid = withdrawal_id.to_string();
        let reason = reason.to_string();
        self.writer
            .exec(move |conn| {
                diesel::update(withdrawal_requests::table.find(&wid))
                    .set((
                        withdrawal_requests::failure_reason.eq(Some(reason)),
                        withdrawal_requests::updated_at.eq(now_naive()),
                    ))
                    .execute(conn)?;
                Ok(())
            })
            .await
    }

    fn top_destination_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<(String, u64)>> {
        let mut conn = get_connection(&self.pool)?;
        let destinations: Vec<String> = withdrawal_requests::table
            .select(withdrawal_requests::destination)
            .filter(withdrawal_requests::user_id.eq(user_id))
            .filter(withdrawal_requests::created_at.ge(to_naive(since)))
            .load::<String>(&mut conn)
            .into_core()?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for destination in destinations {
            *counts.entry(destination).or_insert(0) += 1;
        }
        Ok(counts.into_iter().max_by_key(|(_, count)| *count))
    }
}
