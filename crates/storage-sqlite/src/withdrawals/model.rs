//! Database model for withdrawal requests.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::error;

use amora_core::withdrawals::{
    NewWithdrawal, WithdrawalMethod, WithdrawalRequest, WithdrawalStatus,
};

use crate::utils::{dec_to_text, new_id, now_naive, text_to_dec, to_utc};

#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::withdrawal_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WithdrawalRequestDb {
    pub id: String,
    pub user_id: String,
    pub method: String,
    pub destination: String,
    pub amount_etb: String,
    pub status: String,
    pub provider_ref: Option<String>,
    pub failure_reason: Option<String>,
    pub approved_at: Option<NaiveDateTime>,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WithdrawalRequestDb {
    pub fn pending(owner: &str, new_withdrawal: &NewWithdrawal) -> Self {
        let now = now_naive();
        Self {
            id: new_id(),
            user_id: owner.to_string(),
            method: new_withdrawal.method.as_str().to_string(),
            destination: new_withdrawal.destination.clone(),
            amount_etb: dec_to_text(new_withdrawal.amount_etb),
            status: WithdrawalStatus::Pending.as_str().to_string(),
            provider_ref: None,
            failure_reason: None,
            approved_at: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn amount(&self) -> rust_decimal::Decimal {
        text_to_dec(&self.amount_etb, "withdrawal_requests.amount_etb")
    }
}

impl From<WithdrawalRequestDb> for WithdrawalRequest {
    fn from(db: WithdrawalRequestDb) -> Self {
        let status = db.status.parse::<WithdrawalStatus>().unwrap_or_else(|_| {
            error!("withdrawal {} has unknown status '{}'", db.id, db.status);
            WithdrawalStatus::Rejected
        });
        let method = db.method.parse::<WithdrawalMethod>().unwrap_or_else(|_| {
            error!("withdrawal {} has unknown method '{}'", db.id, db.method);
            WithdrawalMethod::Chapa
        });
        Self {
            id: db.id,
            user_id: db.user_id,
            method,
            destination: db.destination,
            amount_etb: text_to_dec(&db.amount_etb, "withdrawal_requests.amount_etb"),
            status,
            provider_ref: db.provider_ref,
            failure_reason: db.failure_reason,
            approved_at: db.approved_at.map(to_utc),
            paid_at: db.paid_at.map(to_utc),
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        }
    }
}
