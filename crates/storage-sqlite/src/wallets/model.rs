//! Database model for wallets.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;

use amora_core::wallets::Wallet;

use crate::utils::{dec_to_text, new_id, now_naive, text_to_dec, to_utc};

#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::wallets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WalletDb {
    pub id: String,
    pub user_id: String,
    pub coin_balance: i64,
    pub balance_etb: String,
    pub hold_etb: String,
    pub kyc_level: i32,
    pub withdrawals_blocked: bool,
    pub is_banned: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WalletDb {
    pub fn fresh(owner: &str) -> Self {
        let now = now_naive();
        Self {
            id: new_id(),
            user_id: owner.to_string(),
            coin_balance: 0,
            balance_etb: dec_to_text(Decimal::ZERO),
            hold_etb: dec_to_text(Decimal::ZERO),
            kyc_level: 1,
            withdrawals_blocked: false,
            is_banned: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn balance(&self) -> Decimal {
        text_to_dec(&self.balance_etb, "wallets.balance_etb")
    }

    pub fn hold(&self) -> Decimal {
        text_to_dec(&self.hold_etb, "wallets.hold_etb")
    }
}

impl From<WalletDb> for Wallet {
    fn from(db: WalletDb) -> Self {
        let balance_etb = text_to_dec(&db.balance_etb, "wallets.balance_etb");
        let hold_etb = text_to_dec(&db.hold_etb, "wallets.hold_etb");
        Self {
            id: db.id,
            user_id: db.user_id,
            coin_balance: db.coin_balance.max(0) as u64,
            balance_etb,
            hold_etb,
            kyc_level: db.kyc_level.clamp(0, u8::MAX as i32) as u8,
            withdrawals_blocked: db.withdrawals_blocked,
            is_banned: db.is_banned,
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        }
    }
}
