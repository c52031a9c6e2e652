//! Database models for coin packages, payments, and receipts.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::error;

use amora_core::payments::{
    CoinPackage, NewPayment, Payment, PaymentProvider, PaymentStatus, Receipt,
};

use crate::utils::{dec_to_text, new_id, now_naive, opt_text_to_dec, text_to_dec, to_utc};

#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::coin_packages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CoinPackageDb {
    pub id: String,
    pub name: String,
    pub target_net_etb: String,
    pub coins: i64,
    pub base_etb: String,
    pub vat_etb: String,
    pub price_total_etb: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<CoinPackageDb> for CoinPackage {
    fn from(db: CoinPackageDb) -> Self {
        Self {
            id: db.id,
            name: db.name,
            target_net_etb: text_to_dec(&db.target_net_etb, "coin_packages.target_net_etb"),
            coins: db.coins.max(0) as u64,
            base_etb: text_to_dec(&db.base_etb, "coin_packages.base_etb"),
            vat_etb: text_to_dec(&db.vat_etb, "coin_packages.vat_etb"),
            price_total_etb: text_to_dec(&db.price_total_etb, "coin_packages.price_total_etb"),
            is_active: db.is_active,
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        }
    }
}

impl From<CoinPackage> for CoinPackageDb {
    fn from(package: CoinPackage) -> Self {
        let now = now_naive();
        Self {
            id: if package.id.is_empty() {
                new_id()
            } else {
                package.id
            },
            name: package.name,
            target_net_etb: dec_to_text(package.target_net_etb),
            coins: package.coins as i64,
            base_etb: dec_to_text(package.base_etb),
            vat_etb: dec_to_text(package.vat_etb),
            price_total_etb: dec_to_text(package.price_total_etb),
            is_active: package.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PaymentDb {
    pub id: String,
    pub user_id: String,
    pub package_id: String,
    pub status: String,
    pub provider: String,
    pub tx_ref: String,
    pub provider_ref: Option<String>,
    pub checkout_url: Option<String>,
    pub price_total_etb: String,
    pub vat_etb: String,
    pub gw_fee_etb: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PaymentDb {
    pub fn from_new(new_payment: NewPayment) -> Self {
        let now = now_naive();
        Self {
            id: new_id(),
            user_id: new_payment.user_id,
            package_id: new_payment.package_id,
            status: PaymentStatus::Initiated.as_str().to_string(),
            provider: new_payment.provider.as_str().to_string(),
            tx_ref: new_payment.tx_ref,
            provider_ref: None,
            checkout_url: None,
            price_total_etb: dec_to_text(new_payment.price_total_etb),
            vat_etb: dec_to_text(new_payment.vat_etb),
            gw_fee_etb: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<PaymentDb> for Payment {
    fn from(db: PaymentDb) -> Self {
        // Status columns are only ever written from the enums; a parse
        // failure means corruption, so log and read as FAILED.
        let status = db.status.parse::<PaymentStatus>().unwrap_or_else(|_| {
            error!("payment {} has unknown status '{}'", db.id, db.status);
            PaymentStatus::Failed
        });
        let provider = db.provider.parse::<PaymentProvider>().unwrap_or_else(|_| {
            error!("payment {} has unknown provider '{}'", db.id, db.provider);
            PaymentProvider::Chapa
        });
        Self {
            id: db.id,
            user_id: db.user_id,
            package_id: db.package_id,
            status,
            provider,
            tx_ref: db.tx_ref,
            provider_ref: db.provider_ref,
            checkout_url: db.checkout_url,
            price_total_etb: text_to_dec(&db.price_total_etb, "payments.price_total_etb"),
            vat_etb: text_to_dec(&db.vat_etb, "payments.vat_etb"),
            gw_fee_etb: opt_text_to_dec(db.gw_fee_etb.as_deref(), "payments.gw_fee_etb"),
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        }
    }
}

#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::receipts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReceiptDb {
    pub id: String,
    pub payment_id: String,
    pub price_etb: String,
    pub vat_etb: String,
    pub provider_ref: String,
    pub created_at: NaiveDateTime,
}

impl From<ReceiptDb> for Receipt {
    fn from(db: ReceiptDb) -> Self {
        Self {
            id: db.id,
            payment_id: db.payment_id,
            price_etb: text_to_dec(&db.price_etb, "receipts.price_etb"),
            vat_etb: text_to_dec(&db.vat_etb, "receipts.vat_etb"),
            provider_ref: db.provider_ref,
            created_at: to_utc(db.created_at),
        }
    }
}
