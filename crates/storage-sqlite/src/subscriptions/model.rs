//! Database model for subscription purchases.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::error;

use amora_core::subscriptions::{
    NewSubscriptionPurchase, PlanCode, SubscriptionPurchase, SubscriptionStatus,
};

use crate::utils::{dec_to_text, new_id, now_naive, text_to_dec, to_utc};

#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::subscription_purchases)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SubscriptionPurchaseDb {
    pub id: String,
    pub user_id: String,
    pub plan: String,
    pub amount_etb: String,
    pub duration_days: i64,
    pub tx_ref: String,
    pub status: String,
    pub checkout_url: Option<String>,
    pub activated_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl SubscriptionPurchaseDb {
    pub fn initiated(new_purchase: &NewSubscriptionPurchase) -> Self {
        let now = now_naive();
        Self {
            id: new_id(),
            user_id: new_purchase.user_id.clone(),
            plan: new_purchase.plan.as_str().to_string(),
            amount_etb: dec_to_text(new_purchase.amount_etb),
            duration_days: new_purchase.duration_days,
            tx_ref: new_purchase.tx_ref.clone(),
            status: SubscriptionStatus::Initiated.as_str().to_string(),
            checkout_url: None,
            activated_at: None,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<SubscriptionPurchaseDb> for SubscriptionPurchase {
    fn from(db: SubscriptionPurchaseDb) -> Self {
        let status = db.status.parse::<SubscriptionStatus>().unwrap_or_else(|_| {
            error!(
                "subscription purchase {} has unknown status '{}'",
                db.id, db.status
            );
            SubscriptionStatus::Failed
        });
        let plan = db.plan.parse::<PlanCode>().unwrap_or_else(|_| {
            error!(
                "subscription purchase {} has unknown plan '{}'",
                db.id, db.plan
            );
            PlanCode::Boost
        });
        Self {
            id: db.id,
            user_id: db.user_id,
            plan,
            amount_etb: text_to_dec(&db.amount_etb, "subscription_purchases.amount_etb"),
            duration_days: db.duration_days,
            tx_ref: db.tx_ref,
            status,
            checkout_url: db.checkout_url,
            activated_at: db.activated_at.map(to_utc),
            expires_at: db.expires_at.map(to_utc),
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        }
    }
}
