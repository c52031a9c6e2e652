use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use serde_json::json;

use amora_core::audit::events;
use amora_core::errors::{Error, Result};
use amora_core::subscriptions::{
    ActivationOutcome, NewSubscriptionPurchase, PlanCode, SubscriptionPurchase,
    SubscriptionRepositoryTrait, SubscriptionStatus,
};

use super::model::SubscriptionPurchaseDb;
use crate::audit::append_tx;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{subscription_purchases, users};
use crate::utils::{now_naive, to_utc};

pub struct SubscriptionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SubscriptionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Mirrors the perk onto the user row: flag on, expiry stamped.
fn enable_perk_tx(
    conn: &mut SqliteConnection,
    owner: &str,
    plan: PlanCode,
    expires: NaiveDateTime,
) -> std::result::Result<(), StorageError> {
    let now = now_naive();
    let target = users::table.filter(users::id.eq(owner));
    match plan {
        PlanCode::Boost => {
            diesel::update(target)
                .set((
                    users::has_boost.eq(true),
                    users::boost_expiry.eq(Some(expires)),
                    users::updated_at.eq(now),
                ))
                .execute(conn)?;
        }
        PlanCode::LikesReveal => {
            diesel::update(target)
                .set((
                    users::can_see_likes.eq(true),
                    users::likes_reveal_expiry.eq(Some(expires)),
                    users::updated_at.eq(now),
                ))
                .execute(conn)?;
        }
        PlanCode::AdFree => {
            diesel::update(target)
                .set((
                    users::ad_free.eq(true),
                    users::ad_free_expiry.eq(Some(expires)),
                    users::updated_at.eq(now),
                ))
                .execute(conn)?;
        }
    }
    Ok(())
}

fn complete_purchase_tx(
    conn: &mut SqliteConnection,
    row: &SubscriptionPurchaseDb,
) -> std::result::Result<ActivationOutcome, StorageError> {
    let plan: PlanCode = row
        .plan
        .parse()
        .map_err(|e: Error| StorageError::Domain(e))?;

    let now = now_naive();
    let expires = now + Duration::days(row.duration_days);

    diesel::update(subscription_purchases::table.find(&row.id))
        .set((
            subscription_purchases::status.eq(SubscriptionStatus::Completed.as_str()),
            subscription_purchases::activated_at.eq(Some(now)),
            subscription_purchases::expires_at.eq(Some(expires)),
            subscription_purchases::updated_at.eq(now),
        ))
        .execute(conn)?;

    enable_perk_tx(conn, &row.user_id, plan, expires)?;

    append_tx(
        conn,
        &row.user_id,
        events::SUBSCRIPTION_ACTIVATED,
        &json!({
            "purchase_id": row.id,
            "plan": row.plan,
            "expires_at": to_utc(expires).to_rfc3339(),
        }),
    )?;

    let updated = subscription_purchases::table
        .select(SubscriptionPurchaseDb::as_select())
        .find(&row.id)
        .first::<SubscriptionPurchaseDb>(conn)?;
    Ok(ActivationOutcome::Activated {
        purchase: updated.into(),
        expires_at: to_utc(expires),
    })
}

#[async_trait]
impl SubscriptionRepositoryTrait for SubscriptionRepository {
    async fn create_initiated(
        &self,
        new_purchase: NewSubscriptionPurchase,
    ) -> Result<SubscriptionPurchase> {
        self.writer
            .exec(move |conn| {
                let row = SubscriptionPurchaseDb::initiated(&new_purchase);
                diesel::insert_into(subscription_purchases::table)
                    .values(&row)
                    .execute(conn)?;
                Ok(row.into())
            })
            .await
    }

    async fn attach_checkout(
        &self,
        purchase_id: &str,
        checkout_url: &str,
    ) -> Result<SubscriptionPurchase> {
        let pid = purchase_id.to_string();
        let url = checkout_url.to_string();
        self.writer
            .exec(move |conn| {
                diesel::update(subscription_purchases::table.find(&pid))
                    .set((
                        subscription_purchases::checkout_url.eq(&url),
                        subscription_purchases::updated_at.eq(now_naive()),
                    ))
                    .execute(conn)?;
                let row = subscription_purchases::table
                    .select(SubscriptionPurchaseDb::as_select())
                    .find(&pid)
                    .first::<SubscriptionPurchaseDb>(conn)?;
                Ok(row.into())
            })
            .await
    }

    fn get_by_tx_ref(&self, tx_ref: &str) -> Result<Option<SubscriptionPurchase>> {
        let mut conn = get_connection(&self.pool)?;
        subscription_purchases::table
            .select(SubscriptionPurchaseDb::as_select())
            .filter(subscription_purchases::tx_ref.eq(tx_ref))
            .first::<SubscriptionPurchaseDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(SubscriptionPurchase::from))
    }

    async fn activate_by_tx_ref(&self, tx_ref: &str) -> Result<ActivationOutcome> {
        let reference = tx_ref.to_string();
        self.writer
            .exec(move |conn| {
                let row = subscription_purchases::table
                    .select(SubscriptionPurchaseDb::as_select())
                    .filter(subscription_purchases::tx_ref.eq(&reference))
                    .first::<SubscriptionPurchaseDb>(conn)
                    .optional()?
                    .ok_or_else(|| {
                        Error::NotFound(format!("subscription for tx_ref {reference}"))
                    })?;

                if row.status == SubscriptionStatus::Completed.as_str() {
                    return Ok(ActivationOutcome::AlreadyCompleted {
                        purchase: row.into(),
                    });
                }

                complete_purchase_tx(conn, &row)
            })
            .await
    }

    async fn activate_direct(
        &self,
        new_purchase: NewSubscriptionPurchase,
    ) -> Result<ActivationOutcome> {
        self.writer
            .exec(move |conn| {
                let row = SubscriptionPurchaseDb::initiated(&new_purchase);
                diesel::insert_into(subscription_purchases::table)
                    .values(&row)
                    .execute(conn)?;
                complete_purchase_tx(conn, &row)
            })
            .await
    }

    async fn clear_expired_perks(&self, now: DateTime<Utc>) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let cutoff = now.naive_utc();
                let mut cleared = 0usize;

                cleared += diesel::update(
                    users::table.filter(users::has_boost.eq(true)).filter(
                        users::boost_expiry
                            .is_null()
                            .or(users::boost_expiry.le(cutoff)),
                    ),
                )
                .set((users::has_boost.eq(false), users::updated_at.eq(cutoff)))
                .execute(conn)?;

                cleared += diesel::update(
                    users::table.filter(users::can_see_likes.eq(true)).filter(
                        users::likes_reveal_expiry
                            .is_null()
                            .or(users::likes_reveal_expiry.le(cutoff)),
                    ),
                )
                .set((users::can_see_likes.eq(false), users::updated_at.eq(cutoff)))
                .execute(conn)?;

                cleared += diesel::update(
                    users::table.filter(users::ad_free.eq(true)).filter(
                        users::ad_free_expiry
                            .is_null()
                            .or(users::ad_free_expiry.le(cutoff)),
                    ),
                )
                .set((users::ad_free.eq(false), users::updated_at.eq(cutoff)))
                .execute(conn)?;

                Ok(cleared)
            })
            .await
    }
}
