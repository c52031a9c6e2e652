use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use serde_json::json;

use amora_core::audit::events;
use amora_core::errors::{Error, Result};
use amora_core::kyc::{
    KycDecision, KycRepositoryTrait, KycStatus, KycSubmission, NewKycSubmission,
};

use super::model::KycSubmissionDb;
use crate::audit::append_tx;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{kyc_submissions, wallets};
use crate::utils::now_naive;
use crate::wallets::get_or_create_tx;

/// Wallet KYC level a verified submission grants.
const VERIFIED_KYC_LEVEL: i32 = 2;

pub struct KycRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl KycRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl KycRepositoryTrait for KycRepository {
    fn find_pending(&self, user_id: &str) -> Result<Option<KycSubmission>> {
        let mut conn = get_connection(&self.pool)?;
        kyc_submissions::table
            .select(KycSubmissionDb::as_select())
            .filter(kyc_submissions::user_id.eq(user_id))
            .filter(kyc_submissions::status.eq(KycStatus::Pending.as_str()))
            .first::<KycSubmissionDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(KycSubmission::from))
    }

    async fn create_pending(&self, new_submission: NewKycSubmission) -> Result<KycSubmission> {
        self.writer
            .exec(move |conn| {
                // Double-submission guard re-checked under the writer.
                let existing = kyc_submissions::table
                    .select(KycSubmissionDb::as_select())
                    .filter(kyc_submissions::user_id.eq(&new_submission.user_id))
                    .filter(kyc_submissions::status.eq(KycStatus::Pending.as_str()))
                    .first::<KycSubmissionDb>(conn)
                    .optional()?;
                if let Some(existing) = existing {
                    return Ok(existing.into());
                }

                let row = KycSubmissionDb::pending(&new_submission);
                diesel::insert_into(kyc_submissions::table)
                    .values(&row)
                    .execute(conn)?;

                append_tx(
                    conn,
                    &row.user_id,
                    events::KYC_SUBMITTED,
                    &json!({ "submission_id": row.id, "doc_type": row.doc_type }),
                )?;

                Ok(row.into())
            })
            .await
    }

    fn get_by_id(&self, submission_id: &str) -> Result<Option<KycSubmission>> {
        let mut conn = get_connection(&self.pool)?;
        kyc_submissions::table
            .select(KycSubmissionDb::as_select())
            .find(submission_id)
            .first::<KycSubmissionDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(KycSubmission::from))
    }

    fn list(&self, status: Option<KycStatus>) -> Result<Vec<KycSubmission>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = kyc_submissions::table.into_boxed();
        if let Some(status) = status {
            query = query.filter(kyc_submissions::status.eq(status.as_str()));
        }
        query
            .select(KycSubmissionDb::as_select())
            .order(kyc_submissions::created_at.desc())
            .load::<KycSubmissionDb>(&mut conn)
            .into_core()
            .map(|rows| rows.into_iter().map(KycSubmission::from).collect())
    }

    async fn review(
        &self,
        submission_id: &str,
        decision: KycDecision,
        reviewer_id: &str,
        notes: Option<String>,
    ) -> Result<KycSubmission> {
        let sid = submission_id.to_string();
        let reviewer = reviewer_id.to_string();
        self.writer
            .exec(move |conn| {
                let row = kyc_submissions::table
                    .select(KycSubmissionDb::as_select())
                    .find(&sid)
                    .first::<KycSubmissionDb>(conn)
                    .optional()?
                    .ok_or_else(|| Error::NotFound(format!("KYC submission {sid}")))?;
                if row.status != KycStatus::Pending.as_str() {
                    return Err(Error::InvalidState(
                        "only pending submissions can be reviewed".into(),
                    )
                    .into());
                }

                let (next_status, audit_event) = match decision {
                    KycDecision::Verified => (KycStatus::Verified, events::KYC_VERIFIED),
                    KycDecision::Rejected => (KycStatus::Rejected, events::KYC_REJECTED),
                };

                let now = now_naive();
                diesel::update(kyc_submissions::table.find(&sid))
                    .set((
                        kyc_submissions::status.eq(next_status.as_str()),
                        kyc_submissions::notes.eq(&notes),
                        kyc_submissions::reviewed_at.eq(Some(now)),
                        kyc_submissions::reviewed_by.eq(Some(reviewer.clone())),
                        kyc_submissions::updated_at.eq(now),
                    ))
                    .execute(conn)?;

                // A verified identity unlocks withdrawals.
                if next_status == KycStatus::Verified {
                    let wallet = get_or_create_tx(conn, &row.user_id)?;
                    if wallet.kyc_level < VERIFIED_KYC_LEVEL {
                        diesel::update(
                            wallets::table.filter(wallets::user_id.eq(&row.user_id)),
                        )
                        .set((
                            wallets::kyc_level.eq(VERIFIED_KYC_LEVEL),
                            wallets::updated_at.eq(now),
                        ))
                        .execute(conn)?;
                    }
                }

                append_tx(
                    conn,
                    &row.user_id,
                    audit_event,
                    &json!({ "submission_id": sid, "reviewer": reviewer }),
                )?;

                let updated = kyc_submissions::table
                    .select(KycSubmissionDb::as_select())
                    .find(&sid)
                    .first::<KycSubmissionDb>(conn)?;
                Ok(updated.into())
            })
            .await
    }
}
