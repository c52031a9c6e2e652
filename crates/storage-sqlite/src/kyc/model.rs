//! Database model for KYC submissions.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::error;

use amora_core::kyc::{KycDocType, KycStatus, KycSubmission, NewKycSubmission};

use crate::utils::{new_id, now_naive, to_utc};

#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::kyc_submissions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct KycSubmissionDb {
    pub id: String,
    pub user_id: String,
    pub doc_type: String,
    pub document_path: String,
    pub selfie_path: String,
    pub status: String,
    pub notes: Option<String>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub reviewed_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl KycSubmissionDb {
    pub fn pending(new_submission: &NewKycSubmission) -> Self {
        let now = now_naive();
        Self {
            id: new_id(),
            user_id: new_submission.user_id.clone(),
            doc_type: new_submission.doc_type.as_str().to_string(),
            document_path: new_submission.document_path.clone(),
            selfie_path: new_submission.selfie_path.clone(),
            status: KycStatus::Pending.as_str().to_string(),
            notes: None,
            reviewed_at: None,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<KycSubmissionDb> for KycSubmission {
    fn from(db: KycSubmissionDb) -> Self {
        let status = db.status.parse::<KycStatus>().unwrap_or_else(|_| {
            error!("KYC submission {} has unknown status '{}'", db.id, db.status);
            KycStatus::Rejected
        });
        let doc_type = db.doc_type.parse::<KycDocType>().unwrap_or_else(|_| {
            error!(
                "KYC submission {} has unknown doc type '{}'",
                db.id, db.doc_type
            );
            KycDocType::Nid
        });
        Self {
            id: db.id,
            user_id: db.user_id,
            doc_type,
            document_path: db.document_path,
            selfie_path: db.selfie_path,
            status,
            notes: db.notes,
            reviewed_at: db.reviewed_at.map(to_utc),
            reviewed_by: db.reviewed_by,
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        }
    }
}
