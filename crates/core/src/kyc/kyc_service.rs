//! KYC submission and review workflow.

use std::sync::Arc;

use log::info;
use uuid::Uuid;

use super::kyc_model::{KycDecision, KycDocType, KycStatus, KycSubmission, NewKycSubmission};
use super::kyc_traits::{KycRepositoryTrait, ObjectStore};
use crate::errors::{Error, Result, ValidationError};

/// What a submit call produced.
#[derive(Clone, Debug)]
pub struct SubmitOutcome {
    pub submission: KycSubmission,
    /// `true` when an existing PENDING submission was returned instead
    /// of creating a new one.
    pub already_pending: bool,
}

pub struct KycService {
    submissions: Arc<dyn KycRepositoryTrait>,
    store: Arc<dyn ObjectStore>,
}

impl KycService {
    pub fn new(submissions: Arc<dyn KycRepositoryTrait>, store: Arc<dyn ObjectStore>) -> Self {
        Self { submissions, store }
    }

    /// Stores both blobs through the encrypting object store and records
    /// a PENDING submission. A user with a PENDING submission gets it
    /// back unchanged.
    pub async fn submit(
        &self,
        user_id: &str,
        doc_type: KycDocType,
        document: &[u8],
        selfie: &[u8],
    ) -> Result<SubmitOutcome> {
        if document.is_empty() {
            return Err(ValidationError::MissingField("document".into()).into());
        }
        if selfie.is_empty() {
            return Err(ValidationError::MissingField("selfie".into()).into());
        }

        if let Some(existing) = self.submissions.find_pending(user_id)? {
            return Ok(SubmitOutcome {
                submission: existing,
                already_pending: true,
            });
        }

        let document_path = self
            .store
            .put(&format!("kyc/documents/{}", Uuid::new_v4()), document)?;
        let selfie_path = self
            .store
            .put(&format!("kyc/selfies/{}", Uuid::new_v4()), selfie)?;

        let submission = self
            .submissions
            .create_pending(NewKycSubmission {
                user_id: user_id.to_string(),
                doc_type,
                document_path,
                selfie_path,
            })
            .await?;

        info!("KYC submission {} created for user {}", submission.id, user_id);
        Ok(SubmitOutcome {
            submission,
            already_pending: false,
        })
    }

    /// Admin review. VERIFIED raises the wallet KYC level to at least 2.
    pub async fn review(
        &self,
        reviewer_id: &str,
        submission_id: &str,
        decision: KycDecision,
        notes: Option<String>,
    ) -> Result<KycSubmission> {
        let submission = self
            .submissions
            .get_by_id(submission_id)?
            .ok_or_else(|| Error::NotFound(format!("KYC submission {submission_id}")))?;
        if submission.status != KycStatus::Pending {
            return Err(Error::InvalidState(
                "only pending submissions can be reviewed".into(),
            ));
        }

        let reviewed = self
            .submissions
            .review(submission_id, decision, reviewer_id, notes)
            .await?;
        info!(
            "KYC submission {} reviewed as {:?} by {}",
            submission_id, decision, reviewer_id
        );
        Ok(reviewed)
    }

    pub fn list(&self, status: Option<KycStatus>) -> Result<Vec<KycSubmission>> {
        self.submissions.list(status)
    }

    /// Decrypted document bytes, for admin preview.
    pub fn open_document(&self, submission: &KycSubmission) -> Result<Vec<u8>> {
        self.store.get(&submission.document_path)
    }
}
