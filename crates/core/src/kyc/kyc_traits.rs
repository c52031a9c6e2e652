//! KYC repository and blob storage traits.

use async_trait::async_trait;

use super::kyc_model::{KycDecision, KycStatus, KycSubmission, NewKycSubmission};
use crate::errors::Result;

/// Blob storage for identity documents. The default implementation
/// wraps the filesystem with authenticated encryption; `put` receives
/// plaintext and must persist ciphertext.
pub trait ObjectStore: Send + Sync {
    /// Stores the bytes under `key`, returning the stored key.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<String>;

    /// Reads the bytes behind `key`, decrypting on open.
    fn get(&self, key: &str) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait KycRepositoryTrait: Send + Sync {
    fn find_pending(&self, user_id: &str) -> Result<Option<KycSubmission>>;

    /// Inserts the PENDING row and its audit entry in one transaction.
    async fn create_pending(&self, new_submission: NewKycSubmission) -> Result<KycSubmission>;

    fn get_by_id(&self, submission_id: &str) -> Result<Option<KycSubmission>>;

    fn list(&self, status: Option<KycStatus>) -> Result<Vec<KycSubmission>>;

    /// One transaction: stamps the review; on VERIFIED also raises the
    /// wallet's `kyc_level` to at least 2. Only PENDING submissions can
    /// be reviewed.
    async fn review(
        &self,
        submission_id: &str,
        decision: KycDecision,
        reviewer_id: &str,
        notes: Option<String>,
    ) -> Result<KycSubmission>;
}
