//! Audit log repository trait.

use async_trait::async_trait;

use super::AuditLog;
use crate::errors::Result;

/// Most audit rows are written inside the composite ledger operations so
/// they commit with the movement they describe; this trait covers
/// standalone appends (failure paths, risk decisions) and reads.
#[async_trait]
pub trait AuditLogRepositoryTrait: Send + Sync {
    async fn append(
        &self,
        user_id: &str,
        event: &str,
        metadata: serde_json::Value,
    ) -> Result<AuditLog>;

    /// Newest-first rows for one user.
    fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<AuditLog>>;

    /// Rows with a given event tag for one user, newest first.
    fn list_for_user_event(&self, user_id: &str, event: &str, limit: i64)
        -> Result<Vec<AuditLog>>;
}
