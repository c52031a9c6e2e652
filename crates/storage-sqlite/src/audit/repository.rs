use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;

use amora_core::audit::{AuditLog, AuditLogRepositoryTrait};
use amora_core::errors::Result;

use super::model::AuditLogDb;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::audit_logs;
use crate::utils::{new_id, now_naive};

pub struct AuditLogRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AuditLogRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl AuditLogRepositoryTrait for AuditLogRepository {
    async fn append(
        &self,
        user_id: &str,
        event: &str,
        metadata: serde_json::Value,
    ) -> Result<AuditLog> {
        let owner = user_id.to_string();
        let tag = event.to_string();
        self.writer
            .exec(move |conn| {
                let row = append_tx(conn, &owner, &tag, &metadata)?;
                Ok(row.into())
            })
            .await
    }

    fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<AuditLog>> {
        let mut conn = get_connection(&self.pool)?;
        audit_logs::table
            .select(AuditLogDb::as_select())
            .filter(audit_logs::user_id.eq(user_id))
            .order(audit_logs::occurred_at.desc())
            .limit(limit)
            .load::<AuditLogDb>(&mut conn)
            .into_core()
            .map(|rows| rows.into_iter().map(AuditLog::from).collect())
    }

    fn list_for_user_event(
        &self,
        user_id: &str,
        event: &str,
        limit: i64,
    ) -> Result<Vec<AuditLog>> {
        let mut conn = get_connection(&self.pool)?;
        audit_logs::table
            .select(AuditLogDb::as_select())
            .filter(audit_logs::user_id.eq(user_id))
            .filter(audit_logs::event.eq(event))
            .order(audit_logs::occurred_at.desc())
            .limit(limit)
            .load::<AuditLogDb>(&mut conn)
            .into_core()
            .map(|rows| rows.into_iter().map(AuditLog::from).collect())
    }
}

/// Appends an audit row inside the caller's transaction, so the record
/// commits (or rolls back) with the movement it describes.
pub(crate) fn append_tx(
    conn: &mut SqliteConnection,
    owner: &str,
    event_tag: &str,
    metadata: &serde_json::Value,
) -> std::result::Result<AuditLogDb, StorageError> {
    let row = AuditLogDb {
        id: new_id(),
        user_id: owner.to_string(),
        event: event_tag.to_string(),
        metadata: metadata.to_string(),
        occurred_at: now_naive(),
    };
    diesel::insert_into(audit_logs::table)
        .values(&row)
        .execute(conn)?;
    Ok(row)
}
