//! Database model for audit logs.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use amora_core::audit::AuditLog;

use crate::utils::to_utc;

#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::audit_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditLogDb {
    pub id: String,
    pub user_id: String,
    pub event: String,
    pub metadata: String,
    pub occurred_at: NaiveDateTime,
}

impl From<AuditLogDb> for AuditLog {
    fn from(db: AuditLogDb) -> Self {
        let metadata =
            serde_json::from_str(&db.metadata).unwrap_or(serde_json::Value::Null);
        Self {
            id: db.id,
            user_id: db.user_id,
            event: db.event,
            metadata,
            occurred_at: to_utc(db.occurred_at),
        }
    }
}
