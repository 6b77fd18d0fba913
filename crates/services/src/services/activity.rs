//! Activity trail recording.
//!
//! Recording is best-effort: a failed insert is logged and swallowed so the
//! triggering request still succeeds.

use db::models::activity_log::{ActivityLog, NewActivity};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

#[derive(Clone)]
pub struct ActivityRecorder {
    pool: SqlitePool,
}

impl ActivityRecorder {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        task_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        changes: Option<Value>,
    ) {
        let entry = NewActivity {
            user_id: Some(user_id),
            project_id: Some(project_id),
            task_id,
            action,
            entity_type,
            entity_id,
            changes,
        };
        if let Err(error) = ActivityLog::create(&self.pool, entry).await {
            warn!(?error, action, entity_type, "failed to record activity");
        }
    }
}
