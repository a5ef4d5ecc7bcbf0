use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Marks a clip as watched within a session. At most one per (session, clip)
/// pair; an answer for a clip is only accepted once this record exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ViewConsumption {
    pub id: Uuid,
    pub session_id: Uuid,
    pub clip_id: Uuid,
    pub created_at: DateTime<Utc>,
}
