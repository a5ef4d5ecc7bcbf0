use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Exactly zero or one per (session, item) pair, enforced by a unique index.
/// Created once, never mutated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnswerRecord {
    pub id: Uuid,
    pub session_id: Uuid,
    pub item_id: Uuid,
    pub selected_option_id: Uuid,
    pub second_selected_option_id: Option<Uuid>,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
}
