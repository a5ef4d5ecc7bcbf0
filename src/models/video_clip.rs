use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Media item presented in place of a text question. `file_url` is an opaque
/// resource; delivery is not this engine's concern.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VideoClip {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Decision choice attached to a clip; same shape as a question's answer
/// options so both item families score through one path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClipDecisionOption {
    pub id: Uuid,
    pub clip_id: Uuid,
    pub option_role: String,
    pub text: String,
    pub is_correct: bool,
    pub display_order: i32,
}
