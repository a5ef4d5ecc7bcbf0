use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_DECISION: &str = "DECISION";
pub const ROLE_RECOMMENDATION: &str = "RECOMMENDATION";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub category_id: Uuid,
    pub question_type: String,
    pub body: String,
    pub explanation: Option<String>,
    pub is_active: bool,
    pub is_user_generated: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One selectable option. VAR questions carry two correct options, one per
/// role (on-field decision + VAR recommendation); everything else only uses
/// the `DECISION` role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnswerOption {
    pub id: Uuid,
    pub question_id: Uuid,
    pub option_role: String,
    pub text: String,
    pub is_correct: bool,
    pub display_order: i32,
}
