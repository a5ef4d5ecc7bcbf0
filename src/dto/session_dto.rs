use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartTestRequest {
    pub kind: Option<String>,
    pub category_slug: Option<String>,
    pub category_type: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    #[validate(range(min = 1, max = 200))]
    pub total_questions: Option<i32>,
    pub test_definition_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartVideoTestRequest {
    pub kind: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    #[validate(range(min = 1, max = 200))]
    pub total_clips: Option<i32>,
    pub test_definition_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub kind: String,
    pub status: String,
    pub total_items: i32,
    pub score: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<crate::models::test_session::TestSession> for SessionView {
    fn from(s: crate::models::test_session::TestSession) -> Self {
        Self {
            id: s.id,
            kind: s.kind,
            status: s.status,
            total_items: s.total_items,
            score: s.score,
            created_at: s.created_at,
            completed_at: s.completed_at,
        }
    }
}

/// Option as presented to the taker: no correctness flag, and callers must
/// not rely on ordering; it is reshuffled on every delivery.
#[derive(Debug, Clone, Serialize)]
pub struct PresentedOption {
    pub id: Uuid,
    pub option_role: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresentedQuestion {
    pub id: Uuid,
    pub body: String,
    pub question_type: String,
    pub options: Vec<PresentedOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionQuestionsResponse {
    pub session: SessionView,
    pub questions: Vec<PresentedQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresentedClip {
    pub id: Uuid,
    pub title: String,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub options: Vec<PresentedOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionClipsResponse {
    pub session: SessionView,
    pub clips: Vec<PresentedClip>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordAnswerRequest {
    pub item_id: Uuid,
    pub selected_option_id: Uuid,
    pub second_selected_option_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordAnswerResponse {
    pub is_correct: bool,
    pub running_score: i32,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConsumeViewRequest {
    pub clip_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EligibleCountRequest {
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EligibleCountResponse {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub session: SessionView,
    pub total_items: i32,
    pub answered_count: i32,
    pub correct_count: i32,
    pub score_percent: Decimal,
    pub items: Vec<crate::services::summary_service::SummaryItem>,
}
