use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_IN_PROGRESS: &str = "IN_PROGRESS";
pub const STATUS_COMPLETED: &str = "COMPLETED";

/// Discriminator for the answer shape and gating rules of a session.
/// Text kinds take a single selection per item; VAR kinds take a linked
/// decision + recommendation pair; video kinds additionally gate answers
/// behind a consumed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionKind {
    Laws,
    ArClip,
    VarClip,
    VideoChallenge,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Laws => "LAWS",
            SessionKind::ArClip => "AR_CLIP",
            SessionKind::VarClip => "VAR_CLIP",
            SessionKind::VideoChallenge => "VIDEO_CHALLENGE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "LAWS" => Some(SessionKind::Laws),
            "AR_CLIP" => Some(SessionKind::ArClip),
            "VAR_CLIP" => Some(SessionKind::VarClip),
            "VIDEO_CHALLENGE" => Some(SessionKind::VideoChallenge),
            _ => None,
        }
    }

    /// Video kinds draw their items from the clip library and require a
    /// consumed view before an answer is accepted.
    pub fn is_video(&self) -> bool {
        matches!(
            self,
            SessionKind::ArClip | SessionKind::VarClip | SessionKind::VideoChallenge
        )
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub category_id: Option<Uuid>,
    pub test_definition_id: Option<Uuid>,
    /// Fixed at creation; never reshuffled or extended afterwards.
    pub item_ids: Vec<Uuid>,
    pub total_items: i32,
    pub status: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TestSession {
    pub fn is_in_progress(&self) -> bool {
        self.status == STATUS_IN_PROGRESS
    }

    pub fn session_kind(&self) -> Option<SessionKind> {
        SessionKind::parse(&self.kind)
    }
}
