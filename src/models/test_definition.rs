use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A configured assessment: mandatory (required curriculum) or pool
/// (optional practice). Text kinds resolve their item universe through
/// `category_id`; video kinds through `tag_ids`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestDefinition {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub category_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
    pub total_items: i32,
    pub is_active: bool,
    pub is_mandatory: bool,
    pub is_user_generated: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TestDefinition {
    /// Pool visibility: public definitions are visible to everyone,
    /// author-owned ones only to their author.
    pub fn visible_to(&self, user_id: Uuid) -> bool {
        !self.is_user_generated || self.created_by == Some(user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestCompletion {
    pub id: Uuid,
    pub test_definition_id: Uuid,
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub score: i32,
    pub completed_at: DateTime<Utc>,
}
