use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::answer_record::AnswerRecord;
use crate::models::test_session::TestSession;
use crate::services::session_service::SessionService;

#[derive(Debug, Clone, serde::Serialize)]
pub struct SummaryItem {
    pub item_id: Uuid,
    pub answered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_selected_option_id: Option<Uuid>,
    /// `None` until the item is answered; an unanswered item is neutral,
    /// never reported as incorrect.
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub status: String,
    pub total_items: i32,
    pub answered_count: i32,
    pub correct_count: i32,
    pub score_percent: Decimal,
    pub items: Vec<SummaryItem>,
}

/// Score breakdown for a session in either state; an `IN_PROGRESS` partial
/// summary backs the resume view.
#[derive(Clone)]
pub struct SummaryService {
    pool: PgPool,
}

impl SummaryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn summarize(&self, session_id: Uuid, user_id: Uuid) -> Result<SessionSummary> {
        let sessions = SessionService::new(self.pool.clone());
        let session = sessions.get_owned(session_id, user_id).await?;

        let records = sqlx::query_as::<_, AnswerRecord>(
            r#"SELECT * FROM answer_records WHERE session_id = $1"#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(build_summary(&session, &records))
    }
}

pub fn build_summary(session: &TestSession, records: &[AnswerRecord]) -> SessionSummary {
    let items: Vec<SummaryItem> = session
        .item_ids
        .iter()
        .map(|item_id| {
            match records.iter().find(|r| r.item_id == *item_id) {
                Some(record) => SummaryItem {
                    item_id: *item_id,
                    answered: true,
                    selected_option_id: Some(record.selected_option_id),
                    second_selected_option_id: record.second_selected_option_id,
                    is_correct: Some(record.is_correct),
                },
                None => SummaryItem {
                    item_id: *item_id,
                    answered: false,
                    selected_option_id: None,
                    second_selected_option_id: None,
                    is_correct: None,
                },
            }
        })
        .collect();

    let answered_count = items.iter().filter(|i| i.answered).count() as i32;
    let correct_count = items.iter().filter(|i| i.is_correct == Some(true)).count() as i32;
    let score_percent = if session.total_items == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(correct_count) * Decimal::from(100) / Decimal::from(session.total_items))
            .round_dp(1)
    };

    SessionSummary {
        session_id: session.id,
        status: session.status.clone(),
        total_items: session.total_items,
        answered_count,
        correct_count,
        score_percent,
        items,
    }
}
