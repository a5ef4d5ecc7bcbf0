use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, PriorOutcome, Result};
use crate::models::answer_record::AnswerRecord;
use crate::models::question::{ROLE_DECISION, ROLE_RECOMMENDATION};
use crate::models::view_consumption::ViewConsumption;
use crate::services::catalog_service::{CatalogService, OptionKey};
use crate::services::session_service::SessionService;

#[derive(Debug, Clone)]
pub struct RecordedAnswer {
    pub is_correct: bool,
    pub running_score: i32,
    pub completed: bool,
    pub explanation: Option<String>,
}

/// Records one answer per (session, item) pair. Uniqueness is enforced by
/// the storage layer, not a check-then-write; a duplicate submission gets
/// `AlreadyAnswered` carrying the originally stored outcome.
#[derive(Clone)]
pub struct AnswerService {
    pool: PgPool,
}

impl AnswerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        item_id: Uuid,
        selected_option_id: Uuid,
        second_selected_option_id: Option<Uuid>,
    ) -> Result<RecordedAnswer> {
        let sessions = SessionService::new(self.pool.clone());
        let session = sessions.get_owned(session_id, user_id).await?;

        if !session.is_in_progress() {
            return Err(Error::InvalidState(
                "Session is already completed".to_string(),
            ));
        }
        if !session.item_ids.contains(&item_id) {
            return Err(Error::NotFound(
                "Item is not part of this session".to_string(),
            ));
        }

        let kind = session.session_kind().ok_or_else(|| {
            Error::Internal(format!("Unrecognized session kind: {}", session.kind))
        })?;

        // Anti-cheat gate: a clip must have a consumed view before any
        // answer for it is accepted.
        if kind.is_video() {
            let viewed = sqlx::query_as::<_, ViewConsumption>(
                r#"SELECT * FROM view_consumptions WHERE session_id = $1 AND clip_id = $2"#,
            )
            .bind(session_id)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;
            if viewed.is_none() {
                return Err(Error::ViewNotConsumed);
            }
        }

        let catalog = CatalogService::new(self.pool.clone());
        let key = catalog.answer_key(kind, item_id).await?;
        let is_correct = evaluate_selection(
            &key.options,
            selected_option_id,
            second_selected_option_id,
        )?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO answer_records
                (session_id, item_id, selected_option_id, second_selected_option_id, is_correct)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_id, item_id) DO NOTHING
            "#,
        )
        .bind(session_id)
        .bind(item_id)
        .bind(selected_option_id)
        .bind(second_selected_option_id)
        .bind(is_correct)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            let prior = sqlx::query_as::<_, AnswerRecord>(
                r#"SELECT * FROM answer_records WHERE session_id = $1 AND item_id = $2"#,
            )
            .bind(session_id)
            .bind(item_id)
            .fetch_one(&self.pool)
            .await?;
            let score: i32 = sqlx::query_scalar(
                r#"SELECT score FROM test_sessions WHERE id = $1"#,
            )
            .bind(session_id)
            .fetch_one(&self.pool)
            .await?;

            tracing::info!(
                session_id = %session_id,
                item_id = %item_id,
                "Duplicate answer submission, returning stored outcome"
            );
            return Err(Error::AlreadyAnswered(PriorOutcome {
                is_correct: prior.is_correct,
                running_score: score,
            }));
        }

        // The record is durable at this point; score and completion both
        // derive from stored state, so concurrent submissions cannot
        // double-count.
        let running_score: i32 = sqlx::query_scalar(
            r#"
            UPDATE test_sessions
            SET score = score + CASE WHEN $2 THEN 1 ELSE 0 END
            WHERE id = $1
            RETURNING score
            "#,
        )
        .bind(session_id)
        .bind(is_correct)
        .fetch_one(&self.pool)
        .await?;

        let completed = sessions.advance(session_id).await?;

        Ok(RecordedAnswer {
            is_correct,
            running_score,
            completed,
            explanation: key.explanation,
        })
    }
}

/// Scores one selection against an item's answer key. An item that carries
/// recommendation options (VAR) requires both selections, and is correct
/// only when each matches the correct option of its role.
pub fn evaluate_selection(
    options: &[OptionKey],
    selected_option_id: Uuid,
    second_selected_option_id: Option<Uuid>,
) -> Result<bool> {
    let selected = options
        .iter()
        .find(|o| o.id == selected_option_id && o.role == ROLE_DECISION)
        .ok_or_else(|| {
            Error::InvalidPayload("Selected option does not belong to this item".to_string())
        })?;

    let dual = options.iter().any(|o| o.role == ROLE_RECOMMENDATION);
    if !dual {
        if second_selected_option_id.is_some() {
            return Err(Error::InvalidPayload(
                "Item takes a single selection".to_string(),
            ));
        }
        return Ok(selected.is_correct);
    }

    let second_id = second_selected_option_id.ok_or_else(|| {
        Error::InvalidPayload("Item requires a second selection".to_string())
    })?;
    let second = options
        .iter()
        .find(|o| o.id == second_id && o.role == ROLE_RECOMMENDATION)
        .ok_or_else(|| {
            Error::InvalidPayload("Second option does not belong to this item".to_string())
        })?;

    Ok(selected.is_correct && second.is_correct)
}
