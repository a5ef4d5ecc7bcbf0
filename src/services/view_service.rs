use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::services::session_service::SessionService;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ConsumeOutcome {
    pub already_consumed: bool,
}

/// At-most-once "view" event per (session, clip). Consuming twice is not an
/// error; the UI re-polls on page refresh and just learns it already counted.
#[derive(Clone)]
pub struct ViewService {
    pool: PgPool,
}

impl ViewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn consume(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        clip_id: Uuid,
    ) -> Result<ConsumeOutcome> {
        let sessions = SessionService::new(self.pool.clone());
        let session = sessions.get_owned(session_id, user_id).await?;

        let kind = session.session_kind().ok_or_else(|| {
            Error::Internal(format!("Unrecognized session kind: {}", session.kind))
        })?;
        if !kind.is_video() {
            return Err(Error::InvalidState(
                "Session has no clips to consume".to_string(),
            ));
        }
        if !session.item_ids.contains(&clip_id) {
            return Err(Error::NotFound(
                "Clip is not part of this session".to_string(),
            ));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO view_consumptions (session_id, clip_id)
            VALUES ($1, $2)
            ON CONFLICT (session_id, clip_id) DO NOTHING
            "#,
        )
        .bind(session_id)
        .bind(clip_id)
        .execute(&self.pool)
        .await?;

        let already_consumed = inserted.rows_affected() == 0;
        if !already_consumed {
            tracing::info!(
                session_id = %session_id,
                clip_id = %clip_id,
                "Clip view consumed"
            );
        }

        Ok(ConsumeOutcome { already_consumed })
    }
}
