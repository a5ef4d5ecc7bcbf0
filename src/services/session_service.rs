use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::category::Category;
use crate::models::test_definition::{TestCompletion, TestDefinition};
use crate::models::test_session::{SessionKind, TestSession};
use crate::services::catalog_service::CatalogService;
use crate::services::eligibility::{EligibilityConstraints, EligibilityFilter};
use crate::services::selection::select_items;

const DEFAULT_TOTAL_ITEMS: i32 = 10;

#[derive(Debug, Clone, Default)]
pub struct CreateSessionParams {
    pub kind: Option<SessionKind>,
    pub category_slug: Option<String>,
    pub category_type: Option<String>,
    pub tag_ids: Vec<Uuid>,
    pub total_items: Option<i32>,
    pub test_definition_id: Option<Uuid>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MandatoryTestView {
    #[serde(flatten)]
    pub definition: TestDefinition,
    pub completed: bool,
    pub completion: Option<TestCompletion>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PoolTestsView {
    pub public: Vec<TestDefinition>,
    pub mine: Vec<TestDefinition>,
}

#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a session with its item list fixed up front: resolves the
    /// definition or ad-hoc constraints, filters the item universe, samples
    /// without replacement, persists `IN_PROGRESS` with zero score.
    pub async fn create(&self, user_id: Uuid, params: CreateSessionParams) -> Result<TestSession> {
        let catalog = CatalogService::new(self.pool.clone());

        let definition = match params.test_definition_id {
            Some(def_id) => Some(self.load_definition_for(def_id, user_id).await?),
            None => None,
        };

        let kind = match &definition {
            Some(def) => SessionKind::parse(&def.kind).ok_or_else(|| {
                Error::Internal(format!("Unrecognized session kind: {}", def.kind))
            })?,
            None => params
                .kind
                .ok_or_else(|| Error::InvalidPayload("kind is required".to_string()))?,
        };

        // Resolve the target category for text kinds. A named category that
        // does not exist fails the create; no constraint at all is allowed.
        let category = if kind.is_video() {
            None
        } else if let Some(def) = &definition {
            let category_id = def.category_id.ok_or_else(|| {
                Error::Internal("Text test definition has no category".to_string())
            })?;
            Some(self.category_by_id(category_id).await?)
        } else if params.category_slug.is_some() || params.category_type.is_some() {
            Some(
                catalog
                    .find_category(
                        params.category_slug.as_deref(),
                        params.category_type.as_deref(),
                    )
                    .await?
                    .ok_or_else(|| Error::NotFound("Category not found".to_string()))?,
            )
        } else {
            None
        };

        let tag_ids = match &definition {
            Some(def) => def.tag_ids.clone(),
            None => params.tag_ids.clone(),
        };

        let constraints = EligibilityConstraints {
            category_slug: category.as_ref().map(|c| c.slug.clone()),
            category_type: None,
            tag_ids,
        };

        let registry = catalog.tag_registry().await?;
        let filter = EligibilityFilter::new(&constraints, &registry, user_id)?;

        let universe = if kind.is_video() {
            catalog.clip_universe().await?
        } else {
            catalog.question_universe(kind.as_str()).await?
        };
        let eligible = filter.apply(&universe);

        let target = definition
            .as_ref()
            .map(|d| d.total_items)
            .or(params.total_items)
            .unwrap_or(DEFAULT_TOTAL_ITEMS);
        if target < 0 {
            return Err(Error::InvalidPayload(
                "total items must be non-negative".to_string(),
            ));
        }
        let item_ids = select_items(&eligible, target as usize)?;

        let session = sqlx::query_as::<_, TestSession>(
            r#"
            INSERT INTO test_sessions (user_id, kind, category_id, test_definition_id, item_ids, total_items)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(category.as_ref().map(|c| c.id))
        .bind(definition.as_ref().map(|d| d.id))
        .bind(&item_ids)
        .bind(item_ids.len() as i32)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            session_id = %session.id,
            user_id = %user_id,
            kind = %kind,
            total_items = session.total_items,
            "Test session created"
        );

        Ok(session)
    }

    /// Owner-only session read.
    pub async fn get_owned(&self, session_id: Uuid, user_id: Uuid) -> Result<TestSession> {
        let session = sqlx::query_as::<_, TestSession>(
            r#"SELECT * FROM test_sessions WHERE id = $1"#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;

        if session.user_id != user_id {
            return Err(Error::NotAuthorized);
        }
        Ok(session)
    }

    /// Completion check after each accepted answer. The answered count comes
    /// from a durable `COUNT(*)`, and the status flip is guarded on the
    /// current status, so concurrent "last answer" submissions converge on a
    /// single transition. Returns whether the session is completed.
    pub async fn advance(&self, session_id: Uuid) -> Result<bool> {
        let session = sqlx::query_as::<_, TestSession>(
            r#"SELECT * FROM test_sessions WHERE id = $1"#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;

        let answered: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM answer_records WHERE session_id = $1"#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        if answered < session.total_items as i64 {
            return Ok(false);
        }

        let flipped = sqlx::query(
            r#"
            UPDATE test_sessions
            SET status = 'COMPLETED', completed_at = NOW()
            WHERE id = $1 AND status = 'IN_PROGRESS'
            "#,
        )
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        if flipped.rows_affected() == 1 {
            if let Some(def_id) = session.test_definition_id {
                // First completion of a definition wins; re-takes do not
                // overwrite the recorded completion.
                sqlx::query(
                    r#"
                    INSERT INTO test_completions (test_definition_id, user_id, session_id, score)
                    SELECT $1, $2, $3, score FROM test_sessions WHERE id = $3
                    ON CONFLICT (test_definition_id, user_id) DO NOTHING
                    "#,
                )
                .bind(def_id)
                .bind(session.user_id)
                .bind(session_id)
                .execute(&self.pool)
                .await?;
            }
            tracing::info!(session_id = %session_id, "Test session completed");
        }

        Ok(true)
    }

    /// Mandatory queue for a user: active mandatory definitions of the given
    /// kinds with the caller's completion state, in the explicit stable order
    /// (creation time, then id).
    pub async fn mandatory_tests(
        &self,
        user_id: Uuid,
        kinds: &[&str],
    ) -> Result<Vec<MandatoryTestView>> {
        let kinds: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
        let rows = sqlx::query_as::<_, MandatoryRow>(
            r#"
            SELECT td.id, td.title, td.description, td.kind, td.category_id, td.tag_ids,
                   td.total_items, td.is_active, td.is_mandatory, td.is_user_generated,
                   td.created_by, td.created_at,
                   tc.id AS completion_id, tc.session_id AS completion_session_id,
                   tc.score AS completion_score, tc.completed_at AS completion_at
            FROM test_definitions td
            LEFT JOIN test_completions tc
                ON tc.test_definition_id = td.id AND tc.user_id = $1
            WHERE td.is_active = TRUE AND td.is_mandatory = TRUE AND td.kind = ANY($2)
            ORDER BY td.created_at, td.id
            "#,
        )
        .bind(user_id)
        .bind(&kinds)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_view(user_id))
            .collect())
    }

    /// Pool listing: public definitions plus the caller's own user-generated
    /// ones, newest first.
    pub async fn pool_tests(&self, user_id: Uuid, kinds: &[&str]) -> Result<PoolTestsView> {
        let kinds: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
        let public = sqlx::query_as::<_, TestDefinition>(
            r#"
            SELECT * FROM test_definitions
            WHERE is_active = TRUE AND is_mandatory = FALSE
              AND is_user_generated = FALSE AND kind = ANY($1)
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(&kinds)
        .fetch_all(&self.pool)
        .await?;

        let mine = sqlx::query_as::<_, TestDefinition>(
            r#"
            SELECT * FROM test_definitions
            WHERE is_active = TRUE AND is_mandatory = FALSE
              AND is_user_generated = TRUE AND created_by = $1 AND kind = ANY($2)
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(user_id)
        .bind(&kinds)
        .fetch_all(&self.pool)
        .await?;

        Ok(PoolTestsView { public, mine })
    }

    async fn load_definition_for(&self, def_id: Uuid, user_id: Uuid) -> Result<TestDefinition> {
        let definition = sqlx::query_as::<_, TestDefinition>(
            r#"SELECT * FROM test_definitions WHERE id = $1 AND is_active = TRUE"#,
        )
        .bind(def_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;

        if !definition.visible_to(user_id) {
            return Err(Error::NotAuthorized);
        }
        Ok(definition)
    }

    async fn category_by_id(&self, category_id: Uuid) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"SELECT * FROM categories WHERE id = $1"#,
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Category not found".to_string()))?;
        Ok(category)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MandatoryRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    kind: String,
    category_id: Option<Uuid>,
    tag_ids: Vec<Uuid>,
    total_items: i32,
    is_active: bool,
    is_mandatory: bool,
    is_user_generated: bool,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    completion_id: Option<Uuid>,
    completion_session_id: Option<Uuid>,
    completion_score: Option<i32>,
    completion_at: Option<DateTime<Utc>>,
}

impl MandatoryRow {
    fn into_view(self, user_id: Uuid) -> MandatoryTestView {
        let completion = match (
            self.completion_id,
            self.completion_session_id,
            self.completion_score,
            self.completion_at,
        ) {
            (Some(id), Some(session_id), Some(score), Some(completed_at)) => {
                Some(TestCompletion {
                    id,
                    test_definition_id: self.id,
                    user_id,
                    session_id,
                    score,
                    completed_at,
                })
            }
            _ => None,
        };

        MandatoryTestView {
            completed: completion.is_some(),
            completion,
            definition: TestDefinition {
                id: self.id,
                title: self.title,
                description: self.description,
                kind: self.kind,
                category_id: self.category_id,
                tag_ids: self.tag_ids,
                total_items: self.total_items,
                is_active: self.is_active,
                is_mandatory: self.is_mandatory,
                is_user_generated: self.is_user_generated,
                created_by: self.created_by,
                created_at: self.created_at,
            },
        }
    }
}
