use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::category::Category;
use crate::models::question::{AnswerOption, Question};
use crate::models::tag::Tag;
use crate::models::test_session::SessionKind;
use crate::models::video_clip::{ClipDecisionOption, VideoClip};
use crate::services::eligibility::{CatalogItem, EligibilityConstraints, EligibilityFilter};

/// Read-only view over the catalog store: categories, tags, questions with
/// their options, clips with their decision options. The engine never writes
/// through this service.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct UniverseRow {
    id: Uuid,
    is_active: bool,
    is_user_generated: bool,
    created_by: Option<Uuid>,
    category_slug: Option<String>,
    category_type: Option<String>,
    tag_ids: Vec<Uuid>,
}

impl From<UniverseRow> for CatalogItem {
    fn from(row: UniverseRow) -> Self {
        CatalogItem {
            id: row.id,
            is_active: row.is_active,
            is_user_generated: row.is_user_generated,
            created_by: row.created_by,
            category_slug: row.category_slug,
            category_type: row.category_type,
            tag_ids: row.tag_ids.into_iter().collect(),
        }
    }
}

/// Correctness data for one item, shape-agnostic across questions and clips.
#[derive(Debug, Clone)]
pub struct OptionKey {
    pub id: Uuid,
    pub role: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct ItemAnswerKey {
    pub options: Vec<OptionKey>,
    pub explanation: Option<String>,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_category(
        &self,
        slug: Option<&str>,
        category_type: Option<&str>,
    ) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            WHERE ($1::text IS NULL OR slug = $1)
              AND ($2::text IS NULL OR category_type = $2)
            ORDER BY display_order, slug
            LIMIT 1
            "#,
        )
        .bind(slug)
        .bind(category_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Active tags only; a request naming an inactive or unknown tag fails
    /// filter construction rather than silently matching nothing.
    pub async fn tag_registry(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"SELECT * FROM tags WHERE is_active = TRUE ORDER BY axis, display_order, slug"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    /// Snapshot of all questions of one kind, with category and tag data
    /// attached. A single read; concurrent catalog edits may or may not be
    /// reflected in the snapshot.
    pub async fn question_universe(&self, question_type: &str) -> Result<Vec<CatalogItem>> {
        let rows = sqlx::query_as::<_, UniverseRow>(
            r#"
            SELECT q.id, q.is_active, q.is_user_generated, q.created_by,
                   c.slug AS category_slug, c.category_type,
                   COALESCE(array_agg(qt.tag_id) FILTER (WHERE qt.tag_id IS NOT NULL), '{}'::uuid[]) AS tag_ids
            FROM questions q
            JOIN categories c ON c.id = q.category_id
            LEFT JOIN question_tags qt ON qt.question_id = q.id
            WHERE q.question_type = $1
            GROUP BY q.id, c.slug, c.category_type
            ORDER BY q.created_at, q.id
            "#,
        )
        .bind(question_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CatalogItem::from).collect())
    }

    pub async fn clip_universe(&self) -> Result<Vec<CatalogItem>> {
        let rows = sqlx::query_as::<_, UniverseRow>(
            r#"
            SELECT v.id, v.is_active, FALSE AS is_user_generated, v.created_by,
                   NULL::text AS category_slug, NULL::text AS category_type,
                   COALESCE(array_agg(ct.tag_id) FILTER (WHERE ct.tag_id IS NOT NULL), '{}'::uuid[]) AS tag_ids
            FROM video_clips v
            LEFT JOIN clip_tags ct ON ct.clip_id = v.id
            GROUP BY v.id
            ORDER BY v.created_at, v.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CatalogItem::from).collect())
    }

    /// Pre-flight check: how many clips match a filter, without creating a
    /// session. The UI warns the user before starting when the pool is small.
    pub async fn eligible_clip_count(
        &self,
        constraints: &EligibilityConstraints,
        caller: Uuid,
    ) -> Result<usize> {
        let registry = self.tag_registry().await?;
        let filter = EligibilityFilter::new(constraints, &registry, caller)?;
        let universe = self.clip_universe().await?;
        Ok(filter.apply(&universe).len())
    }

    pub async fn questions_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"SELECT * FROM questions WHERE id = ANY($1)"#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    pub async fn options_for_questions(&self, ids: &[Uuid]) -> Result<Vec<AnswerOption>> {
        let options = sqlx::query_as::<_, AnswerOption>(
            r#"SELECT * FROM answer_options WHERE question_id = ANY($1)"#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }

    pub async fn clips_by_ids(&self, ids: &[Uuid]) -> Result<Vec<VideoClip>> {
        let clips = sqlx::query_as::<_, VideoClip>(
            r#"SELECT * FROM video_clips WHERE id = ANY($1)"#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(clips)
    }

    pub async fn options_for_clips(&self, ids: &[Uuid]) -> Result<Vec<ClipDecisionOption>> {
        let options = sqlx::query_as::<_, ClipDecisionOption>(
            r#"SELECT * FROM clip_decision_options WHERE clip_id = ANY($1)"#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }

    /// Everything the scorer needs about one item.
    pub async fn answer_key(&self, kind: SessionKind, item_id: Uuid) -> Result<ItemAnswerKey> {
        if kind.is_video() {
            let clip = sqlx::query_as::<_, VideoClip>(
                r#"SELECT * FROM video_clips WHERE id = $1"#,
            )
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Clip not found".to_string()))?;

            let options = self.options_for_clips(&[clip.id]).await?;
            Ok(ItemAnswerKey {
                options: options
                    .into_iter()
                    .map(|o| OptionKey {
                        id: o.id,
                        role: o.option_role,
                        is_correct: o.is_correct,
                    })
                    .collect(),
                explanation: None,
            })
        } else {
            let question = sqlx::query_as::<_, Question>(
                r#"SELECT * FROM questions WHERE id = $1"#,
            )
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;

            let options = self.options_for_questions(&[question.id]).await?;
            Ok(ItemAnswerKey {
                options: options
                    .into_iter()
                    .map(|o| OptionKey {
                        id: o.id,
                        role: o.option_role,
                        is_correct: o.is_correct,
                    })
                    .collect(),
                explanation: question.explanation,
            })
        }
    }

    /// Clip catalog listing for administrative configuration; callers must
    /// hold the SUPER_ADMIN role (checked at the route).
    pub async fn list_clips(&self) -> Result<Vec<VideoClip>> {
        let clips = sqlx::query_as::<_, VideoClip>(
            r#"SELECT * FROM video_clips ORDER BY created_at DESC, id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(clips)
    }
}
