use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Eligibility-filter label. `axis` is an open set of strings (`CATEGORY`,
/// `RESTARTS`, `CRITERIA`, `SANCTION`, `SCENARIO`, ...); filter semantics are
/// OR within one axis and AND across axes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub axis: String,
    pub slug: String,
    pub name: String,
    pub color: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
}
