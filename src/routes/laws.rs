use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::dto::session_dto::{SessionView, StartTestRequest};
use crate::error::Error;
use crate::middleware::auth::AuthUser;
use crate::models::test_session::SessionKind;
use crate::services::session_service::CreateSessionParams;
use crate::AppState;

/// Mandatory curriculum for the caller, with completion state. The queue is
/// meant to be exhausted before pool practice; ordering is stable.
#[axum::debug_handler]
pub async fn mandatory_tests(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> crate::error::Result<Response> {
    let tests = state
        .session_service
        .mandatory_tests(user.id, &[SessionKind::Laws.as_str()])
        .await?;
    Ok(Json(json!({ "tests": tests })).into_response())
}

#[axum::debug_handler]
pub async fn pool_tests(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> crate::error::Result<Response> {
    let tests = state
        .session_service
        .pool_tests(user.id, &[SessionKind::Laws.as_str()])
        .await?;
    Ok(Json(json!({ "tests": tests })).into_response())
}

#[axum::debug_handler]
pub async fn start_test(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<StartTestRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;

    let kind = match req.kind.as_deref() {
        Some(raw) => Some(
            SessionKind::parse(raw)
                .ok_or_else(|| Error::InvalidPayload(format!("Unknown session kind: {}", raw)))?,
        ),
        None => None,
    };
    if let Some(kind) = kind {
        if kind.is_video() {
            return Err(Error::InvalidPayload(
                "Video sessions start via the video endpoint".to_string(),
            ));
        }
    }

    let session = state
        .session_service
        .create(
            user.id,
            CreateSessionParams {
                kind,
                category_slug: req.category_slug,
                category_type: req.category_type,
                tag_ids: req.tag_ids,
                total_items: req.total_questions,
                test_definition_id: req.test_definition_id,
            },
        )
        .await?;

    Ok(Json(json!({ "session": SessionView::from(session) })).into_response())
}
