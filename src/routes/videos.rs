use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::session_dto::{
    ConsumeViewRequest, EligibleCountRequest, EligibleCountResponse, PresentedClip,
    PresentedOption, SessionClipsResponse, SessionView, StartVideoTestRequest,
};
use crate::error::Error;
use crate::middleware::auth::AuthUser;
use crate::models::test_session::SessionKind;
use crate::services::eligibility::EligibilityConstraints;
use crate::services::session_service::CreateSessionParams;
use crate::AppState;

const VIDEO_KINDS: [&str; 3] = ["AR_CLIP", "VAR_CLIP", "VIDEO_CHALLENGE"];

#[axum::debug_handler]
pub async fn mandatory_tests(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> crate::error::Result<Response> {
    let tests = state
        .session_service
        .mandatory_tests(user.id, &VIDEO_KINDS)
        .await?;
    Ok(Json(json!({ "tests": tests })).into_response())
}

#[axum::debug_handler]
pub async fn pool_tests(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> crate::error::Result<Response> {
    let tests = state.session_service.pool_tests(user.id, &VIDEO_KINDS).await?;
    Ok(Json(json!({ "tests": tests })).into_response())
}

/// Pre-flight: how many clips match this filter. The UI warns before
/// starting when the pool is small; no session is created here.
#[axum::debug_handler]
pub async fn eligible_count(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<EligibleCountRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let constraints = EligibilityConstraints {
        tag_ids: req.tag_ids,
        ..Default::default()
    };
    let count = state
        .catalog_service
        .eligible_clip_count(&constraints, user.id)
        .await?;
    Ok(Json(EligibleCountResponse { count }).into_response())
}

#[axum::debug_handler]
pub async fn start_test(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<StartVideoTestRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;

    let kind = match req.kind.as_deref() {
        Some(raw) => SessionKind::parse(raw)
            .ok_or_else(|| Error::InvalidPayload(format!("Unknown session kind: {}", raw)))?,
        None => SessionKind::VideoChallenge,
    };
    if !kind.is_video() {
        return Err(Error::InvalidPayload(
            "Text sessions start via the test endpoint".to_string(),
        ));
    }

    let session = state
        .session_service
        .create(
            user.id,
            CreateSessionParams {
                kind: Some(kind),
                tag_ids: req.tag_ids,
                total_items: req.total_clips,
                test_definition_id: req.test_definition_id,
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(json!({ "session": SessionView::from(session) })).into_response())
}

/// The session's clips in their fixed order, decision options reshuffled per
/// delivery. Correct decisions are never exposed here.
#[axum::debug_handler]
pub async fn get_clips(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let session = state.session_service.get_owned(session_id, user.id).await?;
    let kind = session.session_kind().ok_or_else(|| {
        Error::Internal(format!("Unrecognized session kind: {}", session.kind))
    })?;
    if !kind.is_video() {
        return Err(Error::InvalidState(
            "Text sessions list questions, not clips".to_string(),
        ));
    }

    let clips = state.catalog_service.clips_by_ids(&session.item_ids).await?;
    let options = state
        .catalog_service
        .options_for_clips(&session.item_ids)
        .await?;

    let mut rng = thread_rng();
    let presented: Vec<PresentedClip> = session
        .item_ids
        .iter()
        .filter_map(|item_id| clips.iter().find(|c| c.id == *item_id))
        .map(|c| {
            let mut opts: Vec<PresentedOption> = options
                .iter()
                .filter(|o| o.clip_id == c.id)
                .map(|o| PresentedOption {
                    id: o.id,
                    option_role: o.option_role.clone(),
                    text: o.text.clone(),
                })
                .collect();
            opts.shuffle(&mut rng);
            PresentedClip {
                id: c.id,
                title: c.title.clone(),
                file_url: c.file_url.clone(),
                thumbnail_url: c.thumbnail_url.clone(),
                options: opts,
            }
        })
        .collect();

    Ok(Json(SessionClipsResponse {
        session: SessionView::from(session),
        clips: presented,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn consume_view(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<ConsumeViewRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let outcome = state
        .view_service
        .consume(session_id, user.id, req.clip_id)
        .await?;
    Ok(Json(outcome).into_response())
}
