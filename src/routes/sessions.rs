use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use rand::seq::SliceRandom;
use rand::thread_rng;
use uuid::Uuid;
use validator::Validate;

use crate::dto::session_dto::{
    PresentedOption, PresentedQuestion, RecordAnswerRequest, RecordAnswerResponse,
    SessionQuestionsResponse, SessionView, SummaryResponse,
};
use crate::error::Error;
use crate::middleware::auth::AuthUser;
use crate::AppState;

/// The session's questions in their fixed order. Options are reshuffled on
/// every delivery so positions never leak correctness.
#[axum::debug_handler]
pub async fn get_questions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let session = state.session_service.get_owned(session_id, user.id).await?;
    let kind = session.session_kind().ok_or_else(|| {
        Error::Internal(format!("Unrecognized session kind: {}", session.kind))
    })?;
    if kind.is_video() {
        return Err(Error::InvalidState(
            "Video sessions list clips, not questions".to_string(),
        ));
    }

    let questions = state
        .catalog_service
        .questions_by_ids(&session.item_ids)
        .await?;
    let options = state
        .catalog_service
        .options_for_questions(&session.item_ids)
        .await?;

    let mut rng = thread_rng();
    let presented: Vec<PresentedQuestion> = session
        .item_ids
        .iter()
        .filter_map(|item_id| questions.iter().find(|q| q.id == *item_id))
        .map(|q| {
            let mut opts: Vec<PresentedOption> = options
                .iter()
                .filter(|o| o.question_id == q.id)
                .map(|o| PresentedOption {
                    id: o.id,
                    option_role: o.option_role.clone(),
                    text: o.text.clone(),
                })
                .collect();
            opts.shuffle(&mut rng);
            PresentedQuestion {
                id: q.id,
                body: q.body.clone(),
                question_type: q.question_type.clone(),
                options: opts,
            }
        })
        .collect();

    Ok(Json(SessionQuestionsResponse {
        session: SessionView::from(session),
        questions: presented,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn record_answer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<RecordAnswerRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;

    let recorded = state
        .answer_service
        .record(
            session_id,
            user.id,
            req.item_id,
            req.selected_option_id,
            req.second_selected_option_id,
        )
        .await?;

    Ok(Json(RecordAnswerResponse {
        is_correct: recorded.is_correct,
        running_score: recorded.running_score,
        completed: recorded.completed,
        explanation: recorded.explanation,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn get_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let session = state.session_service.get_owned(session_id, user.id).await?;
    let summary = state.summary_service.summarize(session_id, user.id).await?;

    Ok(Json(SummaryResponse {
        session: SessionView::from(session),
        total_items: summary.total_items,
        answered_count: summary.answered_count,
        correct_count: summary.correct_count,
        score_percent: summary.score_percent,
        items: summary.items,
    })
    .into_response())
}
