mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use referee_backend::error::Error;
use referee_backend::models::test_session::{SessionKind, STATUS_COMPLETED};
use referee_backend::services::session_service::CreateSessionParams;
use referee_backend::AppState;

#[tokio::test]
async fn short_session_runs_to_completion_with_idempotent_answers() {
    let Some(pool) = common::setup().await else {
        return;
    };
    let user = common::seed_user(&pool).await;
    let (category_id, slug) = common::seed_category(&pool, "LAWS").await;

    let mut questions = Vec::new();
    for _ in 0..4 {
        questions.push(common::seed_question(&pool, category_id, "LAWS").await);
    }

    let state = AppState::new(pool.clone());

    // Ten requested, four eligible: the session runs short, not into an error.
    let session = state
        .session_service
        .create(
            user,
            CreateSessionParams {
                kind: Some(SessionKind::Laws),
                category_slug: Some(slug),
                total_items: Some(10),
                ..Default::default()
            },
        )
        .await
        .expect("create session");
    assert_eq!(session.total_items, 4);
    assert_eq!(session.item_ids.len(), 4);

    let mut expected_score = 0;
    for (idx, item_id) in session.item_ids.clone().into_iter().enumerate() {
        let q = questions.iter().find(|q| q.id == item_id).expect("item");
        let wrong = idx == 0;
        let choice = if wrong { q.wrong_option } else { q.correct_option };

        let recorded = state
            .answer_service
            .record(session.id, user, item_id, choice, None)
            .await
            .expect("record answer");

        if !wrong {
            expected_score += 1;
        }
        assert_eq!(recorded.is_correct, !wrong);
        assert_eq!(recorded.running_score, expected_score);
        assert_eq!(recorded.completed, idx == 3);
        assert!(recorded.explanation.is_some());
    }

    let refreshed = state
        .session_service
        .get_owned(session.id, user)
        .await
        .expect("reload session");
    assert_eq!(refreshed.status, STATUS_COMPLETED);
    assert!(refreshed.completed_at.is_some());
    assert!(refreshed.completed_at.unwrap() >= refreshed.created_at);

    // The duplicate surfaces the stored outcome and never re-scores.
    let first_item = session.item_ids[0];
    let q = questions.iter().find(|q| q.id == first_item).unwrap();
    let err = state
        .answer_service
        .record(session.id, user, first_item, q.correct_option, None)
        .await
        .unwrap_err();
    match err {
        Error::InvalidState(_) => {} // completed sessions refuse answers outright
        other => panic!("unexpected error: {:?}", other),
    }

    let summary = state
        .summary_service
        .summarize(session.id, user)
        .await
        .expect("summary");
    assert_eq!(summary.total_items, 4);
    assert_eq!(summary.answered_count, 4);
    assert_eq!(summary.correct_count, 3);
    assert_eq!(summary.score_percent, rust_decimal::Decimal::from(75));
}

#[tokio::test]
async fn duplicate_answer_returns_the_original_outcome() {
    let Some(pool) = common::setup().await else {
        return;
    };
    let user = common::seed_user(&pool).await;
    let (category_id, slug) = common::seed_category(&pool, "LAWS").await;
    let q1 = common::seed_question(&pool, category_id, "LAWS").await;
    let q2 = common::seed_question(&pool, category_id, "LAWS").await;

    let state = AppState::new(pool.clone());
    let session = state
        .session_service
        .create(
            user,
            CreateSessionParams {
                kind: Some(SessionKind::Laws),
                category_slug: Some(slug),
                total_items: Some(2),
                ..Default::default()
            },
        )
        .await
        .expect("create session");

    let target = session.item_ids[0];
    let seeded = [&q1, &q2]
        .into_iter()
        .find(|q| q.id == target)
        .expect("seeded item");

    let recorded = state
        .answer_service
        .record(session.id, user, target, seeded.correct_option, None)
        .await
        .expect("first answer");
    assert!(recorded.is_correct);
    assert_eq!(recorded.running_score, 1);

    // Retry with a different (wrong) option: the stored result wins.
    let err = state
        .answer_service
        .record(session.id, user, target, seeded.wrong_option, None)
        .await
        .unwrap_err();
    match err {
        Error::AlreadyAnswered(prior) => {
            assert!(prior.is_correct);
            assert_eq!(prior.running_score, 1);
        }
        other => panic!("expected AlreadyAnswered, got {:?}", other),
    }

    let score: i32 = sqlx::query_scalar("SELECT score FROM test_sessions WHERE id = $1")
        .bind(session.id)
        .fetch_one(&pool)
        .await
        .expect("score");
    assert_eq!(score, 1);
}

#[tokio::test]
async fn zero_eligible_items_fails_session_creation() {
    let Some(pool) = common::setup().await else {
        return;
    };
    let user = common::seed_user(&pool).await;
    let (_category_id, slug) = common::seed_category(&pool, "LAWS").await;

    let state = AppState::new(pool.clone());
    let err = state
        .session_service
        .create(
            user,
            CreateSessionParams {
                kind: Some(SessionKind::Laws),
                category_slug: Some(slug),
                total_items: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientEligibleItems));
}

#[tokio::test]
async fn foreign_user_generated_pool_test_is_not_startable() {
    let Some(pool) = common::setup().await else {
        return;
    };
    let owner = common::seed_user(&pool).await;
    let stranger = common::seed_user(&pool).await;
    let (category_id, _slug) = common::seed_category(&pool, "LAWS").await;
    common::seed_question(&pool, category_id, "LAWS").await;

    let custom = common::seed_test_definition(
        &pool,
        "LAWS",
        Some(category_id),
        false,
        true,
        Some(owner),
        5,
    )
    .await;
    let public = common::seed_test_definition(
        &pool,
        "LAWS",
        Some(category_id),
        false,
        false,
        Some(owner),
        5,
    )
    .await;

    let state = AppState::new(pool.clone());

    let err = state
        .session_service
        .create(
            stranger,
            CreateSessionParams {
                test_definition_id: Some(custom),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotAuthorized));

    // The author can start their own custom test.
    state
        .session_service
        .create(
            owner,
            CreateSessionParams {
                test_definition_id: Some(custom),
                ..Default::default()
            },
        )
        .await
        .expect("owner starts custom test");

    // Anyone can start a public definition, regardless of who configured it.
    state
        .session_service
        .create(
            stranger,
            CreateSessionParams {
                test_definition_id: Some(public),
                ..Default::default()
            },
        )
        .await
        .expect("stranger starts public test");
}

#[tokio::test]
async fn mandatory_queue_flips_to_completed_once() {
    let Some(pool) = common::setup().await else {
        return;
    };
    let user = common::seed_user(&pool).await;
    let (category_id, _slug) = common::seed_category(&pool, "LAWS").await;
    let q = common::seed_question(&pool, category_id, "LAWS").await;

    let def = common::seed_test_definition(
        &pool,
        "LAWS",
        Some(category_id),
        true,
        false,
        None,
        1,
    )
    .await;

    let state = AppState::new(pool.clone());

    let listed = state
        .session_service
        .mandatory_tests(user, &["LAWS"])
        .await
        .expect("mandatory listing");
    let entry = listed
        .iter()
        .find(|t| t.definition.id == def)
        .expect("definition listed");
    assert!(!entry.completed);

    let session = state
        .session_service
        .create(
            user,
            CreateSessionParams {
                test_definition_id: Some(def),
                ..Default::default()
            },
        )
        .await
        .expect("create from definition");
    state
        .answer_service
        .record(session.id, user, q.id, q.correct_option, None)
        .await
        .expect("answer");

    let listed = state
        .session_service
        .mandatory_tests(user, &["LAWS"])
        .await
        .expect("mandatory listing");
    let entry = listed
        .iter()
        .find(|t| t.definition.id == def)
        .expect("definition listed");
    assert!(entry.completed);
}

#[tokio::test]
async fn other_users_cannot_read_a_session() {
    let Some(pool) = common::setup().await else {
        return;
    };
    let owner = common::seed_user(&pool).await;
    let stranger = common::seed_user(&pool).await;
    let (category_id, slug) = common::seed_category(&pool, "LAWS").await;
    common::seed_question(&pool, category_id, "LAWS").await;

    let state = AppState::new(pool.clone());
    let session = state
        .session_service
        .create(
            owner,
            CreateSessionParams {
                kind: Some(SessionKind::Laws),
                category_slug: Some(slug),
                total_items: Some(1),
                ..Default::default()
            },
        )
        .await
        .expect("create session");

    let err = state
        .session_service
        .get_owned(session.id, stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotAuthorized));

    let err = state
        .summary_service
        .summarize(session.id, stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotAuthorized));
}

fn api_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/tests/:session_id/answer",
            post(referee_backend::routes::sessions::record_answer),
        )
        .route(
            "/api/tests/:session_id/summary",
            get(referee_backend::routes::sessions::get_summary),
        )
        .layer(axum::middleware::from_fn(
            referee_backend::middleware::auth::require_bearer_auth,
        ))
        .with_state(state)
}

#[tokio::test]
async fn answer_flow_over_http() {
    let Some(pool) = common::setup().await else {
        return;
    };
    let user = common::seed_user(&pool).await;
    let (category_id, slug) = common::seed_category(&pool, "LAWS").await;
    let q = common::seed_question(&pool, category_id, "LAWS").await;

    let state = AppState::new(pool.clone());
    let session = state
        .session_service
        .create(
            user,
            CreateSessionParams {
                kind: Some(SessionKind::Laws),
                category_slug: Some(slug),
                total_items: Some(1),
                ..Default::default()
            },
        )
        .await
        .expect("create session");

    let app = api_router(state);
    let token = common::bearer_token(user, "REFEREE");

    let body = json!({
        "item_id": q.id,
        "selected_option_id": q.correct_option,
    });
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/tests/{}/answer", session.id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let parsed: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["is_correct"], json!(true));
    assert_eq!(parsed["completed"], json!(true));

    // No token, no access.
    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/tests/{}/summary", session.id))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/tests/{}/summary", session.id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let parsed: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed["correct_count"], json!(1));
    let pct: rust_decimal::Decimal = parsed["score_percent"]
        .as_str()
        .expect("score_percent is a decimal string")
        .parse()
        .unwrap();
    assert_eq!(pct, rust_decimal::Decimal::from(100));
}
