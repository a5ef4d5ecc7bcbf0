use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use referee_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let api = Router::new()
        .route(
            "/api/tests/laws/mandatory",
            get(routes::laws::mandatory_tests),
        )
        .route("/api/tests/laws/pool", get(routes::laws::pool_tests))
        .route("/api/tests/start", post(routes::laws::start_test))
        .route(
            "/api/tests/videos/mandatory",
            get(routes::videos::mandatory_tests),
        )
        .route("/api/tests/videos/pool", get(routes::videos::pool_tests))
        .route(
            "/api/tests/videos/eligible",
            post(routes::videos::eligible_count),
        )
        .route("/api/tests/videos/start", post(routes::videos::start_test))
        .route(
            "/api/tests/videos/:session_id/clips",
            get(routes::videos::get_clips),
        )
        .route(
            "/api/tests/videos/:session_id/consume-view",
            post(routes::videos::consume_view),
        )
        .route(
            "/api/tests/videos/:session_id/answer",
            post(routes::sessions::record_answer),
        )
        .route(
            "/api/tests/videos/:session_id/summary",
            get(routes::sessions::get_summary),
        )
        .route(
            "/api/tests/:session_id/questions",
            get(routes::sessions::get_questions),
        )
        .route(
            "/api/tests/:session_id/answer",
            post(routes::sessions::record_answer),
        )
        .route(
            "/api/tests/:session_id/summary",
            get(routes::sessions::get_summary),
        )
        .route(
            "/api/admin/library/videos",
            get(routes::admin::list_clips),
        )
        .layer(axum::middleware::from_fn_with_state(
            referee_backend::middleware::rate_limit::new_rps_state(config.api_rps),
            referee_backend::middleware::rate_limit::rps_middleware,
        ))
        .layer(axum::middleware::from_fn(
            referee_backend::middleware::auth::require_bearer_auth,
        ));

    let app = base_routes
        .merge(api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
