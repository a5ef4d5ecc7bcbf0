pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use crate::services::{
    answer_service::AnswerService, catalog_service::CatalogService,
    session_service::SessionService, summary_service::SummaryService, view_service::ViewService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub catalog_service: CatalogService,
    pub session_service: SessionService,
    pub answer_service: AnswerService,
    pub view_service: ViewService,
    pub summary_service: SummaryService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let catalog_service = CatalogService::new(pool.clone());
        let session_service = SessionService::new(pool.clone());
        let answer_service = AnswerService::new(pool.clone());
        let view_service = ViewService::new(pool.clone());
        let summary_service = SummaryService::new(pool.clone());

        Self {
            pool,
            catalog_service,
            session_service,
            answer_service,
            view_service,
            summary_service,
        }
    }
}
