use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;

use crate::error::Error;
use crate::middleware::auth::AuthUser;
use crate::AppState;

/// Full clip catalog for administrative configuration. SUPER_ADMIN only;
/// session logic never reads through here.
#[axum::debug_handler]
pub async fn list_clips(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> crate::error::Result<Response> {
    if !user.is_super_admin() {
        return Err(Error::NotAuthorized);
    }
    let clips = state.catalog_service.list_clips().await?;
    Ok(Json(json!({ "clips": clips })).into_response())
}
