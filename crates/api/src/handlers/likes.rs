//! Handlers for the like ledger.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use showcase_core::error::CoreError;
use showcase_core::types::DbId;
use showcase_db::models::like::LikeToggle;
use showcase_db::repositories::LikeRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::project::find_visible;
use crate::middleware::auth::{AuthUser, Viewer};
use crate::response::DataResponse;
use crate::state::AppState;

/// Like state of one project as seen by the caller.
#[derive(Debug, Serialize)]
pub struct LikeSummary {
    pub project_id: DbId,
    pub count: i64,
    pub liked_by_me: bool,
}

/// POST /api/v1/projects/{id}/like
///
/// Flips the caller's like. Calling it twice restores the original state.
pub async fn toggle(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LikeToggle>>> {
    find_visible(&state, id, &Viewer(Some(user.clone()))).await?;

    let outcome = LikeRepo::toggle(&state.db, id, &user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    tracing::info!(
        project_id = id,
        user_id = %user.user_id,
        liked = outcome.liked,
        count = outcome.count,
        "Like toggled"
    );

    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/projects/{id}/likes
pub async fn get_count(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LikeSummary>>> {
    find_visible(&state, id, &viewer).await?;

    let count = LikeRepo::count_for(&state.db, id).await?;
    let liked_by_me = match viewer.user_id() {
        Some(user_key) => LikeRepo::has_liked(&state.db, id, user_key).await?,
        None => false,
    };

    Ok(Json(DataResponse {
        data: LikeSummary {
            project_id: id,
            count,
            liked_by_me,
        },
    }))
}

/// GET /api/v1/me/likes
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<DbId>>>> {
    let ids = LikeRepo::liked_by_user(&state.db, &user.user_id).await?;
    Ok(Json(DataResponse { data: ids }))
}
