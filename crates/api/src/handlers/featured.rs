//! Handlers for the landing-page featured list and its manual pins.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use showcase_core::error::CoreError;
use showcase_core::featured::{clamp_featured_count, select_featured_with_policy, FeaturedSource};
use showcase_core::project::{Project, ProjectStatus};
use showcase_core::types::DbId;
use showcase_db::repositories::{FeaturedRepo, ProjectRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::project::{liked_set, ProjectView};
use crate::middleware::auth::Viewer;
use crate::middleware::rbac::RequireAdmin;
use crate::query::FeaturedParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// One featured slot.
#[derive(Debug, Serialize)]
pub struct FeaturedItem {
    pub source: FeaturedSource,
    #[serde(flatten)]
    pub project: ProjectView,
}

/// Request body for `PUT /admin/featured-pins`.
#[derive(Debug, Deserialize)]
pub struct ReplacePinsRequest {
    pub pins: Vec<DbId>,
}

/// GET /api/v1/featured?k=
///
/// Pins first, then published projects by like count, then the remaining
/// published projects in catalog order. `k` is clamped to `1..=24`. Pins the
/// viewer may not see are skipped.
pub async fn list(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<FeaturedParams>,
) -> AppResult<Json<DataResponse<Vec<FeaturedItem>>>> {
    let k = clamp_featured_count(params.k, state.config.featured_count);
    let inputs = FeaturedRepo::load_inputs(&state.db).await?;

    let pool: Vec<DbId> = inputs
        .projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Published)
        .map(|p| p.id)
        .collect();
    let mut by_id: HashMap<DbId, Project> =
        inputs.projects.into_iter().map(|p| (p.id, p)).collect();

    // A pin never reveals a project the viewer could not open directly.
    let pins: Vec<DbId> = inputs
        .pins
        .iter()
        .copied()
        .filter(|id| {
            by_id
                .get(id)
                .is_some_and(|p| p.is_visible_to(viewer.user_id(), viewer.is_admin()))
        })
        .collect();

    let picks = select_featured_with_policy(
        &pins,
        &inputs.like_counts,
        &pool,
        k,
        state.config.pin_policy,
    );

    let liked = liked_set(&state, viewer.user_id()).await?;

    let items: Vec<FeaturedItem> = picks
        .into_iter()
        .filter_map(|pick| {
            by_id.remove(&pick.id).map(|project| FeaturedItem {
                source: pick.source,
                project: ProjectView::new(project, &inputs.like_counts, &liked),
            })
        })
        .collect();

    tracing::debug!(k, returned = items.len(), "Featured list computed");

    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/admin/featured-pins
pub async fn list_pins(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<DbId>>>> {
    let pins = FeaturedRepo::list_pins(&state.db).await?;
    Ok(Json(DataResponse { data: pins }))
}

/// PUT /api/v1/admin/featured-pins
///
/// Replaces the whole pin list. Every id must name an existing project;
/// repeated ids keep their first position.
pub async fn replace_pins(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ReplacePinsRequest>,
) -> AppResult<Json<DataResponse<Vec<DbId>>>> {
    let missing = ProjectRepo::find_missing(&state.db, &input.pins).await?;
    if !missing.is_empty() {
        let listed: Vec<String> = missing.iter().map(ToString::to_string).collect();
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown project ids: {}",
            listed.join(", ")
        ))));
    }

    let stored = FeaturedRepo::replace_pins(&state.db, &input.pins).await?;

    tracing::info!(pins = ?stored, admin_id = %admin.user_id, "Featured pins replaced");

    Ok(Json(DataResponse { data: stored }))
}
