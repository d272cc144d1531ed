//! Handlers for whole-catalog snapshot export and import.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use showcase_core::snapshot::{parse_snapshot, CatalogSnapshot};
use showcase_db::repositories::SnapshotRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Outcome of an import.
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub projects: usize,
    pub users_with_likes: usize,
    pub featured_pins: usize,
    /// Records or likes that were repaired or dropped on the way in.
    pub warnings: Vec<String>,
}

/// GET /api/v1/admin/snapshot
///
/// Returns the bare snapshot document so it can be fed back to `PUT` as is.
pub async fn export(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<CatalogSnapshot>> {
    let snapshot = SnapshotRepo::export(&state.db).await?;
    tracing::info!(
        projects = snapshot.projects.len(),
        admin_id = %admin.user_id,
        "Catalog snapshot exported"
    );
    Ok(Json(snapshot))
}

/// PUT /api/v1/admin/snapshot
///
/// Replaces the whole catalog. The body may be a current export or an older
/// document shape; records are normalized before anything is written, and a
/// document that cannot be parsed leaves the catalog untouched.
pub async fn import(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: String,
) -> AppResult<Json<DataResponse<ImportReport>>> {
    let load = parse_snapshot(&body, chrono::Utc::now())?;
    for warning in &load.warnings {
        tracing::warn!(warning = %warning, "Snapshot import repaired input");
    }

    SnapshotRepo::import(&state.db, &load.snapshot).await?;

    tracing::info!(admin_id = %admin.user_id, "Catalog replaced from snapshot");

    Ok(Json(DataResponse {
        data: ImportReport {
            projects: load.snapshot.projects.len(),
            users_with_likes: load.snapshot.likes.user_likes.len(),
            featured_pins: load.snapshot.featured_pins.len(),
            warnings: load.warnings,
        },
    }))
}
