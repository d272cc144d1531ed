//! Route definitions for administrator-only catalog operations.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use crate::handlers::{featured, snapshot};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /featured-pins    -> list_pins
/// PUT    /featured-pins    -> replace_pins
/// GET    /snapshot         -> export
/// PUT    /snapshot         -> import
/// ```
///
/// Snapshot bodies may be larger than the default request limit, up to
/// `snapshot_max_bytes`.
pub fn router(snapshot_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/featured-pins",
            get(featured::list_pins).put(featured::replace_pins),
        )
        .route(
            "/snapshot",
            get(snapshot::export)
                .put(snapshot::import)
                .layer(DefaultBodyLimit::max(snapshot_max_bytes)),
        )
}
