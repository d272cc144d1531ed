pub mod admin;
pub mod health;
pub mod project;

use axum::routing::get;
use axum::Router;

use crate::config::ServerConfig;
use crate::handlers::{featured, likes};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                         list (public), create (auth)
/// /projects/{id}                    get (public), patch (author/admin), delete (admin)
/// /projects/{id}/status             set status (admin)
/// /projects/{id}/like               toggle like (auth)
/// /projects/{id}/likes              like count + liked_by_me
///
/// /featured                         featured list (public, ?k=)
///
/// /me/likes                         ids the caller likes (auth)
///
/// /admin/featured-pins              read, replace (admin)
/// /admin/snapshot                   export, import (admin)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .route("/featured", get(featured::list))
        .route("/me/likes", get(likes::list_mine))
        .nest("/admin", admin::router(config.snapshot_max_bytes))
}
