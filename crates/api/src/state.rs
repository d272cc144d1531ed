use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the database handle and config are shared).
#[derive(Clone)]
pub struct AppState {
    /// Catalog database handle (pool plus serializing write lock).
    pub db: showcase_db::Db,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
