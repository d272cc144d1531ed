//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the repositories in `showcase_db` and map errors
//! via [`AppError`](crate::error::AppError).

pub mod featured;
pub mod likes;
pub mod project;
pub mod snapshot;
