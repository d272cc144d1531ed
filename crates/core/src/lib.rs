//! Domain logic for the project showcase catalog.
//!
//! This crate has no internal dependencies and performs no I/O beyond reading
//! a snapshot file, so everything here is usable from the repository layer,
//! the API server, and tests alike.

pub mod error;
pub mod featured;
pub mod project;
pub mod roles;
pub mod search;
pub mod snapshot;
pub mod types;
