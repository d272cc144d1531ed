//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! [`Db`](crate::Db) as the first argument. Writers take the database write
//! lock; readers go straight to the pool.

pub mod featured_repo;
pub mod like_repo;
pub mod project_repo;
pub mod snapshot_repo;

pub use featured_repo::FeaturedRepo;
pub use like_repo::LikeRepo;
pub use project_repo::ProjectRepo;
pub use snapshot_repo::SnapshotRepo;
