//! Row structs and ledger DTOs.
//!
//! Project rows are converted into the canonical
//! [`showcase_core::project::Project`] at the repository boundary; nothing
//! above this crate sees the storage encoding.

pub mod featured;
pub mod like;
pub mod project;
