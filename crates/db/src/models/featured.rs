//! Inputs for featured selection, read together from one snapshot.

use std::collections::HashMap;

use showcase_core::project::Project;
use showcase_core::types::DbId;

/// Everything featured selection needs, read in a single read transaction so
/// pins, counts, and the candidate pool agree with one another.
#[derive(Debug, Clone)]
pub struct FeaturedInputs {
    /// Every project, in catalog order.
    pub projects: Vec<Project>,
    pub like_counts: HashMap<DbId, i64>,
    pub pins: Vec<DbId>,
}
