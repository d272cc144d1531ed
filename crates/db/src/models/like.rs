//! Like ledger DTOs.

use serde::Serialize;

/// Outcome of a like toggle: the caller's new membership and the new count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
    pub count: i64,
}
