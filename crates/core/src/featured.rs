//! Featured selection for the landing page.
//!
//! Merges the administrator's manual pins with a like-count ranking of the
//! candidate pool, then falls back to pool order, producing at most `k`
//! distinct ids. The result is a pure function of its inputs.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Default number of featured slots on the landing page.
pub const DEFAULT_FEATURED_COUNT: usize = 6;

/// Upper bound accepted for a requested featured count.
pub const MAX_FEATURED_COUNT: usize = 24;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Read-only view of the like ledger's counters.
pub trait LikeCounts {
    /// Like count for `id`; unknown ids count as zero.
    fn likes_for(&self, id: DbId) -> i64;
}

impl LikeCounts for HashMap<DbId, i64> {
    fn likes_for(&self, id: DbId) -> i64 {
        self.get(&id).copied().unwrap_or(0)
    }
}

/// How pins that are not part of the candidate pool are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinPolicy {
    /// Pins are always featured, pool member or not.
    #[default]
    Keep,
    /// Pins outside the pool are ignored.
    Drop,
}

impl FromStr for PinPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(PinPolicy::Keep),
            "drop" => Ok(PinPolicy::Drop),
            other => Err(CoreError::Validation(format!(
                "Invalid pin policy '{other}'. Must be one of: keep, drop"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Why an id made it into the featured list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeaturedSource {
    Pinned,
    Popular,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeaturedPick {
    pub id: DbId,
    pub source: FeaturedSource,
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Select up to `k` featured ids.
///
/// Order is: manual pins (deduplicated, as given), then pool members with at
/// least one like by count descending with ties broken by pool position, then
/// the remaining pool members in pool order. The output never repeats an id
/// and never pads, so its length is `min(k, |pins ∪ pool|)`.
pub fn select_featured(
    manual_pins: &[DbId],
    likes: &impl LikeCounts,
    candidate_pool: &[DbId],
    k: usize,
) -> Vec<DbId> {
    select_featured_explained(manual_pins, likes, candidate_pool, k)
        .into_iter()
        .map(|pick| pick.id)
        .collect()
}

/// [`select_featured`] with the pin policy applied first.
pub fn select_featured_with_policy(
    manual_pins: &[DbId],
    likes: &impl LikeCounts,
    candidate_pool: &[DbId],
    k: usize,
    policy: PinPolicy,
) -> Vec<FeaturedPick> {
    match policy {
        PinPolicy::Keep => select_featured_explained(manual_pins, likes, candidate_pool, k),
        PinPolicy::Drop => {
            let in_pool: HashSet<DbId> = candidate_pool.iter().copied().collect();
            let pins: Vec<DbId> = manual_pins
                .iter()
                .copied()
                .filter(|id| in_pool.contains(id))
                .collect();
            select_featured_explained(&pins, likes, candidate_pool, k)
        }
    }
}

/// Same ordering as [`select_featured`], tagging each id with its source.
pub fn select_featured_explained(
    manual_pins: &[DbId],
    likes: &impl LikeCounts,
    candidate_pool: &[DbId],
    k: usize,
) -> Vec<FeaturedPick> {
    let bound = k.min(manual_pins.len().saturating_add(candidate_pool.len()));
    let mut picks: Vec<FeaturedPick> = Vec::with_capacity(bound);
    let mut seen: HashSet<DbId> = HashSet::with_capacity(bound);

    let mut push = |picks: &mut Vec<FeaturedPick>, id: DbId, source: FeaturedSource| {
        if picks.len() < k && seen.insert(id) {
            picks.push(FeaturedPick { id, source });
        }
    };

    for &id in manual_pins {
        push(&mut picks, id, FeaturedSource::Pinned);
    }

    // Rank by count, then by pool position. The sort is stable, and the
    // index is part of the key anyway, so like timing never matters.
    let mut ranked: Vec<(usize, DbId, i64)> = candidate_pool
        .iter()
        .enumerate()
        .map(|(pos, &id)| (pos, id, likes.likes_for(id)))
        .filter(|&(_, _, count)| count > 0)
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

    for (_, id, _) in ranked {
        push(&mut picks, id, FeaturedSource::Popular);
    }

    for &id in candidate_pool {
        push(&mut picks, id, FeaturedSource::Fallback);
    }

    picks
}

/// Clamp a requested featured count into `1..=MAX_FEATURED_COUNT`.
pub fn clamp_featured_count(requested: Option<i64>, default: usize) -> usize {
    match requested {
        None => default.clamp(1, MAX_FEATURED_COUNT),
        Some(k) => usize::try_from(k).unwrap_or(0).clamp(1, MAX_FEATURED_COUNT),
    }
}
