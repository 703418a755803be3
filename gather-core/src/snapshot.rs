//! Recommendation snapshots and their items.
//!
//! A snapshot is immutable once created: a later run for the same user
//! appends a new snapshot rather than editing the old one, and the serving
//! layer picks the most recent per user. Items are owned exclusively by
//! their parent snapshot and are kept in the order they were scored;
//! ordering for display is the consumer's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scored candidate inside a [`RecoSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoItem {
    /// Recommended plan.
    pub plan_id: Uuid,
    /// Relevance score in `0.0..=1.0`.
    pub score: f32,
    /// Whole-metre distance from the user's last known location; `0` when
    /// either endpoint is unknown.
    pub distance_m: u32,
    /// Tags the user shares with the plan.
    pub shared_tag_count: u32,
}

/// A complete, timestamped recommendation result for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoSnapshot {
    /// Opaque unique identifier.
    pub id: Uuid,
    /// User the snapshot was generated for.
    pub user_id: Uuid,
    /// Generation instant.
    pub generated_at: DateTime<Utc>,
    /// Version string of the scoring function that produced the items.
    pub algo_version: String,
    /// Scored candidates in scoring order.
    pub items: Vec<RecoItem>,
}

impl RecoSnapshot {
    /// Construct a snapshot with a fresh identifier.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        generated_at: DateTime<Utc>,
        algo_version: String,
        items: Vec<RecoItem>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            generated_at,
            algo_version,
            items,
        }
    }
}
