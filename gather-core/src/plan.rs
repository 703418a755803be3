use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::GeoPoint;

/// A scheduled plan, read-only input to the recommendation and search
/// engines.
///
/// The location is resolved by the persistence layer from the plan's place
/// or venue reference; plans without one are skipped by every
/// distance-dependent path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Opaque unique identifier.
    pub id: Uuid,
    /// Resolved position, when the plan has a place or venue.
    pub location: Option<GeoPoint>,
    /// Free-form interest tags.
    pub tags: BTreeSet<String>,
    /// Scheduled start.
    pub starts_at: DateTime<Utc>,
    /// Scheduled end.
    pub ends_at: DateTime<Utc>,
    /// Whether the plan is live; inactive plans are invisible to the engine.
    pub is_active: bool,
    /// Maximum number of attendees.
    pub capacity: u32,
}

impl Plan {
    /// Construct a plan record.
    #[must_use]
    pub const fn new(
        id: Uuid,
        location: Option<GeoPoint>,
        tags: BTreeSet<String>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        is_active: bool,
        capacity: u32,
    ) -> Self {
        Self {
            id,
            location,
            tags,
            starts_at,
            ends_at,
            is_active,
            capacity,
        }
    }

    /// Number of tags shared with `tags`.
    #[must_use]
    pub fn shared_tag_count(&self, tags: &BTreeSet<String>) -> usize {
        self.tags.intersection(tags).count()
    }
}
