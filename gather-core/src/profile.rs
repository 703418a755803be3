use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::GeoPoint;

/// A user's aggregated interaction history.
///
/// Built per recommendation run from the user's check-ins and joined
/// attendances; an empty profile marks a cold-start user the scoring
/// engine skips.
///
/// # Examples
/// ```
/// use gather_core::UserProfile;
///
/// let profile = UserProfile::default();
/// assert!(profile.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Union of tags across every plan the user interacted with.
    pub tags: BTreeSet<String>,
    /// Position of the most recent check-in that carried one.
    pub last_known_location: Option<GeoPoint>,
    /// Plans the user has already checked into or joined.
    pub visited_plan_ids: BTreeSet<Uuid>,
}

impl UserProfile {
    /// Whether the user has no interaction history at all.
    ///
    /// Cold-start users produce no snapshot; recommendation generation for
    /// them is a documented skip, not an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visited_plan_ids.is_empty()
    }
}
