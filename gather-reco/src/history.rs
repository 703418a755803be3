//! Interaction history aggregation.

use gather_core::{InteractionKind, InteractionRecord, UserProfile};
use uuid::Uuid;

/// Aggregate a user's interaction records into a [`UserProfile`].
///
/// Records belonging to other users are ignored, so callers may pass the
/// whole derived view. Tags union across every interacted plan; when
/// several check-ins carry a position, the most recent one is
/// authoritative for `last_known_location`. A user with no records yields
/// an empty profile, which downstream scoring treats as a cold-start skip.
///
/// # Examples
/// ```
/// use gather_reco::aggregate_history;
/// use uuid::Uuid;
///
/// let profile = aggregate_history(Uuid::new_v4(), &[]);
/// assert!(profile.is_empty());
/// ```
#[must_use]
pub fn aggregate_history(user_id: Uuid, records: &[InteractionRecord]) -> UserProfile {
    let mut profile = UserProfile::default();
    let mut latest_check_in: Option<&InteractionRecord> = None;

    for record in records.iter().filter(|record| record.user_id == user_id) {
        profile.tags.extend(record.tags.iter().cloned());
        profile.visited_plan_ids.insert(record.plan_id);

        if record.kind == InteractionKind::CheckIn && record.location.is_some() {
            let is_newer = latest_check_in
                .is_none_or(|current| record.occurred_at > current.occurred_at);
            if is_newer {
                latest_check_in = Some(record);
            }
        }
    }

    profile.last_known_location = latest_check_in.and_then(|record| record.location);
    profile
}
