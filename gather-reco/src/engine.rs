//! Snapshot generation over the candidate pool.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use gather_core::batch::{BatchReport, run_batch};
use gather_core::geom::haversine_distance_m;
use gather_core::{
    InteractionRecord, Plan, RecoItem, RecoSnapshot, SnapshotStore, StoreError, UserProfile,
};
use uuid::Uuid;

use crate::{RecoConfig, aggregate_history};

/// Generate one recommendation snapshot for a user.
///
/// The candidate pool is the active plans starting at or after `now` that
/// the user has not interacted with, truncated to
/// [`prefetch_cap`](RecoConfig::prefetch_cap) and scored up to
/// [`score_cap`](RecoConfig::score_cap). Items keep scoring order; the
/// consumer sorts by score for display.
///
/// Returns `None` for a cold-start profile or an empty candidate pool.
/// Both are documented skips: no snapshot is generated and the previous
/// one, if any, stays authoritative.
#[must_use]
pub fn generate_snapshot(
    profile: &UserProfile,
    user_id: Uuid,
    plans: &[Plan],
    now: DateTime<Utc>,
    config: &RecoConfig,
) -> Option<RecoSnapshot> {
    if profile.is_empty() {
        log::debug!("user {user_id}: no interaction history, skipping");
        return None;
    }

    let candidates: Vec<&Plan> = plans
        .iter()
        .filter(|plan| {
            plan.is_active
                && plan.starts_at >= now
                && !profile.visited_plan_ids.contains(&plan.id)
        })
        .take(config.prefetch_cap)
        .collect();
    if candidates.is_empty() {
        log::debug!("user {user_id}: no upcoming candidates, skipping");
        return None;
    }

    let items: Vec<RecoItem> = candidates
        .into_iter()
        .take(config.score_cap)
        .map(|plan| score_candidate(profile, plan, config))
        .collect();

    Some(RecoSnapshot::new(
        user_id,
        now,
        config.algo_version.clone(),
        items,
    ))
}

/// Score a single candidate plan against a profile.
///
/// The score starts at the base, gains a tag-overlap bonus proportional to
/// the shared fraction of the user's tags, gains the flat proximity bonus
/// when both locations are known and closer than the threshold, and is
/// clamped to `1.0`. Distance is recorded in whole metres, `0` when either
/// endpoint is unknown.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "scoring is bounded float blending; counts and rounded \
              non-negative distances fit their integer types"
)]
fn score_candidate(profile: &UserProfile, plan: &Plan, config: &RecoConfig) -> RecoItem {
    let shared = plan.shared_tag_count(&profile.tags);
    let denominator = profile.tags.len().max(1) as f32;
    let overlap = (shared as f32 / denominator).min(1.0);
    let mut score = config.base_score + config.tag_weight * overlap;

    let mut distance_m = 0_u32;
    if let (Some(user_location), Some(plan_location)) =
        (profile.last_known_location, plan.location)
    {
        let distance = haversine_distance_m(&user_location, &plan_location);
        distance_m = distance.round() as u32;
        if distance < config.proximity_threshold_m {
            score += config.proximity_bonus;
        }
    }

    RecoItem {
        plan_id: plan.id,
        score: score.min(1.0),
        distance_m,
        shared_tag_count: shared as u32,
    }
}

/// Generate snapshots for every user present in `interactions`.
///
/// Each user is one isolated unit of work: aggregation and scoring run per
/// user, produced snapshots are appended to `store`, and a store failure
/// for one user is logged and counted without aborting the rest. Skipped
/// users (cold start, no candidates) count as completed units.
pub fn generate_for_users(
    store: &dyn SnapshotStore,
    interactions: &[InteractionRecord],
    plans: &[Plan],
    now: DateTime<Utc>,
    config: &RecoConfig,
) -> BatchReport {
    let users: BTreeSet<Uuid> = interactions.iter().map(|record| record.user_id).collect();
    run_batch("recommendations", users, |user_id| -> Result<(), StoreError> {
        let profile = aggregate_history(user_id, interactions);
        if let Some(snapshot) = generate_snapshot(&profile, user_id, plans, now, config) {
            store.append(snapshot)?;
        }
        Ok(())
    })
}
