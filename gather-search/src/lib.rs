//! Proximity and time-window search over active plans.
//!
//! The search is a synchronous, read-only query: filter the plans that are
//! live, overlap the forward time window, and optionally share a tag with
//! the filter (OR semantics), cut by great-circle distance from the query
//! point, then rank ascending by `(distance, |starts_at − now|)`. The sort
//! is a stable two-key ordering, so identical inputs always produce
//! identical output; pagination is the caller's concern.
//!
//! A degree-space bounding box derived from the radius prefilters the
//! candidates before any Haversine evaluation. The box is padded
//! conservatively so it can only ever admit extra candidates for the exact
//! distance cut to reject.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use gather_core::geom::{self, haversine_distance_m};
use gather_core::{GeoPoint, Plan};
use geo::{Coord, Intersects, Rect};
use serde::{Deserialize, Serialize};

/// Fallback radius and window applied by [`SearchQuery::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchDefaults {
    /// Search radius in kilometres.
    pub radius_km: f64,
    /// Forward time window in hours.
    pub window_hours: i64,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            radius_km: 2.0,
            window_hours: 2,
        }
    }
}

/// One proximity search request.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use gather_core::GeoPoint;
/// use gather_search::SearchQuery;
///
/// let origin = GeoPoint::new(-74.0060, 40.7128)?;
/// let query = SearchQuery::new(origin, Utc::now())
///     .with_radius_km(5.0)
///     .with_tags(["coffee".to_owned()]);
/// assert_eq!(query.radius_km, 5.0);
/// # Ok::<(), gather_core::GeoError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Point the search radiates from.
    pub origin: GeoPoint,
    /// Radius cut in kilometres.
    pub radius_km: f64,
    /// How far ahead of `now` a plan may start, in hours.
    pub window_hours: i64,
    /// Optional tag filter; a plan matches when it shares at least one tag.
    pub tag_filter: Option<BTreeSet<String>>,
    /// Reference instant for the window and the ranking tiebreak.
    pub now: DateTime<Utc>,
}

impl SearchQuery {
    /// Build a query with the default radius and window and no tag filter.
    #[must_use]
    pub fn new(origin: GeoPoint, now: DateTime<Utc>) -> Self {
        let defaults = SearchDefaults::default();
        Self {
            origin,
            radius_km: defaults.radius_km,
            window_hours: defaults.window_hours,
            tag_filter: None,
            now,
        }
    }

    /// Replace the radius, keeping the rest of the query.
    #[must_use]
    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    /// Replace the forward window, keeping the rest of the query.
    #[must_use]
    pub fn with_window_hours(mut self, window_hours: i64) -> Self {
        self.window_hours = window_hours;
        self
    }

    /// Set a tag filter; matching is OR across the given tags.
    #[must_use]
    pub fn with_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.tag_filter = Some(tags.into_iter().collect());
        self
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The matching plan.
    pub plan: Plan,
    /// Great-circle distance from the query point in metres.
    pub distance_m: f64,
}

/// Run a proximity/time-window search and return the full ranked sequence.
///
/// A plan is eligible when it is active, starts no later than `now +
/// window`, has not yet ended, carries a location, passes the optional tag
/// filter, and lies within the radius (boundary inclusive). Results are
/// ranked ascending by distance with `|starts_at − now|` breaking ties.
/// Zero hits is a valid outcome, surfaced as an empty vector.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the radius cut converts kilometres to metres"
)]
pub fn search_plans(plans: &[Plan], query: &SearchQuery) -> Vec<SearchHit> {
    let window_end = query.now + TimeDelta::hours(query.window_hours);
    let radius_m = query.radius_km * 1_000.0;
    let prefilter = bounding_box(&query.origin, radius_m);

    let mut hits: Vec<SearchHit> = plans
        .iter()
        .filter(|plan| plan.is_active && plan.starts_at <= window_end && plan.ends_at >= query.now)
        .filter(|plan| matches_tags(plan, query.tag_filter.as_ref()))
        .filter_map(|plan| {
            let location = plan.location?;
            if !prefilter.intersects(&location.coord()) {
                return None;
            }
            let distance_m = haversine_distance_m(&query.origin, &location);
            (distance_m <= radius_m).then(|| SearchHit {
                plan: plan.clone(),
                distance_m,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        a.distance_m
            .total_cmp(&b.distance_m)
            .then_with(|| start_proximity(&a.plan, query.now).cmp(&start_proximity(&b.plan, query.now)))
    });

    log::debug!(
        "search at ({}, {}): {} hits within {radius_m} m",
        query.origin.lon(),
        query.origin.lat(),
        hits.len()
    );
    hits
}

fn matches_tags(plan: &Plan, filter: Option<&BTreeSet<String>>) -> bool {
    match filter {
        // An empty filter set filters nothing, matching the serving layer's
        // treatment of a blank `tags` query parameter.
        None => true,
        Some(tags) if tags.is_empty() => true,
        Some(tags) => plan.shared_tag_count(tags) > 0,
    }
}

fn start_proximity(plan: &Plan, now: DateTime<Utc>) -> TimeDelta {
    (plan.starts_at - now).abs()
}

/// Conservative degree-space box around `origin` covering `radius_m`.
///
/// Latitude uses the equatorial degree length; longitude widens it by the
/// local latitude's cosine, falling back to the whole globe near the poles
/// where the conversion degenerates. A 10% pad keeps the box a pure
/// prefilter: it may admit extra candidates, never exclude a true hit.
#[expect(
    clippy::float_arithmetic,
    reason = "degree-per-metre conversion around the query point"
)]
fn bounding_box(origin: &GeoPoint, radius_m: f64) -> Rect<f64> {
    let lat_delta = radius_m / geom::METERS_PER_DEGREE * 1.1;
    let cos_lat = origin.lat().to_radians().cos();
    let lon_delta = if cos_lat <= 0.01 {
        180.0
    } else {
        (lat_delta / cos_lat).min(180.0)
    };

    Rect::new(
        Coord {
            x: origin.lon() - lon_delta,
            y: (origin.lat() - lat_delta).max(-90.0),
        },
        Coord {
            x: origin.lon() + lon_delta,
            y: (origin.lat() + lat_delta).min(90.0),
        },
    )
}
