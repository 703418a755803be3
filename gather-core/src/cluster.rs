use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{GeoPoint, Scope};

/// A density-based cluster of entities within one scope.
///
/// Clusters exist only as the output of a clustering run: each run fully
/// replaces the previous set for its scope, and noise points are never
/// materialised as clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Opaque unique identifier, fresh for every run.
    pub id: Uuid,
    /// Human-readable label, e.g. `"Places cluster 0"`.
    pub label: String,
    /// Scope the cluster was computed for.
    pub scope: Scope,
    /// Arithmetic mean of the member coordinates.
    pub centroid: GeoPoint,
    /// Greatest member distance from the centroid, in metres.
    pub radius_m: f64,
    /// Number of member entities.
    pub member_count: usize,
}

impl Cluster {
    /// Construct a cluster record.
    #[must_use]
    pub const fn new(
        id: Uuid,
        label: String,
        scope: Scope,
        centroid: GeoPoint,
        radius_m: f64,
        member_count: usize,
    ) -> Self {
        Self {
            id,
            label,
            scope,
            centroid,
            radius_m,
            member_count,
        }
    }
}
