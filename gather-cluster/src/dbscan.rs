//! DBSCAN over raw degree coordinates.
//!
//! Distance between points is Euclidean in (latitude, longitude) degrees,
//! a documented small-angle approximation that holds at the city-scale
//! `eps` values the engine uses. Centroids are the arithmetic mean of the
//! member coordinates under the same approximation.

use std::collections::VecDeque;

use gather_core::{Cluster, ClusterStore, GeoPoint, LocatedEntity, Scope, StoreError, geom};
use uuid::Uuid;

use crate::DbscanParams;
use crate::index;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Unvisited,
    Noise,
    Cluster(usize),
}

/// Partition the entities of `scope` into density-based clusters.
///
/// Entities belonging to other scopes are ignored. Fewer than two in-scope
/// entities yield an empty result, as does an input where every point is
/// noise; both are valid outcomes, not errors. Callers are expected to
/// validate `params` via [`DbscanParams::validate`] first.
///
/// # Examples
/// ```
/// use gather_cluster::{DbscanParams, cluster_entities};
/// use gather_core::{GeoPoint, LocatedEntity, Scope};
/// use uuid::Uuid;
///
/// let lone = vec![LocatedEntity::new(
///     Uuid::new_v4(),
///     Scope::Places,
///     GeoPoint::new(-74.0060, 40.7128)?,
/// )];
/// assert!(cluster_entities(&lone, Scope::Places, DbscanParams::default()).is_empty());
/// # Ok::<(), gather_core::GeoError>(())
/// ```
#[must_use]
pub fn cluster_entities(
    entities: &[LocatedEntity],
    scope: Scope,
    params: DbscanParams,
) -> Vec<Cluster> {
    let coords: Vec<[f64; 2]> = entities
        .iter()
        .filter(|entity| entity.scope == scope)
        .map(|entity| [entity.location.lat(), entity.location.lon()])
        .collect();
    if coords.len() < 2 {
        return Vec::new();
    }

    let (labels, found) = assign_labels(&coords, params.eps_degrees, params.min_samples);
    build_clusters(&coords, &labels, found, scope)
}

/// Run clustering for `scope` and atomically replace its stored cluster set.
///
/// Returns the number of clusters in the new set. With fewer than two
/// in-scope entities the run is a no-op and the previous set is kept; a run
/// over a dense-enough input that still yields zero clusters replaces the
/// set with an empty one.
///
/// # Errors
/// Propagates [`StoreError`] when the store rejects the replacement; the
/// previous cluster set stays in place in that case.
pub fn run_scope(
    store: &dyn ClusterStore,
    entities: &[LocatedEntity],
    scope: Scope,
    params: DbscanParams,
) -> Result<usize, StoreError> {
    let in_scope = entities
        .iter()
        .filter(|entity| entity.scope == scope)
        .count();
    if in_scope < 2 {
        log::debug!("{scope}: {in_scope} entities, skipping clustering run");
        return Ok(0);
    }

    let clusters = cluster_entities(entities, scope, params);
    let created = clusters.len();
    store.replace_scope(scope, clusters)?;
    log::debug!("{scope}: replaced cluster set, {created} clusters over {in_scope} entities");
    Ok(created)
}

/// Classic DBSCAN labelling over the coordinate slice.
///
/// Neighbourhoods include the query point itself, so `min_samples` counts
/// the point the way the reference implementations do. Border points take
/// the label of the first core point that reaches them.
#[expect(
    clippy::indexing_slicing,
    reason = "all indices are positions enumerated from the coords slice"
)]
fn assign_labels(coords: &[[f64; 2]], eps_degrees: f64, min_samples: usize) -> (Vec<Label>, usize) {
    let tree = index::build_index(coords);
    let mut labels = vec![Label::Unvisited; coords.len()];
    let mut found = 0_usize;

    for start in 0..coords.len() {
        if labels[start] != Label::Unvisited {
            continue;
        }
        let neighbours = index::neighbourhood(&tree, coords[start], eps_degrees);
        if neighbours.len() < min_samples {
            labels[start] = Label::Noise;
            continue;
        }

        let cluster_id = found;
        found += 1;
        labels[start] = Label::Cluster(cluster_id);

        let mut queue: VecDeque<usize> = neighbours.into_iter().collect();
        while let Some(point) = queue.pop_front() {
            match labels[point] {
                Label::Cluster(_) => continue,
                Label::Noise => {
                    // Border point: density-reachable but not itself core.
                    labels[point] = Label::Cluster(cluster_id);
                    continue;
                }
                Label::Unvisited => {}
            }
            labels[point] = Label::Cluster(cluster_id);
            let reachable = index::neighbourhood(&tree, coords[point], eps_degrees);
            if reachable.len() >= min_samples {
                queue.extend(reachable);
            }
        }
    }

    (labels, found)
}

#[expect(
    clippy::indexing_slicing,
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "cluster ids index the members table they were built from; \
              centroid and radius are degree-space means over bounded counts"
)]
fn build_clusters(
    coords: &[[f64; 2]],
    labels: &[Label],
    found: usize,
    scope: Scope,
) -> Vec<Cluster> {
    let mut members: Vec<Vec<[f64; 2]>> = vec![Vec::new(); found];
    for (position, label) in labels.iter().enumerate() {
        if let Label::Cluster(cluster_id) = label {
            members[*cluster_id].push(coords[position]);
        }
    }

    let mut clusters = Vec::with_capacity(found);
    for (cluster_id, points) in members.iter().enumerate() {
        if points.is_empty() {
            continue;
        }
        let count = points.len() as f64;
        let mean_lat = points.iter().map(|point| point[0]).sum::<f64>() / count;
        let mean_lon = points.iter().map(|point| point[1]).sum::<f64>() / count;
        let Ok(centroid) = GeoPoint::new(mean_lon, mean_lat) else {
            // Means of valid coordinates stay in range; guard anyway.
            log::warn!("{scope}: centroid out of range for cluster {cluster_id}, dropping it");
            continue;
        };

        let radius_degrees = points
            .iter()
            .map(|point| {
                let d_lat = point[0] - mean_lat;
                let d_lon = point[1] - mean_lon;
                (d_lat * d_lat + d_lon * d_lon).sqrt()
            })
            .fold(0.0, f64::max);

        clusters.push(Cluster::new(
            Uuid::new_v4(),
            format!("{} cluster {cluster_id}", scope.title()),
            scope,
            centroid,
            geom::degrees_to_meters(radius_degrees),
            points.len(),
        ));
    }
    clusters
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::float_arithmetic,
        clippy::indexing_slicing,
        reason = "tests compare floating point values on small fixed inputs"
    )]

    use super::*;
    use gather_core::MemoryClusterStore;
    use rstest::{fixture, rstest};

    fn entity(scope: Scope, lon: f64, lat: f64) -> LocatedEntity {
        LocatedEntity::new(
            Uuid::new_v4(),
            scope,
            GeoPoint::new(lon, lat).expect("valid point"),
        )
    }

    #[fixture]
    fn downtown_trio() -> Vec<LocatedEntity> {
        vec![
            entity(Scope::Places, -74.0060, 40.7128),
            entity(Scope::Places, -74.0061, 40.7129),
            entity(Scope::Places, -74.0062, 40.7130),
        ]
    }

    #[rstest]
    fn three_nearby_points_form_one_cluster(downtown_trio: Vec<LocatedEntity>) {
        let clusters = cluster_entities(&downtown_trio, Scope::Places, DbscanParams::default());

        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.member_count, 3);
        assert!((cluster.centroid.lat() - 40.7129).abs() < 1e-9);
        assert!((cluster.centroid.lon() - (-74.0061)).abs() < 1e-9);
        assert_eq!(cluster.scope, Scope::Places);
        assert_eq!(cluster.label, "Places cluster 0");
    }

    #[rstest]
    fn single_entity_is_a_no_op(downtown_trio: Vec<LocatedEntity>) {
        let lone = &downtown_trio[..1];
        assert!(cluster_entities(lone, Scope::Places, DbscanParams::default()).is_empty());
    }

    #[rstest]
    fn empty_input_yields_no_clusters() {
        assert!(cluster_entities(&[], Scope::Places, DbscanParams::default()).is_empty());
    }

    #[rstest]
    fn sparse_points_are_all_noise() {
        let entities = vec![
            entity(Scope::Places, -74.0, 40.7),
            entity(Scope::Places, -73.0, 41.7),
            entity(Scope::Places, -72.0, 42.7),
        ];
        assert!(cluster_entities(&entities, Scope::Places, DbscanParams::default()).is_empty());
    }

    #[rstest]
    fn coincident_points_cluster_with_zero_radius() {
        let entities = vec![
            entity(Scope::Venues, 2.35, 48.85),
            entity(Scope::Venues, 2.35, 48.85),
        ];
        let clusters = cluster_entities(&entities, Scope::Venues, DbscanParams::default());

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].member_count, 2);
        assert_eq!(clusters[0].radius_m, 0.0);
    }

    #[rstest]
    fn distant_groups_form_separate_clusters() {
        let entities = vec![
            entity(Scope::Places, -74.0060, 40.7128),
            entity(Scope::Places, -74.0061, 40.7129),
            entity(Scope::Places, -73.9060, 40.8128),
            entity(Scope::Places, -73.9061, 40.8129),
        ];
        let clusters = cluster_entities(&entities, Scope::Places, DbscanParams::default());

        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|cluster| cluster.member_count == 2));
    }

    #[rstest]
    fn other_scopes_are_ignored(downtown_trio: Vec<LocatedEntity>) {
        let mut entities = downtown_trio;
        entities.push(entity(Scope::Venues, -74.0060, 40.7128));

        let clusters = cluster_entities(&entities, Scope::Venues, DbscanParams::default());
        assert!(clusters.is_empty(), "one venue is not enough to cluster");
    }

    #[rstest]
    fn min_samples_above_neighbourhood_size_leaves_noise(downtown_trio: Vec<LocatedEntity>) {
        let params = DbscanParams {
            eps_degrees: 0.01,
            min_samples: 5,
        };
        assert!(cluster_entities(&downtown_trio, Scope::Places, params).is_empty());
    }

    #[rstest]
    fn clustered_points_satisfy_the_density_invariant(downtown_trio: Vec<LocatedEntity>) {
        let params = DbscanParams::default();
        let coords: Vec<[f64; 2]> = downtown_trio
            .iter()
            .map(|e| [e.location.lat(), e.location.lon()])
            .collect();
        let (labels, _) = assign_labels(&coords, params.eps_degrees, params.min_samples);

        for (position, label) in labels.iter().enumerate() {
            let Label::Cluster(cluster_id) = label else {
                continue;
            };
            let co_members_within_eps = labels
                .iter()
                .enumerate()
                .filter(|(other, other_label)| {
                    *other != position && **other_label == Label::Cluster(*cluster_id)
                })
                .filter(|(other, _)| {
                    let d_lat = coords[position][0] - coords[*other][0];
                    let d_lon = coords[position][1] - coords[*other][1];
                    (d_lat * d_lat + d_lon * d_lon).sqrt() <= params.eps_degrees
                })
                .count();
            assert!(co_members_within_eps >= params.min_samples - 1);
        }
    }

    #[rstest]
    fn run_scope_replaces_previous_set(downtown_trio: Vec<LocatedEntity>) {
        let store = MemoryClusterStore::default();
        let created = run_scope(
            &store,
            &downtown_trio,
            Scope::Places,
            DbscanParams::default(),
        )
        .expect("run clustering");
        assert_eq!(created, 1);

        let moved: Vec<LocatedEntity> = vec![
            entity(Scope::Places, 2.3500, 48.8500),
            entity(Scope::Places, 2.3505, 48.8505),
            entity(Scope::Places, 12.4900, 41.8900),
            entity(Scope::Places, 12.4905, 41.8905),
        ];
        let recreated = run_scope(&store, &moved, Scope::Places, DbscanParams::default())
            .expect("run clustering");

        assert_eq!(recreated, 2);
        assert_eq!(store.clusters_for(Scope::Places).expect("read").len(), 2);
    }

    #[rstest]
    fn run_scope_with_one_entity_keeps_the_old_set(downtown_trio: Vec<LocatedEntity>) {
        let store = MemoryClusterStore::default();
        run_scope(
            &store,
            &downtown_trio,
            Scope::Places,
            DbscanParams::default(),
        )
        .expect("run clustering");

        let lone = &downtown_trio[..1];
        let created = run_scope(&store, lone, Scope::Places, DbscanParams::default())
            .expect("run clustering");

        assert_eq!(created, 0);
        assert_eq!(
            store.clusters_for(Scope::Places).expect("read").len(),
            1,
            "no-op keeps state"
        );
    }

    #[rstest]
    fn run_scope_clears_when_everything_is_noise(downtown_trio: Vec<LocatedEntity>) {
        let store = MemoryClusterStore::default();
        run_scope(
            &store,
            &downtown_trio,
            Scope::Places,
            DbscanParams::default(),
        )
        .expect("run clustering");

        let sparse = vec![
            entity(Scope::Places, -74.0, 40.7),
            entity(Scope::Places, -72.0, 42.7),
        ];
        let created = run_scope(&store, &sparse, Scope::Places, DbscanParams::default())
            .expect("run clustering");

        assert_eq!(created, 0);
        assert!(store.clusters_for(Scope::Places).expect("read").is_empty());
    }
}
