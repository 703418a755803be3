//! R*-tree indexed coordinates for neighbourhood queries.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

/// A (latitude, longitude) pair with its position in the input slice.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexedPoint {
    pub(crate) position: usize,
    pub(crate) lat: f64,
    pub(crate) lon: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lon])
    }
}

impl PointDistance for IndexedPoint {
    #[expect(
        clippy::float_arithmetic,
        reason = "squared Euclidean degree distance is the index metric"
    )]
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d_lat = self.lat - point[0];
        let d_lon = self.lon - point[1];
        d_lat * d_lat + d_lon * d_lon
    }
}

/// Bulk-load an index over `(lat, lon)` pairs.
pub(crate) fn build_index(coords: &[[f64; 2]]) -> RTree<IndexedPoint> {
    let indexed: Vec<IndexedPoint> = coords
        .iter()
        .enumerate()
        .map(|(position, pair)| IndexedPoint {
            position,
            lat: pair[0],
            lon: pair[1],
        })
        .collect();
    RTree::bulk_load(indexed)
}

/// Indices of every point within `eps` degrees of `origin`, itself included.
#[expect(
    clippy::float_arithmetic,
    reason = "rstar takes the squared search radius"
)]
pub(crate) fn neighbourhood(
    tree: &RTree<IndexedPoint>,
    origin: [f64; 2],
    eps_degrees: f64,
) -> Vec<usize> {
    tree.locate_within_distance(origin, eps_degrees * eps_degrees)
        .map(|point| point.position)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbourhood_includes_origin_and_close_points() {
        let coords = [[40.0, -74.0], [40.0005, -74.0], [41.0, -74.0]];
        let tree = build_index(&coords);

        let mut near = neighbourhood(&tree, [40.0, -74.0], 0.01);
        near.sort_unstable();
        assert_eq!(near, vec![0, 1]);
    }

    #[test]
    fn coincident_points_are_neighbours() {
        let coords = [[40.0, -74.0], [40.0, -74.0]];
        let tree = build_index(&coords);
        assert_eq!(neighbourhood(&tree, [40.0, -74.0], 0.01).len(), 2);
    }
}
