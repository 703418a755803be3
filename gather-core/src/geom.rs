//! Geometry helpers for WGS84 coordinates.
//!
//! Distances are great-circle (Haversine) metres on a spherical Earth of
//! radius 6371 km. Degree deltas convert to metres with the equatorial
//! 1° ≈ 111 000 m approximation; at city scale the error is small and the
//! tradeoff is documented on [`degrees_to_meters`].

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in metres used by [`haversine_distance_m`].
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres spanned by one degree of arc at the equator.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Errors raised when constructing or deserialising geometry values.
#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    /// Longitude or latitude was outside the valid WGS84 range.
    #[error("invalid coordinate ({lon}, {lat}): longitude must be in [-180, 180] and latitude in [-90, 90]")]
    InvalidCoordinate {
        /// Offending longitude in degrees.
        lon: f64,
        /// Offending latitude in degrees.
        lat: f64,
    },
}

/// A validated WGS84 position with `lon = x` and `lat = y` in degrees.
///
/// Out-of-range coordinates are rejected on construction, never clamped,
/// so downstream distance math can assume well-formed input.
///
/// # Examples
/// ```
/// use gather_core::GeoPoint;
///
/// let point = GeoPoint::new(-74.0060, 40.7128)?;
/// assert_eq!(point.lon(), -74.0060);
/// assert!(GeoPoint::new(-74.0060, 91.0).is_err());
/// # Ok::<(), gather_core::GeoError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lon: f64,
    lat: f64,
}

/// Unvalidated wire shape for [`GeoPoint`].
#[derive(Debug, Clone, Copy, Deserialize)]
struct RawGeoPoint {
    lon: f64,
    lat: f64,
}

impl GeoPoint {
    /// Validate and construct a point from degrees.
    ///
    /// # Errors
    /// Returns [`GeoError::InvalidCoordinate`] when the longitude is outside
    /// `[-180, 180]` or the latitude is outside `[-90, 90]`, including NaN.
    pub fn new(lon: f64, lat: f64) -> Result<Self, GeoError> {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidCoordinate { lon, lat });
        }
        Ok(Self { lon, lat })
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// The point as a `geo` coordinate (`x = longitude`, `y = latitude`).
    #[must_use]
    pub const fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.lon, raw.lat)
    }
}

impl TryFrom<Coord<f64>> for GeoPoint {
    type Error = GeoError;

    fn try_from(coord: Coord<f64>) -> Result<Self, Self::Error> {
        Self::new(coord.x, coord.y)
    }
}

/// Great-circle distance between two points in metres.
///
/// Pure and deterministic; both inputs are validated [`GeoPoint`]s, so the
/// function has no failure modes of its own.
///
/// # Examples
/// ```
/// use gather_core::{GeoPoint, geom::haversine_distance_m};
///
/// let a = GeoPoint::new(0.0, 0.0)?;
/// let b = GeoPoint::new(0.0, 1.0)?;
/// let d = haversine_distance_m(&a, &b);
/// assert!((d - 111_195.0).abs() < 100.0);
/// # Ok::<(), gather_core::GeoError>(())
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "Haversine is floating-point trigonometry by definition"
)]
pub fn haversine_distance_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Convert a degree delta to metres with the equatorial approximation.
///
/// Known precision tradeoff, not a bug: one degree of longitude shrinks
/// towards the poles, so this overstates east-west spans away from the
/// equator. Cluster radii and `eps` thresholds accept that error at city
/// scale in exchange for staying linear in the degree delta.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "unit conversion is a single multiplication"
)]
pub fn degrees_to_meters(delta_degrees: f64) -> f64 {
    delta_degrees * METERS_PER_DEGREE
}
