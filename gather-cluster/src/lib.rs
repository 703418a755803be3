//! Density-based spatial clustering for the Gather engine.
//!
//! Partitions the geolocated entities of one scope into DBSCAN clusters
//! over raw (latitude, longitude) degrees, treated as Euclidean for the
//! small `eps` values the engine runs with (0.01° is roughly 1.1 km at the
//! equator). Sparse points are noise and are never materialised; each run
//! fully replaces the previous cluster set for its scope through an
//! injected [`ClusterStore`](gather_core::ClusterStore).
//!
//! # Examples
//! ```
//! use gather_cluster::{DbscanParams, run_scope};
//! use gather_core::{GeoPoint, LocatedEntity, MemoryClusterStore, Scope};
//! use uuid::Uuid;
//!
//! let entities = vec![
//!     LocatedEntity::new(Uuid::new_v4(), Scope::Places, GeoPoint::new(-74.0060, 40.7128)?),
//!     LocatedEntity::new(Uuid::new_v4(), Scope::Places, GeoPoint::new(-74.0061, 40.7129)?),
//! ];
//! let store = MemoryClusterStore::default();
//! let created = run_scope(&store, &entities, Scope::Places, DbscanParams::default())?;
//! assert_eq!(created, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod dbscan;
mod index;

pub use dbscan::{cluster_entities, run_scope};

/// DBSCAN density parameters.
///
/// `eps_degrees` is the neighbourhood radius in degrees of arc and
/// `min_samples` the neighbourhood size (the point itself included) that
/// makes a point a core point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DbscanParams {
    /// Neighbourhood radius in degrees.
    pub eps_degrees: f64,
    /// Minimum neighbourhood size for a core point, itself included.
    pub min_samples: usize,
}

impl DbscanParams {
    /// Validate the parameters and return a copy.
    ///
    /// # Errors
    /// Returns [`DbscanParamsError`] when `eps_degrees` is not a positive
    /// finite number or `min_samples` is zero.
    pub fn validate(self) -> Result<Self, DbscanParamsError> {
        if !self.eps_degrees.is_finite() || self.eps_degrees <= 0.0 {
            return Err(DbscanParamsError::InvalidEps {
                eps_degrees: self.eps_degrees,
            });
        }
        if self.min_samples == 0 {
            return Err(DbscanParamsError::ZeroMinSamples);
        }
        Ok(self)
    }
}

impl Default for DbscanParams {
    fn default() -> Self {
        Self {
            eps_degrees: 0.01,
            min_samples: 2,
        }
    }
}

/// Errors raised when validating [`DbscanParams`].
#[derive(Debug, Error, PartialEq)]
pub enum DbscanParamsError {
    /// The neighbourhood radius was zero, negative, or not finite.
    #[error("eps must be a positive finite number of degrees, got {eps_degrees}")]
    InvalidEps {
        /// Rejected radius value.
        eps_degrees: f64,
    },
    /// A cluster cannot require fewer than one member.
    #[error("min_samples must be at least 1")]
    ZeroMinSamples,
}
