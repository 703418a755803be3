//! Core domain types for the Gather engine.
//!
//! This crate defines the validated value types shared by the clustering,
//! recommendation, and search engines, the geometry helpers they rank with,
//! and the store traits through which computed artefacts (cluster sets and
//! recommendation snapshots) are handed back to the serving layer. Models
//! validate on construction so invalid input surfaces at the boundary
//! rather than deep inside an algorithm.

#![forbid(unsafe_code)]

pub mod batch;
mod cluster;
mod entity;
pub mod geom;
mod interaction;
mod plan;
mod profile;
mod scope;
mod snapshot;
pub mod store;

pub use cluster::Cluster;
pub use entity::LocatedEntity;
pub use geom::{GeoError, GeoPoint};
pub use interaction::{InteractionKind, InteractionRecord};
pub use plan::Plan;
pub use profile::UserProfile;
pub use scope::{Scope, ScopeParseError};
pub use snapshot::{RecoItem, RecoSnapshot};
pub use store::{ClusterStore, MemoryClusterStore, MemorySnapshotStore, SnapshotStore, StoreError};
