//! Facade crate for the Gather geospatial clustering and recommendation
//! engine.
//!
//! This crate re-exports the core domain types together with the three
//! engine pipelines: density-based clustering, recommendation snapshot
//! generation, and proximity/time-window search.

#![forbid(unsafe_code)]

pub use gather_cluster::{DbscanParams, DbscanParamsError, cluster_entities, run_scope};
pub use gather_core::{
    Cluster, ClusterStore, GeoError, GeoPoint, InteractionKind, InteractionRecord, LocatedEntity,
    MemoryClusterStore, MemorySnapshotStore, Plan, RecoItem, RecoSnapshot, Scope, ScopeParseError,
    SnapshotStore, StoreError, UserProfile,
    batch::{BatchReport, run_batch},
    geom::{degrees_to_meters, haversine_distance_m},
};
pub use gather_reco::{
    RecoConfig, RecoConfigError, aggregate_history, generate_for_users, generate_snapshot,
};
pub use gather_search::{SearchDefaults, SearchHit, SearchQuery, search_plans};
