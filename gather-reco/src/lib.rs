//! Personalised recommendation snapshots for the Gather engine.
//!
//! The crate aggregates a user's interaction history into a
//! [`UserProfile`](gather_core::UserProfile), scores a bounded pool of
//! upcoming plans against it, and materialises the result as an immutable
//! [`RecoSnapshot`](gather_core::RecoSnapshot) appended to an injected
//! [`SnapshotStore`](gather_core::SnapshotStore). Users without history and
//! users without matching candidates are skipped, not failed; the serving
//! layer reads "no recommendations yet" as an absent snapshot.
//!
//! Scoring starts every candidate at a base score and adds a tag-overlap
//! bonus plus a flat proximity bonus inside a threshold; see
//! [`RecoConfig`] for the knobs and their defaults.

#![forbid(unsafe_code)]

mod config;
mod engine;
mod history;

pub use config::{RecoConfig, RecoConfigError};
pub use engine::{generate_for_users, generate_snapshot};
pub use history::aggregate_history;
