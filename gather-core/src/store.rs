//! Stores for engine-owned artefacts.
//!
//! The engines never hold module-level state; callers inject a store and
//! the write discipline does the rest. Cluster sets are replaced whole per
//! scope, snapshots are append-only, so an aborted batch run leaves
//! previously committed state intact and concurrent readers observe either
//! the old complete artefact or the new one, never a partial mix.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use uuid::Uuid;

use crate::{Cluster, RecoSnapshot, Scope};

/// Error surfaced by a store backend.
///
/// The in-memory stores never fail; database-backed implementations report
/// their driver errors through this type so batch runs can isolate them
/// per unit of work.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing collection rejected the read or write.
    #[error("store backend failure: {message}")]
    Backend {
        /// Driver-level description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Build a backend error from any displayable cause.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Owner of the per-scope cluster sets.
///
/// Implementations must make [`replace_scope`](Self::replace_scope) atomic
/// from a reader's perspective.
pub trait ClusterStore: Send + Sync {
    /// Atomically replace every cluster of `scope` with `clusters`.
    ///
    /// An empty `clusters` clears the scope; other scopes are untouched.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend rejects the write; the
    /// previous cluster set must survive a failed replacement intact.
    fn replace_scope(&self, scope: Scope, clusters: Vec<Cluster>) -> Result<(), StoreError>;

    /// Return the current cluster set for `scope`.
    ///
    /// An empty result is a valid state, not an error.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend cannot be read.
    fn clusters_for(&self, scope: Scope) -> Result<Vec<Cluster>, StoreError>;
}

/// Owner of the append-only recommendation snapshot collection.
pub trait SnapshotStore: Send + Sync {
    /// Append a freshly generated snapshot.
    ///
    /// Snapshots are never mutated in place; superseding a user's
    /// recommendations means appending a newer snapshot.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend rejects the write.
    fn append(&self, snapshot: RecoSnapshot) -> Result<(), StoreError>;

    /// Return the most recent snapshot for `user_id`, if any.
    ///
    /// Ties on `generated_at` resolve to the later append.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend cannot be read.
    fn latest_for(&self, user_id: Uuid) -> Result<Option<RecoSnapshot>, StoreError>;
}

/// In-memory [`ClusterStore`] guarded by a read-write lock.
///
/// # Examples
/// ```
/// use gather_core::{ClusterStore, MemoryClusterStore, Scope};
///
/// let store = MemoryClusterStore::default();
/// store.replace_scope(Scope::Places, Vec::new())?;
/// assert!(store.clusters_for(Scope::Places)?.is_empty());
/// # Ok::<(), gather_core::StoreError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryClusterStore {
    scopes: RwLock<HashMap<Scope, Vec<Cluster>>>,
}

impl ClusterStore for MemoryClusterStore {
    fn replace_scope(&self, scope: Scope, clusters: Vec<Cluster>) -> Result<(), StoreError> {
        let mut scopes = self
            .scopes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        scopes.insert(scope, clusters);
        Ok(())
    }

    fn clusters_for(&self, scope: Scope) -> Result<Vec<Cluster>, StoreError> {
        let scopes = self.scopes.read().unwrap_or_else(PoisonError::into_inner);
        Ok(scopes.get(&scope).cloned().unwrap_or_default())
    }
}

/// In-memory [`SnapshotStore`] guarded by a read-write lock.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<Vec<RecoSnapshot>>,
}

impl SnapshotStore for MemorySnapshotStore {
    fn append(&self, snapshot: RecoSnapshot) -> Result<(), StoreError> {
        let mut snapshots = self
            .snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        snapshots.push(snapshot);
        Ok(())
    }

    fn latest_for(&self, user_id: Uuid) -> Result<Option<RecoSnapshot>, StoreError> {
        let snapshots = self
            .snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(snapshots
            .iter()
            .enumerate()
            .filter(|(_, snapshot)| snapshot.user_id == user_id)
            .max_by_key(|(index, snapshot)| (snapshot.generated_at, *index))
            .map(|(_, snapshot)| snapshot.clone()))
    }
}
