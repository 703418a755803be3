use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{GeoPoint, Scope};

/// A geolocated entity owned by the persistence layer.
///
/// The engine only ever reads snapshots of these; identity is an opaque
/// unique id and the record carries just enough to cluster it.
///
/// # Examples
/// ```
/// use gather_core::{GeoPoint, LocatedEntity, Scope};
/// use uuid::Uuid;
///
/// let entity = LocatedEntity::new(
///     Uuid::new_v4(),
///     Scope::Places,
///     GeoPoint::new(-74.0060, 40.7128)?,
/// );
/// assert_eq!(entity.scope, Scope::Places);
/// # Ok::<(), gather_core::GeoError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocatedEntity {
    /// Opaque unique identifier.
    pub id: Uuid,
    /// Clustering domain the entity belongs to.
    pub scope: Scope,
    /// Geospatial position.
    pub location: GeoPoint,
}

impl LocatedEntity {
    /// Construct an entity record.
    #[must_use]
    pub const fn new(id: Uuid, scope: Scope, location: GeoPoint) -> Self {
        Self {
            id,
            scope,
            location,
        }
    }
}
