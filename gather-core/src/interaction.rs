use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::GeoPoint;

/// The kind of interaction a user had with a plan.
///
/// The persistence layer derives these records from its check-in and
/// attendance tables; attendances arrive pre-filtered to status "joined".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionKind {
    /// The user checked in at the plan, possibly with a device position.
    CheckIn,
    /// The user joined the plan's attendance list.
    Attendance,
}

/// One user/plan interaction, a derived view over check-ins and joined
/// attendances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// User who interacted.
    pub user_id: Uuid,
    /// Plan interacted with.
    pub plan_id: Uuid,
    /// Check-in or attendance.
    pub kind: InteractionKind,
    /// Tags of the plan at interaction time.
    pub tags: BTreeSet<String>,
    /// When the interaction happened.
    pub occurred_at: DateTime<Utc>,
    /// Device position at check-in time, when the client shared one.
    pub location: Option<GeoPoint>,
}

impl InteractionRecord {
    /// Construct an interaction record.
    #[must_use]
    pub const fn new(
        user_id: Uuid,
        plan_id: Uuid,
        kind: InteractionKind,
        tags: BTreeSet<String>,
        occurred_at: DateTime<Utc>,
        location: Option<GeoPoint>,
    ) -> Self {
        Self {
            user_id,
            plan_id,
            kind,
            tags,
            occurred_at,
            location,
        }
    }
}
