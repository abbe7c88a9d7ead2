//! Structured results of registry operations
//!
//! Every mutating operation reports what moved where and carries the group's
//! post-mutation view, so callers can re-render without another lookup.

use crate::{GroupId, GroupView, ParticipantId, RenderHandle, RoleName};
use serde::{Deserialize, Serialize};

/// A waitlist entry moved into a freed slot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub participant: ParticipantId,
    pub role: RoleName,
}

/// Where a joining participant ended up
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Admitted,
    /// Queued; `position` is 1-based
    Waitlisted { position: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOutcome {
    pub participant: ParticipantId,
    pub role: RoleName,
    pub placement: Placement,
    pub view: GroupView,
}

impl JoinOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self.placement, Placement::Admitted)
    }
}

/// What a departing participant gave up
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vacated {
    /// An occupied slot in this role
    Role(RoleName),
    /// A waitlist entry for this role
    Waitlist(RoleName),
}

/// Result of a leave or an organizer removal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartureOutcome {
    pub participant: ParticipantId,
    pub vacated: Vacated,
    /// Set when someone other than the participant performed the removal
    pub removed_by: Option<ParticipantId>,
    /// Promotions triggered by this departure, in admission order
    pub promotions: Vec<Promotion>,
    pub view: GroupView,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOutcome {
    pub title_changed: bool,
    pub notes_changed: bool,
    pub view: GroupView,
}

/// A group that has left the registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetiredGroup {
    pub id: GroupId,
    pub title: String,
    pub render_target: RenderHandle,
}
