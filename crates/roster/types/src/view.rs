//! Owned snapshots of group state for callers to render

use crate::{GroupId, ParticipantId, RenderHandle, RoleName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleView {
    pub name: RoleName,
    pub capacity: u32,
    pub occupants: Vec<ParticipantId>,
}

impl RoleView {
    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity as usize
    }

    pub fn open_slots(&self) -> u32 {
        self.capacity.saturating_sub(self.occupants.len() as u32)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistView {
    /// 1-based
    pub position: usize,
    pub participant: ParticipantId,
    pub desired_role: RoleName,
}

/// Snapshot of a group taken under its lock
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupView {
    pub id: GroupId,
    pub title: String,
    pub owner: ParticipantId,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub render_target: RenderHandle,
    /// Roles in declaration order
    pub roles: Vec<RoleView>,
    /// Waitlist in arrival order
    pub waitlist: Vec<WaitlistView>,
}

impl GroupView {
    pub fn role(&self, name: &RoleName) -> Option<&RoleView> {
        self.roles.iter().find(|r| &r.name == name)
    }

    pub fn member_count(&self) -> usize {
        self.roles.iter().map(|r| r.occupants.len()).sum()
    }

    pub fn is_waiting(&self, participant: &ParticipantId) -> bool {
        self.waitlist.iter().any(|w| &w.participant == participant)
    }

    pub fn role_of(&self, participant: &ParticipantId) -> Option<&RoleName> {
        self.roles
            .iter()
            .find(|r| r.occupants.contains(participant))
            .map(|r| &r.name)
    }
}
