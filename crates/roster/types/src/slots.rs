//! Role slots: capacity-bounded occupant lists keyed by role name
//!
//! Roles keep their declaration order so that views list them the way the
//! organizer set them up. Occupant counts never exceed capacity: admission
//! checks room before it appends.

use crate::{ParticipantId, RoleName, RosterError, RosterResult};
use serde::{Deserialize, Serialize};

/// One role and the participants currently filling it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSlot {
    name: RoleName,
    capacity: u32,
    occupants: Vec<ParticipantId>,
}

impl RoleSlot {
    pub fn name(&self) -> &RoleName {
        &self.name
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Occupants in admission order
    pub fn occupants(&self) -> &[ParticipantId] {
        &self.occupants
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity as usize
    }

    pub fn open_slots(&self) -> u32 {
        self.capacity.saturating_sub(self.occupants.len() as u32)
    }
}

/// The role slots of a single group
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSlotSet {
    slots: Vec<RoleSlot>,
}

impl RoleSlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a role while the group is being built.
    ///
    /// Capacities are unsigned, so the only rejected declaration is a name that
    /// is already present.
    pub fn declare_role(&mut self, name: RoleName, capacity: u32) -> RosterResult<()> {
        if self.has_role(&name) {
            return Err(RosterError::InvalidCapacity {
                role: name,
                reason: "role already declared".into(),
            });
        }

        self.slots.push(RoleSlot {
            name,
            capacity,
            occupants: Vec::new(),
        });
        Ok(())
    }

    /// Admit a participant into `role` if it has room.
    ///
    /// Returns `Ok(false)` without mutating when the role is full or the
    /// participant already holds a slot in this set.
    pub fn try_admit(&mut self, role: &RoleName, participant: &ParticipantId) -> RosterResult<bool> {
        let already_placed = self.contains(participant);

        let slot = self
            .slots
            .iter_mut()
            .find(|s| &s.name == role)
            .ok_or_else(|| RosterError::UnknownRole(role.clone()))?;

        if already_placed || slot.is_full() {
            return Ok(false);
        }

        slot.occupants.push(participant.clone());
        Ok(true)
    }

    /// Remove a participant from whichever role holds them.
    pub fn remove(&mut self, participant: &ParticipantId) -> Option<RoleName> {
        for slot in &mut self.slots {
            if let Some(idx) = slot.occupants.iter().position(|p| p == participant) {
                slot.occupants.remove(idx);
                return Some(slot.name.clone());
            }
        }
        None
    }

    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.role_of(participant).is_some()
    }

    /// The role a participant currently occupies
    pub fn role_of(&self, participant: &ParticipantId) -> Option<&RoleName> {
        self.slots
            .iter()
            .find(|s| s.occupants.contains(participant))
            .map(|s| &s.name)
    }

    pub fn has_role(&self, role: &RoleName) -> bool {
        self.slot(role).is_some()
    }

    pub fn slot(&self, role: &RoleName) -> Option<&RoleSlot> {
        self.slots.iter().find(|s| &s.name == role)
    }

    /// Slots in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &RoleSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total occupants across all roles
    pub fn occupant_count(&self) -> usize {
        self.slots.iter().map(|s| s.occupants.len()).sum()
    }
}
