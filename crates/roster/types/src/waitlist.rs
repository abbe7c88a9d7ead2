//! Waitlist: FIFO queue of participants waiting for a role
//!
//! Insertion order is arrival order. Promotion walks the queue once, oldest
//! first, and admits every entry whose role has room at that moment. An entry
//! whose role is still full does not block later entries for other roles.

use crate::{ParticipantId, Promotion, RoleName, RoleSlotSet, RosterError, RosterResult};
use serde::{Deserialize, Serialize};

/// A participant waiting for a slot in `desired_role`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub participant: ParticipantId,
    pub desired_role: RoleName,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waitlist {
    entries: Vec<WaitlistEntry>,
}

impl Waitlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a participant. Returns their 1-based position.
    pub fn enqueue(
        &mut self,
        participant: ParticipantId,
        desired_role: RoleName,
    ) -> RosterResult<usize> {
        if self.contains(&participant) {
            return Err(RosterError::DuplicateEntry(participant));
        }

        self.entries.push(WaitlistEntry {
            participant,
            desired_role,
        });
        Ok(self.entries.len())
    }

    /// Promote every entry whose desired role has room, in arrival order.
    ///
    /// Each entry is evaluated exactly once per call. Entries that stay queued
    /// keep their relative order.
    pub fn dequeue_all_eligible(&mut self, roles: &mut RoleSlotSet) -> Vec<Promotion> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        let mut promoted = Vec::new();
        let mut still_waiting = Vec::with_capacity(self.entries.len());

        for entry in self.entries.drain(..) {
            match roles.try_admit(&entry.desired_role, &entry.participant) {
                Ok(true) => promoted.push(Promotion {
                    participant: entry.participant,
                    role: entry.desired_role,
                }),
                Ok(false) => still_waiting.push(entry),
                Err(err) => {
                    debug_assert!(
                        !matches!(err, RosterError::UnknownRole(_)),
                        "waitlist entry for a role the group does not offer: {}",
                        err
                    );
                    still_waiting.push(entry);
                }
            }
        }

        self.entries = still_waiting;
        promoted
    }

    /// Remove a participant's entry. Returns whether one was found.
    pub fn remove_participant(&mut self, participant: &ParticipantId) -> bool {
        self.take_participant(participant).is_some()
    }

    /// Remove and return a participant's entry.
    pub fn take_participant(&mut self, participant: &ParticipantId) -> Option<WaitlistEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| &e.participant == participant)?;
        Some(self.entries.remove(idx))
    }

    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.entries.iter().any(|e| &e.participant == participant)
    }

    /// 1-based position of a participant in the queue
    pub fn position_of(&self, participant: &ParticipantId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| &e.participant == participant)
            .map(|idx| idx + 1)
    }

    /// Entries in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &WaitlistEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
