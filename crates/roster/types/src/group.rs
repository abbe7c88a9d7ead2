//! Group aggregate and its construction draft
//!
//! A [`GroupDraft`] collects everything a group needs before it exists. Only a
//! validated draft becomes a [`Group`], and only the registry holds groups.

use crate::{
    GroupId, GroupView, ParticipantId, Placement, Promotion, RenderHandle, RoleName, RoleSlotSet,
    RoleView, RosterError, RosterResult, Vacated, Waitlist, WaitlistView,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// A group under construction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupDraft {
    title: String,
    owner: ParticipantId,
    notes: Option<String>,
    roles: Vec<(RoleName, u32)>,
    render_target: Option<RenderHandle>,
}

impl GroupDraft {
    pub fn new(title: impl Into<String>, owner: ParticipantId) -> Self {
        Self {
            title: title.into(),
            owner,
            notes: None,
            roles: Vec::new(),
            render_target: None,
        }
    }

    /// Empty notes are treated as no notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = normalize_notes(notes.into());
        self
    }

    pub fn with_role(mut self, name: impl Into<RoleName>, capacity: u32) -> Self {
        self.roles.push((name.into(), capacity));
        self
    }

    pub fn with_render_target(mut self, handle: RenderHandle) -> Self {
        self.render_target = Some(handle);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn owner(&self) -> &ParticipantId {
        &self.owner
    }

    pub fn roles(&self) -> &[(RoleName, u32)] {
        &self.roles
    }

    pub fn render_target(&self) -> Option<&RenderHandle> {
        self.render_target.as_ref()
    }

    /// Check the draft is complete: a title, a render target, and at least
    /// one role, every role distinct with capacity ≥ 1.
    pub fn validate(&self) -> RosterResult<()> {
        if self.title.trim().is_empty() {
            return Err(RosterError::InvalidDraft("title must not be empty".into()));
        }
        if self.render_target.is_none() {
            return Err(RosterError::InvalidDraft("render target is required".into()));
        }
        if self.roles.is_empty() {
            return Err(RosterError::InvalidRoleSpec(
                "at least one role is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for (name, capacity) in &self.roles {
            if *capacity < 1 {
                return Err(RosterError::InvalidRoleSpec(format!(
                    "role {} must have capacity of at least 1",
                    name
                )));
            }
            if !seen.insert(name) {
                return Err(RosterError::InvalidRoleSpec(format!(
                    "role {} declared more than once",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Changes to a group's mutable fields
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupEdit {
    pub title: Option<String>,
    /// `Some("")` clears the notes
    pub notes: Option<String>,
}

impl GroupEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A committed group.
///
/// A participant is in at most one place: one role's occupants or the waitlist.
#[derive(Clone, Debug)]
pub struct Group {
    id: GroupId,
    title: String,
    owner: ParticipantId,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    roles: RoleSlotSet,
    waitlist: Waitlist,
    render_target: RenderHandle,
    retired: bool,
}

impl Group {
    /// Build a group from a validated draft.
    pub fn from_draft(
        id: GroupId,
        draft: GroupDraft,
        created_at: DateTime<Utc>,
    ) -> RosterResult<Self> {
        draft.validate()?;

        let GroupDraft {
            title,
            owner,
            notes,
            roles: role_specs,
            render_target,
        } = draft;

        let render_target = render_target
            .ok_or_else(|| RosterError::InvalidDraft("render target is required".into()))?;

        let mut roles = RoleSlotSet::new();
        for (name, capacity) in role_specs {
            roles.declare_role(name, capacity)?;
        }

        Ok(Self {
            id,
            title,
            owner,
            notes,
            created_at,
            roles,
            waitlist: Waitlist::new(),
            render_target,
            retired: false,
        })
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn owner(&self) -> &ParticipantId {
        &self.owner
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn roles(&self) -> &RoleSlotSet {
        &self.roles
    }

    pub fn waitlist(&self) -> &Waitlist {
        &self.waitlist
    }

    pub fn render_target(&self) -> &RenderHandle {
        &self.render_target
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub fn mark_retired(&mut self) {
        self.retired = true;
    }

    /// Whether the participant holds a slot or a waitlist entry
    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.roles.contains(participant) || self.waitlist.contains(participant)
    }

    pub fn is_managed_by(&self, requester: &ParticipantId, elevated: bool) -> bool {
        elevated || &self.owner == requester
    }

    /// Strictly older than the retention window
    pub fn is_expired(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        now - self.created_at > retention
    }

    /// Admit into `role` if it has room, else queue on the waitlist.
    pub fn join(&mut self, participant: &ParticipantId, role: &RoleName) -> RosterResult<Placement> {
        if self.contains(participant) {
            return Err(RosterError::AlreadyMember(participant.clone()));
        }
        if !self.roles.has_role(role) {
            return Err(RosterError::UnknownRole(role.clone()));
        }

        if self.roles.try_admit(role, participant)? {
            return Ok(Placement::Admitted);
        }

        let position = self.waitlist.enqueue(participant.clone(), role.clone())?;
        Ok(Placement::Waitlisted { position })
    }

    /// Remove a participant from wherever they are, then promote.
    pub fn depart(
        &mut self,
        participant: &ParticipantId,
    ) -> RosterResult<(Vacated, Vec<Promotion>)> {
        let vacated = if let Some(role) = self.roles.remove(participant) {
            Vacated::Role(role)
        } else if let Some(entry) = self.waitlist.take_participant(participant) {
            Vacated::Waitlist(entry.desired_role)
        } else {
            return Err(RosterError::NotAMember(participant.clone()));
        };

        let promotions = self.promote();
        Ok((vacated, promotions))
    }

    /// Run the promotion pass against the current slots.
    pub fn promote(&mut self) -> Vec<Promotion> {
        self.waitlist.dequeue_all_eligible(&mut self.roles)
    }

    /// Apply an edit. Returns (title_changed, notes_changed).
    pub fn apply_edit(&mut self, edit: GroupEdit) -> RosterResult<(bool, bool)> {
        let mut title_changed = false;
        let mut notes_changed = false;

        if let Some(title) = edit.title {
            if title.trim().is_empty() {
                return Err(RosterError::InvalidEdit("title must not be empty".into()));
            }
            title_changed = title != self.title;
            self.title = title;
        }

        if let Some(notes) = edit.notes {
            let notes = normalize_notes(notes);
            notes_changed = notes != self.notes;
            self.notes = notes;
        }

        Ok((title_changed, notes_changed))
    }

    pub fn view(&self) -> GroupView {
        GroupView {
            id: self.id.clone(),
            title: self.title.clone(),
            owner: self.owner.clone(),
            notes: self.notes.clone(),
            created_at: self.created_at,
            render_target: self.render_target.clone(),
            roles: self
                .roles
                .iter()
                .map(|slot| RoleView {
                    name: slot.name().clone(),
                    capacity: slot.capacity(),
                    occupants: slot.occupants().to_vec(),
                })
                .collect(),
            waitlist: self
                .waitlist
                .iter()
                .enumerate()
                .map(|(idx, entry)| WaitlistView {
                    position: idx + 1,
                    participant: entry.participant.clone(),
                    desired_role: entry.desired_role.clone(),
                })
                .collect(),
        }
    }
}

fn normalize_notes(notes: String) -> Option<String> {
    if notes.trim().is_empty() {
        None
    } else {
        Some(notes)
    }
}
