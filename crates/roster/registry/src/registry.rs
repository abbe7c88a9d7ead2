//! In-memory group registry
//!
//! Groups live in a `DashMap` of `Arc<Mutex<Group>>`. An operation clones the
//! group's handle out of the map, drops the map guard, and only then takes the
//! group lock, so map shards are never held while waiting on a group.
//!
//! Retirement marks the group retired under its lock before unlinking it. An
//! operation that fetched the handle just before retirement sees the flag and
//! reports `NotFound`.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use roster_types::{
    Clock, DepartureOutcome, EditOutcome, Group, GroupDraft, GroupEdit, GroupId, GroupView,
    IdGenerator, JoinOutcome, ParticipantId, RandomIdGenerator, RenderHandle, RetiredGroup,
    RoleName, RosterError, RosterResult, SystemClock,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Attempts at drawing an unused group id before giving up
pub const MAX_ID_ATTEMPTS: usize = 16;

/// A group found past its retention window
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpiredGroup {
    pub id: GroupId,
    pub render_target: RenderHandle,
    pub created_at: DateTime<Utc>,
}

/// The catalog of committed groups
pub struct GroupRegistry {
    groups: DashMap<GroupId, Arc<Mutex<Group>>>,
    /// Secondary index: render surface → group
    surfaces: DashMap<RenderHandle, GroupId>,
    ids: Box<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl GroupRegistry {
    /// Registry with random ids and wall-clock time
    pub fn new() -> Self {
        Self::with_sources(Box::new(RandomIdGenerator::new()), Arc::new(SystemClock))
    }

    pub fn with_sources(ids: Box<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            groups: DashMap::new(),
            surfaces: DashMap::new(),
            ids,
            clock,
        }
    }

    /// The clock that stamps `created_at`
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Commit a draft as a new group.
    ///
    /// The render target is bound in the surface index in the same step; a
    /// target already bound to a live group is rejected.
    pub fn create(&self, draft: GroupDraft) -> RosterResult<GroupView> {
        draft.validate()?;

        let render_target = draft
            .render_target()
            .cloned()
            .ok_or_else(|| RosterError::InvalidDraft("render target is required".into()))?;

        let surface_slot = match self.surfaces.entry(render_target.clone()) {
            Entry::Occupied(_) => return Err(RosterError::SurfaceInUse(render_target)),
            Entry::Vacant(slot) => slot,
        };

        let created_at = self.clock.now();

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            let group_slot = match self.groups.entry(id.clone()) {
                Entry::Occupied(_) => {
                    debug!(group_id = %id, "Generated group id already in use, retrying");
                    continue;
                }
                Entry::Vacant(slot) => slot,
            };

            let group = Group::from_draft(id.clone(), draft, created_at)?;
            let view = group.view();
            group_slot.insert(Arc::new(Mutex::new(group)));
            surface_slot.insert(id.clone());

            info!(
                group_id = %id,
                owner = %view.owner,
                roles = view.roles.len(),
                surface = %render_target,
                "Group created"
            );
            return Ok(view);
        }

        Err(RosterError::IdSpaceExhausted)
    }

    /// Join `role`, or queue for it when it is full.
    pub fn join(
        &self,
        group_id: &GroupId,
        participant: &ParticipantId,
        role: &RoleName,
    ) -> RosterResult<JoinOutcome> {
        self.with_group(group_id, |group| {
            let placement = group.join(participant, role)?;

            debug!(
                group_id = %group_id,
                participant = %participant,
                role = %role,
                placement = ?placement,
                "Participant joined"
            );

            Ok(JoinOutcome {
                participant: participant.clone(),
                role: role.clone(),
                placement,
                view: group.view(),
            })
        })
    }

    /// Leave the group, from a slot or from the waitlist.
    pub fn leave(
        &self,
        group_id: &GroupId,
        participant: &ParticipantId,
    ) -> RosterResult<DepartureOutcome> {
        self.with_group(group_id, |group| depart(group, participant, None))
    }

    /// Remove another participant. Allowed for the owner or an elevated requester.
    pub fn remove_member(
        &self,
        group_id: &GroupId,
        participant: &ParticipantId,
        requester: &ParticipantId,
        elevated: bool,
    ) -> RosterResult<DepartureOutcome> {
        self.with_group(group_id, |group| {
            if !group.is_managed_by(requester, elevated) {
                return Err(RosterError::Forbidden(requester.clone()));
            }
            depart(group, participant, Some(requester))
        })
    }

    /// Change title and/or notes. Allowed for the owner or an elevated requester.
    pub fn edit(
        &self,
        group_id: &GroupId,
        edit: GroupEdit,
        requester: &ParticipantId,
        elevated: bool,
    ) -> RosterResult<EditOutcome> {
        self.with_group(group_id, |group| {
            if !group.is_managed_by(requester, elevated) {
                return Err(RosterError::Forbidden(requester.clone()));
            }

            let (title_changed, notes_changed) = group.apply_edit(edit)?;

            debug!(
                group_id = %group_id,
                title_changed = title_changed,
                notes_changed = notes_changed,
                "Group edited"
            );

            Ok(EditOutcome {
                title_changed,
                notes_changed,
                view: group.view(),
            })
        })
    }

    /// Delete a group from the registry.
    pub fn retire(&self, group_id: &GroupId) -> RosterResult<RetiredGroup> {
        let handle = self.handle(group_id)?;
        let mut group = handle.lock();
        if group.is_retired() {
            return Err(RosterError::NotFound(group_id.clone()));
        }
        Ok(self.unlink(&mut *group))
    }

    /// Delete a group on behalf of a requester who must own it or be elevated.
    pub fn retire_by(
        &self,
        group_id: &GroupId,
        requester: &ParticipantId,
        elevated: bool,
    ) -> RosterResult<RetiredGroup> {
        let handle = self.handle(group_id)?;
        let mut group = handle.lock();
        if group.is_retired() {
            return Err(RosterError::NotFound(group_id.clone()));
        }
        if !group.is_managed_by(requester, elevated) {
            return Err(RosterError::Forbidden(requester.clone()));
        }
        Ok(self.unlink(&mut *group))
    }

    /// Retire a group only if it is still past the retention window when its
    /// lock is held. Returns `Ok(None)` when it is not.
    pub fn retire_expired(
        &self,
        group_id: &GroupId,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> RosterResult<Option<RetiredGroup>> {
        let handle = self.handle(group_id)?;
        let mut group = handle.lock();
        if group.is_retired() {
            return Err(RosterError::NotFound(group_id.clone()));
        }
        if !group.is_expired(now, retention) {
            return Ok(None);
        }
        Ok(Some(self.unlink(&mut *group)))
    }

    /// Groups strictly older than `retention` at `now`
    pub fn expired(&self, now: DateTime<Utc>, retention: Duration) -> Vec<ExpiredGroup> {
        self.handles()
            .into_iter()
            .filter_map(|handle| {
                let group = handle.lock();
                (!group.is_retired() && group.is_expired(now, retention)).then(|| ExpiredGroup {
                    id: group.id().clone(),
                    render_target: group.render_target().clone(),
                    created_at: group.created_at(),
                })
            })
            .collect()
    }

    pub fn get(&self, group_id: &GroupId) -> Option<GroupView> {
        let handle = self.handle(group_id).ok()?;
        let group = handle.lock();
        (!group.is_retired()).then(|| group.view())
    }

    /// The group rendered on a surface
    pub fn group_for_surface(&self, handle: &RenderHandle) -> Option<GroupId> {
        self.surfaces.get(handle).map(|id| id.value().clone())
    }

    pub fn view_for_surface(&self, handle: &RenderHandle) -> Option<GroupView> {
        let group_id = self.group_for_surface(handle)?;
        self.get(&group_id)
    }

    pub fn ids(&self) -> Vec<GroupId> {
        self.groups.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn handle(&self, group_id: &GroupId) -> RosterResult<Arc<Mutex<Group>>> {
        self.groups
            .get(group_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RosterError::NotFound(group_id.clone()))
    }

    fn handles(&self) -> Vec<Arc<Mutex<Group>>> {
        self.groups
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    fn with_group<T>(
        &self,
        group_id: &GroupId,
        op: impl FnOnce(&mut Group) -> RosterResult<T>,
    ) -> RosterResult<T> {
        let handle = self.handle(group_id)?;
        let mut group = handle.lock();
        if group.is_retired() {
            return Err(RosterError::NotFound(group_id.clone()));
        }
        op(&mut *group)
    }

    /// Mark retired and drop both index entries. Caller holds the group lock.
    fn unlink(&self, group: &mut Group) -> RetiredGroup {
        group.mark_retired();
        self.groups.remove(group.id());
        self.surfaces
            .remove_if(group.render_target(), |_, bound| bound == group.id());

        info!(
            group_id = %group.id(),
            surface = %group.render_target(),
            "Group retired"
        );

        RetiredGroup {
            id: group.id().clone(),
            title: group.title().to_string(),
            render_target: group.render_target().clone(),
        }
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn depart(
    group: &mut Group,
    participant: &ParticipantId,
    removed_by: Option<&ParticipantId>,
) -> RosterResult<DepartureOutcome> {
    let (vacated, promotions) = group.depart(participant)?;

    debug!(
        group_id = %group.id(),
        participant = %participant,
        vacated = ?vacated,
        removed_by = ?removed_by,
        "Participant departed"
    );
    for promotion in &promotions {
        info!(
            group_id = %group.id(),
            participant = %promotion.participant,
            role = %promotion.role,
            "Promoted from waitlist"
        );
    }

    Ok(DepartureOutcome {
        participant: participant.clone(),
        vacated,
        removed_by: removed_by.cloned(),
        promotions,
        view: group.view(),
    })
}
