//! Service facade
//!
//! Wraps the registry with the pieces a chat front end needs: the draft flow,
//! privilege lookups, and render-surface upkeep. Surface calls happen after
//! the registry call has returned, so no group lock is held across I/O.
//! A committed engine outcome is never turned into an error by a failing
//! surface; those failures are logged and dropped.

use roster_registry::GroupRegistry;
use roster_sweeper::{RenderSurface, SweepEvent};
use roster_types::{
    Clock, DepartureOutcome, EditOutcome, GroupEdit, GroupId, GroupView, JoinOutcome,
    ParticipantId, RenderHandle, RetiredGroup, RoleCatalog, RoleName, RoleView, RosterError,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::drafts::DraftBook;
use crate::error::{ServiceError, ServiceResult};
use crate::privilege::PrivilegeCheck;

pub struct RosterService {
    registry: Arc<GroupRegistry>,
    drafts: DraftBook,
    surface: Arc<dyn RenderSurface>,
    privileges: Arc<dyn PrivilegeCheck>,
}

impl RosterService {
    pub fn new(
        registry: Arc<GroupRegistry>,
        surface: Arc<dyn RenderSurface>,
        privileges: Arc<dyn PrivilegeCheck>,
        catalog: RoleCatalog,
        draft_ttl: chrono::Duration,
    ) -> Self {
        let drafts = DraftBook::new(catalog, draft_ttl, registry.clock());
        Self {
            registry,
            drafts,
            surface,
            privileges,
        }
    }

    pub fn registry(&self) -> &Arc<GroupRegistry> {
        &self.registry
    }

    pub fn drafts(&self) -> &DraftBook {
        &self.drafts
    }

    /// Start creating a group. Returns the catalog to pick roles from.
    pub fn begin_group(
        &self,
        owner: &ParticipantId,
        title: &str,
        notes: Option<String>,
        surface_name: &str,
    ) -> ServiceResult<Vec<RoleName>> {
        if !self.privileges.may_create(owner) {
            return Err(ServiceError::CreateDenied(owner.clone()));
        }
        self.drafts.begin(owner, title, notes, surface_name)?;
        Ok(self.drafts.catalog().iter().cloned().collect())
    }

    pub fn choose_roles(
        &self,
        owner: &ParticipantId,
        roles: Vec<RoleName>,
    ) -> ServiceResult<Vec<RoleName>> {
        self.drafts.choose_roles(owner, roles)
    }

    /// Set capacities, open a surface, and commit the group.
    ///
    /// The draft is consumed only once the group exists; any earlier failure
    /// leaves it pending for another attempt. If the registry rejects the
    /// group the freshly opened surface is deleted.
    pub async fn finish_group(
        &self,
        owner: &ParticipantId,
        capacities: &[u32],
    ) -> ServiceResult<GroupView> {
        let finalized = self.drafts.finalize(owner, capacities)?;
        let started_at = finalized.started_at;
        let handle = self.surface.open(&finalized.surface_name).await?;

        let view = match self.registry.create(finalized.into_group_draft(handle.clone())) {
            Ok(view) => view,
            Err(err) => {
                self.delete_surface(&handle).await;
                return Err(err.into());
            }
        };
        self.drafts.complete(owner, started_at);

        self.refresh(&view).await;
        Ok(view)
    }

    pub async fn join(
        &self,
        group_id: &GroupId,
        participant: &ParticipantId,
        role: &RoleName,
    ) -> ServiceResult<JoinOutcome> {
        let outcome = self.registry.join(group_id, participant, role)?;
        self.refresh(&outcome.view).await;
        Ok(outcome)
    }

    /// Join the group rendered on `handle`.
    pub async fn join_at_surface(
        &self,
        handle: &RenderHandle,
        participant: &ParticipantId,
        role: &RoleName,
    ) -> ServiceResult<JoinOutcome> {
        let group_id = self.resolve(handle)?;
        self.join(&group_id, participant, role).await
    }

    pub async fn leave(
        &self,
        group_id: &GroupId,
        participant: &ParticipantId,
    ) -> ServiceResult<DepartureOutcome> {
        let outcome = self.registry.leave(group_id, participant)?;
        self.announce_promotions(&outcome);
        self.refresh(&outcome.view).await;
        Ok(outcome)
    }

    pub async fn leave_at_surface(
        &self,
        handle: &RenderHandle,
        participant: &ParticipantId,
    ) -> ServiceResult<DepartureOutcome> {
        let group_id = self.resolve(handle)?;
        self.leave(&group_id, participant).await
    }

    pub async fn remove_member(
        &self,
        group_id: &GroupId,
        participant: &ParticipantId,
        requester: &ParticipantId,
    ) -> ServiceResult<DepartureOutcome> {
        let elevated = self.privileges.may_manage(requester, group_id);
        let outcome = self
            .registry
            .remove_member(group_id, participant, requester, elevated)?;
        self.announce_promotions(&outcome);
        self.refresh(&outcome.view).await;
        Ok(outcome)
    }

    pub async fn edit(
        &self,
        group_id: &GroupId,
        edit: GroupEdit,
        requester: &ParticipantId,
    ) -> ServiceResult<EditOutcome> {
        let elevated = self.privileges.may_manage(requester, group_id);
        let outcome = self.registry.edit(group_id, edit, requester, elevated)?;
        if outcome.title_changed || outcome.notes_changed {
            self.refresh(&outcome.view).await;
        }
        Ok(outcome)
    }

    /// Retire a group ahead of its retention window and delete its surface.
    pub async fn close(
        &self,
        group_id: &GroupId,
        requester: &ParticipantId,
    ) -> ServiceResult<RetiredGroup> {
        let elevated = self.privileges.may_manage(requester, group_id);
        let retired = self.registry.retire_by(group_id, requester, elevated)?;
        info!(group_id = %retired.id, requester = %requester, "Group closed");
        self.delete_surface(&retired.render_target).await;
        Ok(retired)
    }

    /// Roles with their occupancy, for a participant picking one
    pub fn role_choices(&self, group_id: &GroupId) -> ServiceResult<Vec<RoleView>> {
        self.registry
            .get(group_id)
            .map(|view| view.roles)
            .ok_or_else(|| RosterError::NotFound(group_id.clone()).into())
    }

    pub fn group(&self, group_id: &GroupId) -> Option<GroupView> {
        self.registry.get(group_id)
    }

    /// Drop drafts older than their TTL.
    pub fn purge_drafts(&self) -> usize {
        self.drafts.purge_expired(self.registry.clock().now())
    }

    fn resolve(&self, handle: &RenderHandle) -> ServiceResult<GroupId> {
        self.registry
            .group_for_surface(handle)
            .ok_or_else(|| ServiceError::UnknownSurface(handle.clone()))
    }

    fn announce_promotions(&self, outcome: &DepartureOutcome) {
        for promotion in &outcome.promotions {
            debug!(
                group_id = %outcome.view.id,
                participant = %promotion.participant,
                role = %promotion.role,
                "Notify promoted participant"
            );
        }
    }

    async fn refresh(&self, view: &GroupView) {
        if let Err(e) = self.surface.refresh(&view.render_target, view).await {
            warn!(
                group_id = %view.id,
                surface = %view.render_target,
                error = %e,
                "Failed to refresh render surface"
            );
        }
    }

    async fn delete_surface(&self, handle: &RenderHandle) {
        if let Err(e) = self.surface.delete(handle).await {
            warn!(surface = %handle, error = %e, "Failed to delete render surface");
        }
    }
}

/// Log a sweeper event at a level matching its outcome.
pub fn log_sweep_event(event: &SweepEvent) {
    match event {
        SweepEvent::GroupRetired {
            group,
            surface_error: Some(err),
        } => {
            warn!(
                group_id = %group.id,
                surface = %group.render_target,
                error = %err,
                "Expired group retired but its surface could not be deleted"
            );
        }
        SweepEvent::GroupRetired { group, .. } => {
            info!(group_id = %group.id, title = %group.title, "Expired group retired");
        }
        SweepEvent::SweepCompleted { expired, retired } => {
            debug!(expired, retired, "Sweep finished");
        }
    }
}
