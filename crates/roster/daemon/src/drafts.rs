//! Pending creation drafts
//!
//! Creating a group is a multi-step exchange: the organizer names the group,
//! picks roles from the catalog, then sets a capacity per role. Until the
//! last step the draft lives here, keyed by organizer, and the registry never
//! sees it. Each organizer has at most one pending draft.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use roster_types::{
    Clock, GroupDraft, ParticipantId, RenderHandle, RoleCatalog, RoleName, RosterError,
};
use std::sync::Arc;
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

/// A draft between `begin` and `finalize`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDraft {
    pub title: String,
    pub notes: Option<String>,
    /// Name for the render surface opened on finalize
    pub surface_name: String,
    pub roles: Vec<RoleName>,
    pub started_at: DateTime<Utc>,
}

/// A draft with capacities attached, ready for a render target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedDraft {
    pub owner: ParticipantId,
    pub title: String,
    pub notes: Option<String>,
    pub surface_name: String,
    pub roles: Vec<(RoleName, u32)>,
    /// Identifies the pending draft this was built from
    pub started_at: DateTime<Utc>,
}

impl FinalizedDraft {
    /// Bind to a render target and hand to the registry.
    pub fn into_group_draft(self, render_target: RenderHandle) -> GroupDraft {
        let mut draft = GroupDraft::new(self.title, self.owner).with_render_target(render_target);
        if let Some(notes) = self.notes {
            draft = draft.with_notes(notes);
        }
        for (role, capacity) in self.roles {
            draft = draft.with_role(role, capacity);
        }
        draft
    }
}

pub struct DraftBook {
    drafts: DashMap<ParticipantId, PendingDraft>,
    catalog: RoleCatalog,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl DraftBook {
    pub fn new(catalog: RoleCatalog, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            drafts: DashMap::new(),
            catalog,
            ttl,
            clock,
        }
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    /// Start a draft, replacing any older one from the same organizer.
    pub fn begin(
        &self,
        owner: &ParticipantId,
        title: impl Into<String>,
        notes: Option<String>,
        surface_name: impl Into<String>,
    ) -> ServiceResult<()> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(RosterError::InvalidDraft("title must not be empty".into()).into());
        }
        let surface_name = surface_name.into();
        let surface_name = if surface_name.trim().is_empty() {
            title.clone()
        } else {
            surface_name
        };

        let draft = PendingDraft {
            title,
            notes: notes.filter(|n| !n.is_empty()),
            surface_name,
            roles: Vec::new(),
            started_at: self.clock.now(),
        };

        if self.drafts.insert(owner.clone(), draft).is_some() {
            debug!(owner = %owner, "Replaced pending draft");
        }
        Ok(())
    }

    /// Pick the draft's roles. Each must be in the catalog; repeats collapse
    /// keeping first-seen order.
    pub fn choose_roles(
        &self,
        owner: &ParticipantId,
        roles: Vec<RoleName>,
    ) -> ServiceResult<Vec<RoleName>> {
        let mut chosen: Vec<RoleName> = Vec::with_capacity(roles.len());
        for role in roles {
            if !self.catalog.contains(&role) {
                return Err(ServiceError::NotInCatalog(role));
            }
            if !chosen.contains(&role) {
                chosen.push(role);
            }
        }
        if chosen.is_empty() {
            return Err(ServiceError::RolesNotChosen(owner.clone()));
        }

        let now = self.clock.now();
        match self.drafts.entry(owner.clone()) {
            Entry::Vacant(_) => Err(ServiceError::DraftNotFound(owner.clone())),
            Entry::Occupied(entry) if self.is_stale(entry.get(), now) => {
                entry.remove();
                Err(ServiceError::DraftExpired(owner.clone()))
            }
            Entry::Occupied(mut entry) => {
                entry.get_mut().roles = chosen.clone();
                Ok(chosen)
            }
        }
    }

    /// Attach capacities, one per chosen role in order.
    ///
    /// The pending draft stays in place until [`complete`](Self::complete) is
    /// called, so a failed check or a later failure to commit can be retried.
    pub fn finalize(
        &self,
        owner: &ParticipantId,
        capacities: &[u32],
    ) -> ServiceResult<FinalizedDraft> {
        let now = self.clock.now();
        let entry = match self.drafts.entry(owner.clone()) {
            Entry::Vacant(_) => return Err(ServiceError::DraftNotFound(owner.clone())),
            Entry::Occupied(entry) => entry,
        };

        if self.is_stale(entry.get(), now) {
            entry.remove();
            return Err(ServiceError::DraftExpired(owner.clone()));
        }

        let draft = entry.get();
        if draft.roles.is_empty() {
            return Err(ServiceError::RolesNotChosen(owner.clone()));
        }
        if draft.roles.len() != capacities.len() {
            return Err(ServiceError::CapacityMismatch {
                expected: draft.roles.len(),
                actual: capacities.len(),
            });
        }
        if let Some((role, _)) = draft
            .roles
            .iter()
            .zip(capacities)
            .find(|(_, capacity)| **capacity == 0)
        {
            return Err(RosterError::InvalidRoleSpec(format!(
                "role {} needs a capacity of at least 1",
                role
            ))
            .into());
        }

        Ok(FinalizedDraft {
            owner: owner.clone(),
            title: draft.title.clone(),
            notes: draft.notes.clone(),
            surface_name: draft.surface_name.clone(),
            roles: draft.roles.iter().cloned().zip(capacities.iter().copied()).collect(),
            started_at: draft.started_at,
        })
    }

    /// Consume the draft a finalized one was built from once its group exists.
    ///
    /// A draft begun again in the meantime is left alone.
    pub fn complete(&self, owner: &ParticipantId, started_at: DateTime<Utc>) -> bool {
        self.drafts
            .remove_if(owner, |_, draft| draft.started_at == started_at)
            .is_some()
    }

    /// Drop a pending draft. Returns whether one existed.
    pub fn cancel(&self, owner: &ParticipantId) -> bool {
        self.drafts.remove(owner).is_some()
    }

    pub fn pending(&self, owner: &ParticipantId) -> Option<PendingDraft> {
        self.drafts.get(owner).map(|d| d.value().clone())
    }

    /// Discard drafts older than the TTL. Returns how many were dropped.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.drafts.len();
        self.drafts.retain(|_, draft| now - draft.started_at <= self.ttl);
        let purged = before.saturating_sub(self.drafts.len());
        if purged > 0 {
            debug!(purged, "Purged expired drafts");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    fn is_stale(&self, draft: &PendingDraft, now: DateTime<Utc>) -> bool {
        now - draft.started_at > self.ttl
    }
}
