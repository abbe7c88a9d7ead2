//! Requester privileges
//!
//! Who counts as elevated is a platform concern. The service asks a
//! [`PrivilegeCheck`] and passes the answer to the registry as a flag.

use roster_types::{GroupId, ParticipantId};
use std::collections::HashSet;

pub trait PrivilegeCheck: Send + Sync {
    /// May this requester organize new groups?
    fn may_create(&self, requester: &ParticipantId) -> bool;

    /// May this requester manage a group they do not own?
    fn may_manage(&self, requester: &ParticipantId, group: &GroupId) -> bool;
}

/// Fixed set of elevated participants.
///
/// With `open_creation` set, anyone may create groups.
#[derive(Debug, Clone, Default)]
pub struct StaticPrivileges {
    elevated: HashSet<ParticipantId>,
    open_creation: bool,
}

impl StaticPrivileges {
    pub fn new<I>(elevated: I) -> Self
    where
        I: IntoIterator<Item = ParticipantId>,
    {
        Self {
            elevated: elevated.into_iter().collect(),
            open_creation: false,
        }
    }

    pub fn with_open_creation(mut self, open: bool) -> Self {
        self.open_creation = open;
        self
    }

    pub fn is_elevated(&self, requester: &ParticipantId) -> bool {
        self.elevated.contains(requester)
    }
}

impl PrivilegeCheck for StaticPrivileges {
    fn may_create(&self, requester: &ParticipantId) -> bool {
        self.open_creation || self.is_elevated(requester)
    }

    fn may_manage(&self, requester: &ParticipantId, _group: &GroupId) -> bool {
        self.is_elevated(requester)
    }
}
