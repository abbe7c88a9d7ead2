//! Error types for roster operations

use crate::{GroupId, ParticipantId, RenderHandle, RoleName};

/// Errors returned by group, slot, and registry operations.
///
/// A full role is not an error; it routes the participant to the waitlist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("Group not found: {0}")]
    NotFound(GroupId),

    #[error("Role not offered by this group: {0}")]
    UnknownRole(RoleName),

    #[error("Participant already in group: {0}")]
    AlreadyMember(ParticipantId),

    #[error("Participant not in group: {0}")]
    NotAMember(ParticipantId),

    #[error("Participant already on waitlist: {0}")]
    DuplicateEntry(ParticipantId),

    #[error("Not permitted: {0}")]
    Forbidden(ParticipantId),

    #[error("Invalid role specification: {0}")]
    InvalidRoleSpec(String),

    #[error("Invalid capacity for role {role}: {reason}")]
    InvalidCapacity { role: RoleName, reason: String },

    #[error("Invalid group draft: {0}")]
    InvalidDraft(String),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("Render surface already bound to a group: {0}")]
    SurfaceInUse(RenderHandle),

    #[error("Could not allocate an unused group id")]
    IdSpaceExhausted,
}

/// Result type alias for roster operations
pub type RosterResult<T> = Result<T, RosterError>;
