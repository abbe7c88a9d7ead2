//! Error types for the service layer and the daemon

use roster_sweeper::SurfaceError;
use roster_types::{ParticipantId, RenderHandle, RoleName, RosterError};
use thiserror::Error;

/// Errors returned by [`RosterService`](crate::RosterService) and the draft book
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("Render surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("No pending draft for {0}")]
    DraftNotFound(ParticipantId),

    #[error("Draft for {0} expired before it was finished")]
    DraftExpired(ParticipantId),

    #[error("No roles chosen for the draft of {0}")]
    RolesNotChosen(ParticipantId),

    #[error("Expected {expected} capacities, got {actual}")]
    CapacityMismatch { expected: usize, actual: usize },

    #[error("Role is not in the catalog: {0}")]
    NotInCatalog(RoleName),

    #[error("Not permitted to create groups: {0}")]
    CreateDenied(ParticipantId),

    #[error("No group is bound to {0}")]
    UnknownSurface(RenderHandle),
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Daemon errors
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;
    use roster_types::GroupId;

    #[test]
    fn test_roster_errors_pass_through() {
        let err: ServiceError = RosterError::NotFound(GroupId::new("ABCD1234")).into();
        assert_eq!(err.to_string(), "Group not found: ABCD1234");
        assert!(matches!(err, ServiceError::Roster(RosterError::NotFound(_))));
    }

    #[test]
    fn test_capacity_mismatch_message() {
        let err = ServiceError::CapacityMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Expected 3 capacities, got 2");
    }
}
