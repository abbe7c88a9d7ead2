//! Render-surface collaborator
//!
//! A render surface is wherever the caller shows a group: a chat thread, a
//! pinned message, a web panel. The engine only stores its handle. Callers
//! implement this trait to open, refresh, and delete surfaces.

use async_trait::async_trait;
use roster_types::{GroupView, RenderHandle};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("Render surface not found: {0}")]
    NotFound(RenderHandle),

    #[error("Render surface unavailable: {0}")]
    Unavailable(String),

    #[error("Render surface rejected the request: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait RenderSurface: Send + Sync {
    /// Create a surface for a new group
    async fn open(&self, name: &str) -> Result<RenderHandle, SurfaceError>;

    /// Re-render a group after a change
    async fn refresh(&self, handle: &RenderHandle, view: &GroupView) -> Result<(), SurfaceError>;

    /// Tear down a surface once its group is retired
    async fn delete(&self, handle: &RenderHandle) -> Result<(), SurfaceError>;
}
