//! A render surface that only logs

use async_trait::async_trait;
use roster_sweeper::{RenderSurface, SurfaceError};
use roster_types::{GroupView, RenderHandle};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Hands out `log-N` handles and logs every render.
#[derive(Debug, Default)]
pub struct LogSurface {
    next: AtomicU64,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RenderSurface for LogSurface {
    async fn open(&self, name: &str) -> Result<RenderHandle, SurfaceError> {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = RenderHandle::new(format!("log-{}", n));
        info!(surface = %handle, name, "Surface opened");
        Ok(handle)
    }

    async fn refresh(&self, handle: &RenderHandle, view: &GroupView) -> Result<(), SurfaceError> {
        let roles: Vec<String> = view
            .roles
            .iter()
            .map(|r| format!("{} {}/{}", r.name, r.occupants.len(), r.capacity))
            .collect();
        info!(
            surface = %handle,
            group_id = %view.id,
            title = %view.title,
            roles = ?roles,
            waitlist = view.waitlist.len(),
            "Surface refreshed"
        );
        Ok(())
    }

    async fn delete(&self, handle: &RenderHandle) -> Result<(), SurfaceError> {
        info!(surface = %handle, "Surface deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handles_are_distinct() {
        let surface = LogSurface::new();
        let a = surface.open("first").await.unwrap();
        let b = surface.open("second").await.unwrap();
        assert_eq!(a, RenderHandle::new("log-1"));
        assert_eq!(b, RenderHandle::new("log-2"));
        assert!(surface.delete(&a).await.is_ok());
    }
}
