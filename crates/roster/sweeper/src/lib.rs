//! Roster Sweeper - retention enforcement
//!
//! The [`ExpirySweeper`] wakes on a fixed interval, asks the render-surface
//! collaborator to delete the surface of every group past its retention
//! window, and retires the group from the registry. Surface failures never
//! keep a group alive; they are reported as [`SweepEvent`]s for the caller to
//! log.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod surface;
pub mod sweeper;

pub use config::SweeperConfig;
pub use surface::{RenderSurface, SurfaceError};
pub use sweeper::{ExpirySweeper, SweepEvent, SweepReport};
