//! Roster Daemon
//!
//! The caller side of the roster engine:
//! - Configuration loading
//! - The multi-step draft flow for creating groups
//! - Privilege checks and render-surface upkeep around registry calls
//! - A logging render surface for running without a chat platform

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod drafts;
pub mod error;
pub mod log_surface;
pub mod privilege;
pub mod service;

pub use config::{CatalogConfig, DraftConfig, LoggingConfig, RosterConfig};
pub use drafts::{DraftBook, FinalizedDraft, PendingDraft};
pub use error::{DaemonError, DaemonResult, ServiceError, ServiceResult};
pub use log_surface::LogSurface;
pub use privilege::{PrivilegeCheck, StaticPrivileges};
pub use service::{log_sweep_event, RosterService};
