//! Roster Types - Core types for role-slotted activity groups
//!
//! A group offers a fixed set of named roles, each with a capacity. Participants
//! join a role while it has room and queue on the group's waitlist otherwise.
//! Departures free a slot and promote waiting participants in arrival order.
//!
//! ## Key Concepts
//!
//! - **RoleSlotSet**: Role name → capacity + ordered occupants
//! - **Waitlist**: FIFO queue of (participant, desired role)
//! - **Group**: Aggregate of identity, ownership, slots, and waitlist
//! - **GroupDraft**: A group under construction, never stored in the catalog
//! - **GroupView**: Owned snapshot handed back to callers for rendering
//!
//! The registry that owns groups lives in `roster-registry`.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod catalog;
pub mod clock;
pub mod errors;
pub mod group;
pub mod ids;
pub mod outcome;
pub mod slots;
pub mod view;
pub mod waitlist;

// Re-export main types
pub use catalog::{RoleCatalog, ANY_ROLE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{RosterError, RosterResult};
pub use group::{Group, GroupDraft, GroupEdit};
pub use ids::{
    GroupId, IdGenerator, ParticipantId, RandomIdGenerator, RenderHandle, RoleName,
    SequentialIdGenerator,
};
pub use outcome::{
    DepartureOutcome, EditOutcome, JoinOutcome, Placement, Promotion, RetiredGroup, Vacated,
};
pub use slots::{RoleSlot, RoleSlotSet};
pub use view::{GroupView, RoleView, WaitlistView};
pub use waitlist::{Waitlist, WaitlistEntry};
