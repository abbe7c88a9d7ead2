//! Roster Registry - the authoritative catalog of groups
//!
//! [`GroupRegistry`] owns every committed group and is the only code path that
//! mutates one. Each group sits behind its own lock, so operations on one group
//! are serialized while different groups proceed independently. No operation
//! performs I/O; callers render from the returned outcome after the lock is
//! released.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod registry;

pub use registry::{ExpiredGroup, GroupRegistry, MAX_ID_ATTEMPTS};
