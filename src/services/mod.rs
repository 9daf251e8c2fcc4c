//! Service layer for Remora
//!
//! Services own the mutable state shared with UI collaborators and sit
//! on top of the raw git operations in [`crate::git`].

pub mod clone_service;

pub use clone_service::{CloneHandle, CloneService};
