//! Remora - git network-operation progress tracking
//!
//! Drives the external `git` executable for long-running network
//! operations (clone, fetch, branch fast-forward), turns its free-form
//! stderr chatter into bounded progress values, and tracks any number of
//! concurrently running operations with consistent snapshots and change
//! notification for a UI.
//!
//! Out of scope here: the git executable itself, credential and
//! environment setup for remote authentication, and rendering. Callers
//! that own authentication pass their network arguments through
//! unchanged.

pub mod error;
pub mod git;
pub mod models;
pub mod services;

#[cfg(test)]
mod test_utils;

pub use error::{RemoraError, Result};
pub use models::{Operation, OperationKind, ProgressState};
pub use services::{CloneHandle, CloneService};
