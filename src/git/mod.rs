//! Everything that talks to, or understands the output of, the git CLI
//!
//! The executable gives no structured feedback: progress and ref-update
//! reports are free text on stderr. The submodules here build exact
//! argument lists, run the process, and turn that text back into data.

pub mod args;
pub mod clone;
pub mod fast_forward;
pub mod fetch;
pub mod progress;
pub mod runner;

pub use clone::{clone, CloneOptions};
pub use fast_forward::{fast_forward_branches, BranchUpdate, FastForwardRequest};
pub use fetch::{fetch, fetch_refspec, FetchOptions};
pub use runner::{GitCommand, GitOutput};
