//! Data models for Remora

pub mod operation;
pub mod progress;

pub use operation::{Operation, OperationKind};
pub use progress::ProgressState;
