//! Error types for Remora

use thiserror::Error;

/// Errors surfaced by git network operations
#[derive(Error, Debug)]
pub enum RemoraError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The external git process exited with a code outside the set the
    /// operation declared acceptable.
    #[error("git exited with code {code}: {stderr}")]
    UnexpectedExit { code: i32, stderr: String },

    /// The external git process was killed by a signal before producing
    /// an exit code.
    #[error("git terminated by signal")]
    Terminated,
}

impl RemoraError {
    /// Exit code of the failed process, when one was produced.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RemoraError::UnexpectedExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type alias for Remora operations
pub type Result<T> = std::result::Result<T, RemoraError>;
