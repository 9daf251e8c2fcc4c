//! Operation models

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What a tracked git invocation is doing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum OperationKind {
    #[serde(rename_all = "camelCase")]
    Clone { remote_url: String },
    #[serde(rename_all = "camelCase")]
    Fetch { remote_name: String },
    FastForward,
}

/// One tracked invocation of the git executable.
///
/// The id is unique for the lifetime of the service that created the
/// operation and is never reused after removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: u64,
    pub target_path: PathBuf,
    #[serde(flatten)]
    pub kind: OperationKind,
}

impl Operation {
    /// Human-readable name for UI lists: the last segment of the target
    /// path, or the whole path when there is no segment to take.
    pub fn display_name(&self) -> String {
        self.target_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.target_path.display().to_string())
    }
}
