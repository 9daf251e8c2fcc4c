//! Progress models

use serde::{Deserialize, Serialize};

/// Latest progress snapshot for one operation.
///
/// Replaced wholesale on every output line, never patched in place. A
/// missing `value` means indeterminate progress (for example the
/// pre-transfer negotiation phase), which a UI should render as a busy
/// indicator rather than a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    /// Raw output line the snapshot was derived from.
    pub output: String,
    /// Overall progress in `[0, 1]`, when a phase percentage was found.
    pub value: Option<f64>,
}

impl ProgressState {
    pub fn indeterminate(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            value: None,
        }
    }

    pub fn with_value(output: impl Into<String>, value: f64) -> Self {
        Self {
            output: output.into(),
            value: Some(value),
        }
    }
}
