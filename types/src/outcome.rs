//! Invocation input and the tagged outcomes a wait can produce.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::WaitSeconds;

/// Input to a single wait invocation.
///
/// Holding a `WaitRequest` proves the duration is valid; see [`WaitSeconds`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitRequest {
    /// Number of seconds to wait, as a floating point number for subsecond precision.
    pub seconds: WaitSeconds,
}

impl WaitRequest {
    #[must_use]
    pub const fn new(seconds: WaitSeconds) -> Self {
        Self { seconds }
    }
}

/// Discriminator for [`WaitOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeTag {
    Success,
    Cancelled,
}

impl OutcomeTag {
    pub const ALL: [Self; 2] = [Self::Success, Self::Cancelled];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OutcomeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output record for the `success` case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessOutput {
    pub message: String,
    pub actual_wait_seconds: f64,
}

/// Output record for the `cancelled` case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelledOutput {
    pub error: String,
    pub actual_wait_seconds: f64,
}

/// Result of a wait invocation.
///
/// Cancellation is a normal outcome, not an error. Serializes as the step
/// output document: `{"output_id": "...", "output_data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_id", content = "output_data", rename_all = "snake_case")]
pub enum WaitOutcome {
    Success(SuccessOutput),
    Cancelled(CancelledOutput),
}

impl WaitOutcome {
    #[must_use]
    pub const fn tag(&self) -> OutcomeTag {
        match self {
            Self::Success(_) => OutcomeTag::Success,
            Self::Cancelled(_) => OutcomeTag::Cancelled,
        }
    }

    /// Measured wall-clock seconds between wait entry and wake.
    #[must_use]
    pub const fn actual_wait_seconds(&self) -> f64 {
        match self {
            Self::Success(out) => out.actual_wait_seconds,
            Self::Cancelled(out) => out.actual_wait_seconds,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(out) => &out.message,
            Self::Cancelled(out) => &out.error,
        }
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
