//! Core domain types for waitstep.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the plugin.

mod outcome;
mod proofs;

pub use outcome::{CancelledOutput, OutcomeTag, SuccessOutput, WaitOutcome, WaitRequest};
pub use proofs::{InvalidWaitSeconds, WaitSeconds};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Step Definitions
// ============================================================================

/// Definition of a step the plugin exposes to its host.
///
/// `input` is a JSON Schema for the step's input document; `outputs` maps every
/// output id the step may emit to the JSON Schema of that output's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Stable identifier the host uses to select the step.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// A description of what the step does.
    pub description: String,
    /// JSON Schema describing the step's input.
    pub input: serde_json::Value,
    /// JSON Schema per output id.
    pub outputs: BTreeMap<String, serde_json::Value>,
}

impl StepDefinition {
    /// Create a new step definition with no outputs.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            input,
            outputs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_output(mut self, id: impl Into<String>, schema: serde_json::Value) -> Self {
        self.outputs.insert(id.into(), schema);
        self
    }

    #[must_use]
    pub fn declares_output(&self, id: &str) -> bool {
        self.outputs.contains_key(id)
    }
}
