//! Built-in step executors.

use serde_json::json;
use waitstep_types::{OutcomeTag, WaitOutcome, WaitRequest};

use super::{StepCtx, StepError, StepExecutor, StepFut, StepOutput, StepRegistry, parse_input};

pub(crate) fn register_builtins(registry: &mut StepRegistry) {
    if let Err(e) = registry.register(Box::new(WaitStep)) {
        tracing::warn!("Failed to register built-in step: {e}");
    }
}

/// Waits for the requested number of seconds unless the invocation is cancelled.
///
/// # Outputs
/// - `success`: `{ message, actual_wait_seconds }`
/// - `cancelled`: `{ error, actual_wait_seconds }`
#[derive(Debug, Default)]
pub struct WaitStep;

impl WaitStep {
    pub const ID: &'static str = "wait";
}

fn outcome_to_output(outcome: &WaitOutcome) -> Result<StepOutput, StepError> {
    let tag = outcome.tag();
    let output = match outcome {
        WaitOutcome::Success(record) => StepOutput::from_record(tag.as_str(), record),
        WaitOutcome::Cancelled(record) => StepOutput::from_record(tag.as_str(), record),
    };
    output.map_err(|e| StepError::ExecutionFailed {
        step: WaitStep::ID.to_string(),
        message: format!("failed to serialize {tag} output: {e}"),
    })
}

impl StepExecutor for WaitStep {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "Wait"
    }

    fn description(&self) -> &'static str {
        "Waits for the given amount of time"
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "seconds": {
                    "type": "number",
                    "minimum": 0,
                    "description": "number of seconds to wait as a floating point number for subsecond precision."
                }
            },
            "required": ["seconds"]
        })
    }

    fn output_schemas(&self) -> Vec<(&'static str, serde_json::Value)> {
        vec![
            (
                OutcomeTag::Success.as_str(),
                json!({
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "message": {"type": "string"},
                        "actual_wait_seconds": {"type": "number", "minimum": 0}
                    },
                    "required": ["message", "actual_wait_seconds"]
                }),
            ),
            (
                OutcomeTag::Cancelled.as_str(),
                json!({
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "error": {"type": "string"},
                        "actual_wait_seconds": {"type": "number", "minimum": 0}
                    },
                    "required": ["error", "actual_wait_seconds"]
                }),
            ),
        ]
    }

    fn execute<'a>(&'a self, input: serde_json::Value, ctx: &'a StepCtx) -> StepFut<'a> {
        Box::pin(async move {
            let request: WaitRequest = parse_input(&input)?;
            let outcome = waitstep_core::wait(request, &ctx.gate).await;
            outcome_to_output(&outcome)
        })
    }
}
