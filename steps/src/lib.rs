//! Step Executor Framework - core types, helpers, and the built-in wait step.

pub mod builtins;

pub use builtins::WaitStep;

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use waitstep_core::CancellationGate;
use waitstep_types::StepDefinition;

/// Step execution future type alias.
pub type StepFut<'a> = Pin<Box<dyn Future<Output = Result<StepOutput, StepError>> + Send + 'a>>;

/// Error types for step execution.
///
/// A cancelled wait is not an error; it is a normal [`StepOutput`].
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("Bad step input: {message}")]
    BadInput { message: String },
    #[error("Unknown step: {id}")]
    UnknownStep { id: String },
    #[error("Duplicate step registered: {id}")]
    DuplicateStep { id: String },
    #[error("Step {step} emitted undeclared output '{output_id}'")]
    UndeclaredOutput { step: String, output_id: String },
    #[error("Step execution failed: {step}: {message}")]
    ExecutionFailed { step: String, message: String },
}

/// Output document handed back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    pub output_id: String,
    pub output_data: Value,
}

impl StepOutput {
    pub fn new(output_id: impl Into<String>, output_data: Value) -> Self {
        Self {
            output_id: output_id.into(),
            output_data,
        }
    }

    pub fn from_record<T: Serialize>(
        output_id: impl Into<String>,
        record: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(output_id, serde_json::to_value(record)?))
    }
}

/// Per-invocation step context.
///
/// Owns the invocation's cancellation gate. Build a new context for every
/// invocation.
#[derive(Debug, Clone, Default)]
pub struct StepCtx {
    pub gate: CancellationGate,
}

impl StepCtx {
    #[must_use]
    pub fn new(gate: CancellationGate) -> Self {
        Self { gate }
    }
}

/// A unit of work the plugin exposes to its host.
pub trait StepExecutor: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;
    /// Every output id the step may emit, with the JSON Schema of its data.
    fn output_schemas(&self) -> Vec<(&'static str, Value)>;
    fn definition(&self) -> StepDefinition {
        self.output_schemas().into_iter().fold(
            StepDefinition::new(
                self.id(),
                self.name(),
                self.description(),
                self.input_schema(),
            ),
            |def, (id, schema)| def.with_output(id, schema),
        )
    }
    fn execute<'a>(&'a self, input: Value, ctx: &'a StepCtx) -> StepFut<'a>;
}

pub(crate) fn parse_input<T: serde::de::DeserializeOwned>(input: &Value) -> Result<T, StepError> {
    serde_json::from_value(input.clone()).map_err(|e| StepError::BadInput {
        message: e.to_string(),
    })
}

/// Validate an input document against a JSON schema.
pub fn validate_input(schema: &Value, input: &Value) -> Result<(), StepError> {
    check_schema(schema, input).map_err(|message| StepError::BadInput { message })
}

fn check_schema(schema: &Value, document: &Value) -> Result<(), String> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| format!("Invalid step schema: {e}"))?;
    let result = validator.validate(document);
    if let Err(err) = result {
        return Err(err.to_string());
    }
    Ok(())
}

/// Plugin schema document: every registered step, keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginSchema {
    pub steps: BTreeMap<String, StepDefinition>,
}

/// Step registry keyed by step id.
#[derive(Default)]
pub struct StepRegistry {
    executors: HashMap<String, Box<dyn StepExecutor>>,
}

impl StepRegistry {
    /// Registry with every built-in step.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        builtins::register_builtins(&mut registry);
        registry
    }

    pub fn register(&mut self, executor: Box<dyn StepExecutor>) -> Result<(), StepError> {
        let id = executor.id().to_string();
        if self.executors.contains_key(&id) {
            return Err(StepError::DuplicateStep { id });
        }
        self.executors.insert(id, executor);
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Result<&dyn StepExecutor, StepError> {
        self.executors
            .get(id)
            .map(AsRef::as_ref)
            .ok_or_else(|| StepError::UnknownStep { id: id.to_string() })
    }

    #[must_use]
    pub fn definitions(&self) -> Vec<StepDefinition> {
        let mut defs: Vec<StepDefinition> = self
            .executors
            .values()
            .map(|exec| exec.definition())
            .collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));
        defs
    }

    #[must_use]
    pub fn schema(&self) -> PluginSchema {
        PluginSchema {
            steps: self
                .definitions()
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        }
    }

    /// Validate `input`, execute the step, and check the output it produced.
    pub async fn run(
        &self,
        id: &str,
        input: Value,
        ctx: &StepCtx,
    ) -> Result<StepOutput, StepError> {
        let executor = self.lookup(id)?;
        validate_input(&executor.input_schema(), &input)?;
        tracing::debug!(step = id, "Step input validated");

        let output = executor.execute(input, ctx).await?;

        let Some((_, schema)) = executor
            .output_schemas()
            .into_iter()
            .find(|(output_id, _)| *output_id == output.output_id)
        else {
            return Err(StepError::UndeclaredOutput {
                step: id.to_string(),
                output_id: output.output_id,
            });
        };
        check_schema(&schema, &output.output_data).map_err(|message| {
            StepError::ExecutionFailed {
                step: id.to_string(),
                message: format!("output '{}' failed validation: {message}", output.output_id),
            }
        })?;

        tracing::debug!(step = id, output_id = %output.output_id, "Step finished");
        Ok(output)
    }
}
