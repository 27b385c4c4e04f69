//! The execution orchestrator.
//!
//! One instance per execution context, one pipeline pass per inbound event:
//! running marker, input composition, invocation, output materialization,
//! status building, finalization. Any stage failure short-circuits the
//! remaining non-finalizing stages; the execution window is still closed and
//! a best-effort error status is persisted. No error ever escapes to the
//! host's dispatch layer - every outcome is a response object.

use std::sync::Arc;

use runbridge_function::{CallingConvention, ResolvedFunction};
use runbridge_spec::{CallContext, Event, Response, RunRecord, RunSpec, RunStatus};
use runbridge_store::{ArtifactRegistry, RunStore};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::compose::compose_inputs;
use crate::error::StageError;
use crate::finalize::{ExecutionTracker, Finalizer};
use crate::invoke::invoke;
use crate::outputs::{fold_registered, materialize};
use crate::status::build_status;

/// Orchestrator configuration.
///
/// Behavioral variants are flags here, not duplicate code paths.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
  /// Extract declared scalar values into the separate values channel.
  pub collect_values: bool,
}

impl Default for OrchestratorConfig {
  fn default() -> Self {
    Self {
      collect_values: true,
    }
  }
}

/// Top-level controller sequencing the pipeline for one inbound event.
pub struct Orchestrator {
  artifacts: Arc<dyn ArtifactRegistry>,
  function: ResolvedFunction,
  run: RunRecord,
  call_ctx: CallContext,
  tracker: Arc<ExecutionTracker>,
  finalizer: Finalizer,
  config: OrchestratorConfig,
}

impl Orchestrator {
  pub fn new(
    store: Arc<dyn RunStore>,
    artifacts: Arc<dyn ArtifactRegistry>,
    function: ResolvedFunction,
    run: RunRecord,
    call_ctx: CallContext,
    tracker: Arc<ExecutionTracker>,
    config: OrchestratorConfig,
  ) -> Self {
    let finalizer = Finalizer::new(store);
    Self {
      artifacts,
      function,
      run,
      call_ctx,
      tracker,
      finalizer,
      config,
    }
  }

  /// Handle one inbound event through the full run-execution lifecycle.
  #[instrument(
    name = "run_execute",
    skip(self, event),
    fields(project = %self.run.project, run_id = %self.run.id)
  )]
  pub async fn handle(&self, event: &Event) -> Response {
    let ticket = self.tracker.begin();

    // One working copy per invocation; exactly one record is mutated.
    let mut run = self.run.clone();
    let result = self.run_stages(&mut run, event).await;
    ticket.close();

    match result {
      Ok(status) => {
        info!(state = ?status.state, "run completed");
        Response::ok()
      }
      Err(err) => {
        error!(stage = err.stage(), error = %err, "run failed");
        self.finalizer.finalize_error(&mut run, &err).await;
        Response::failure(err.response_message())
      }
    }
  }

  /// Serve-mode dispatch: compose injected arguments, call the function and
  /// return its raw result, without touching run status.
  #[instrument(
    name = "run_serve",
    skip(self, event),
    fields(project = %self.run.project, run_id = %self.run.id)
  )]
  pub async fn serve(&self, event: &Event) -> Response {
    let ticket = self.tracker.begin();
    let result = self.serve_inner(event).await;
    ticket.close();

    match result {
      Ok(value) => Response::json(&value),
      Err(err) => {
        error!(stage = err.stage(), error = %err, "serve call failed");
        Response::failure(err.response_message())
      }
    }
  }

  async fn run_stages(
    &self,
    run: &mut RunRecord,
    event: &Event,
  ) -> Result<RunStatus, StageError> {
    self.finalizer.mark_started(run).await?;

    let spec = self.effective_spec(run, event)?;

    info!("composing function inputs");
    let args = compose_inputs(
      &spec,
      &self.function.signature,
      &run.project,
      self.artifacts.as_ref(),
      &self.call_ctx,
      event,
    )
    .await?;

    info!("executing function");
    let raw = invoke(&self.function.handler, &args, &run.project, &run.key)?;

    let declared_values: &[String] = if self.config.collect_values {
      &spec.values
    } else {
      &[]
    };

    let outputs = match self.function.handler.calling_convention() {
      CallingConvention::Wrapped => fold_registered(&raw, declared_values),
      CallingConvention::Plain => {
        materialize(
          &raw,
          &spec.outputs,
          declared_values,
          &run.project,
          &run.key,
          self.artifacts.as_ref(),
        )
        .await?
      }
    };

    info!("building run status");
    let status = build_status(&outputs);

    self.finalizer.finalize(run, &status).await?;
    Ok(status)
  }

  async fn serve_inner(&self, event: &Event) -> Result<Value, StageError> {
    // No declared inputs or parameters in serve mode; only context/event
    // injection applies.
    let args = compose_inputs(
      &RunSpec::default(),
      &self.function.signature,
      &self.run.project,
      self.artifacts.as_ref(),
      &self.call_ctx,
      event,
    )
    .await?;

    invoke(&self.function.handler, &args, &self.run.project, &self.run.key)
  }

  /// The spec to execute against: the event-embedded spec is authoritative
  /// when present, falling back to the previously fetched run spec.
  fn effective_spec(&self, run: &RunRecord, event: &Event) -> Result<RunSpec, StageError> {
    let payload = event.payload().map_err(|e| StageError::InputResolution {
      name: "event".to_string(),
      message: e.to_string(),
    })?;

    if payload.project != run.project {
      warn!(
        event_project = %payload.project,
        "event project does not match the execution context"
      );
    }

    Ok(payload.spec.unwrap_or_else(|| run.spec.clone()))
  }
}
