//! Run finalization and execution-window bookkeeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use runbridge_spec::{RunRecord, RunState, RunStatus};
use runbridge_store::RunStore;
use tracing::{error, info};

use crate::error::StageError;

/// Concurrency/telemetry bookkeeping across invocations.
///
/// The host drives at most one tracker per execution context; each
/// invocation opens one [`ExecutionTicket`] against it and the ticket is
/// closed exactly once regardless of which stage failed.
#[derive(Debug, Default)]
pub struct ExecutionTracker {
  active: AtomicU64,
  started: AtomicU64,
  finished: AtomicU64,
}

impl ExecutionTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Open the execution window for one invocation.
  pub fn begin(self: &Arc<Self>) -> ExecutionTicket {
    self.active.fetch_add(1, Ordering::SeqCst);
    self.started.fetch_add(1, Ordering::SeqCst);
    ExecutionTicket {
      tracker: Arc::clone(self),
      closed: AtomicBool::new(false),
    }
  }

  /// Invocations whose execution window is currently open.
  pub fn active(&self) -> u64 {
    self.active.load(Ordering::SeqCst)
  }

  /// Total invocations started.
  pub fn started_total(&self) -> u64 {
    self.started.load(Ordering::SeqCst)
  }

  /// Total execution windows closed.
  pub fn finished_total(&self) -> u64 {
    self.finished.load(Ordering::SeqCst)
  }
}

/// One invocation's execution window.
///
/// Closing is idempotent: the first close records the finish, later closes
/// are no-ops. Dropping an unclosed ticket closes it as a backstop.
#[derive(Debug)]
pub struct ExecutionTicket {
  tracker: Arc<ExecutionTracker>,
  closed: AtomicBool,
}

impl ExecutionTicket {
  /// Mark the execution window closed.
  pub fn close(&self) {
    if self.closed.swap(true, Ordering::SeqCst) {
      return;
    }
    self.tracker.active.fetch_sub(1, Ordering::SeqCst);
    self.tracker.finished.fetch_add(1, Ordering::SeqCst);
    info!("execution window closed");
  }

  pub fn is_closed(&self) -> bool {
    self.closed.load(Ordering::SeqCst)
  }
}

impl Drop for ExecutionTicket {
  fn drop(&mut self) {
    self.close();
  }
}

/// Owns the run record during the execution window: start marker, success
/// finalize, best-effort error finalize.
pub struct Finalizer {
  store: Arc<dyn RunStore>,
}

impl Finalizer {
  pub fn new(store: Arc<dyn RunStore>) -> Self {
    Self { store }
  }

  /// Record the running marker, before any other stage.
  ///
  /// Only the status is written; the rest of the record may have been
  /// updated remotely since initialization and is left alone.
  pub async fn mark_started(&self, run: &mut RunRecord) -> Result<(), StageError> {
    run.status.state = RunState::Running;
    self
      .store
      .set_status(&run.project, &run.id, &run.status)
      .await
      .map_err(|source| StageError::StatusPersistence { source })
  }

  /// Merge the status patch into the freshly refreshed persisted status and
  /// persist the result. At most once per invocation on the success path.
  pub async fn finalize(&self, run: &mut RunRecord, patch: &RunStatus) -> Result<(), StageError> {
    let remote = self
      .store
      .refresh(run)
      .await
      .map_err(|source| StageError::StatusPersistence { source })?;

    let merged = remote.status.merged_with(patch);
    info!(state = ?merged.state, "persisting run status");

    self
      .store
      .set_status(&run.project, &run.id, &merged)
      .await
      .map_err(|source| StageError::StatusPersistence { source })?;

    run.status = merged;
    Ok(())
  }

  /// Best-effort error-state finalize for the failure path.
  ///
  /// A failure here is logged and not retried; the original stage error is
  /// what the caller reports.
  pub async fn finalize_error(&self, run: &mut RunRecord, err: &StageError) {
    let mut patch = RunStatus::with_state(RunState::Error);
    patch.message = Some(err.response_message());

    if let Err(persist_err) = self.finalize(run, &patch).await {
      error!(error = %persist_err, "failed to record error status");
    }
  }
}
