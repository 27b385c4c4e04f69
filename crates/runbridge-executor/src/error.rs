//! Stage error taxonomy.

use runbridge_store::StoreError;
use thiserror::Error;

/// Errors raised by the pipeline stages.
///
/// All four are caught at the orchestrator boundary and converted into the
/// uniform failure response; none propagate to the host and none are retried.
#[derive(Debug, Error)]
pub enum StageError {
  /// A declared input could not be resolved, or a required function
  /// parameter has no matching input, parameter or injectable default.
  #[error("input resolution failed for '{name}': {message}")]
  InputResolution { name: String, message: String },

  /// The user function raised an error. Propagated unchanged from the
  /// invoker; the orchestrator decides recovery.
  #[error("user function raised: {source}")]
  Execution { source: anyhow::Error },

  /// The raw result's shape does not match the output declaration.
  #[error("output mapping failed for '{name}': {message}")]
  OutputMapping { name: String, message: String },

  /// The run status could not be persisted.
  #[error("status persistence failed: {source}")]
  StatusPersistence { source: StoreError },
}

impl StageError {
  /// Human-readable name of the failing stage, embedded in failure
  /// responses.
  pub fn stage(&self) -> &'static str {
    match self {
      Self::InputResolution { .. } => "input composition",
      Self::Execution { .. } => "function execution",
      Self::OutputMapping { .. } => "output materialization",
      Self::StatusPersistence { .. } => "status persistence",
    }
  }

  /// The uniform failure payload: stage description plus the original
  /// error's arguments. Stack traces are logged, never exposed here.
  pub fn response_message(&self) -> String {
    let detail = match self {
      Self::InputResolution { name, message } => format!("'{name}': {message}"),
      Self::Execution { source } => source.to_string(),
      Self::OutputMapping { name, message } => format!("'{name}': {message}"),
      Self::StatusPersistence { source } => source.to_string(),
    };
    format!("{} failed: {}", self.stage(), detail)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn response_message_names_the_stage_and_the_original_error() {
    let err = StageError::Execution {
      source: anyhow::anyhow!("bad input"),
    };
    let message = err.response_message();
    assert!(message.contains("function execution"));
    assert!(message.contains("bad input"));
  }

  #[test]
  fn output_errors_mention_the_output_stage() {
    let err = StageError::OutputMapping {
      name: "y".to_string(),
      message: "result has no entry for declared output".to_string(),
    };
    assert!(err.response_message().contains("output"));
    assert!(err.response_message().contains("'y'"));
  }
}
