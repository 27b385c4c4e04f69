use std::path::PathBuf;

use serde::Serialize;

/// The immutable execution context injected into user functions by name.
///
/// Constructed once at context initialization and passed by reference through
/// the pipeline; never mutated per invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallContext {
  pub project: String,
  pub run_id: String,
  pub run_key: String,
  /// Local working root where artifacts are materialized.
  pub root: PathBuf,
}
