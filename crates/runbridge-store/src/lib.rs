//! Runbridge Store
//!
//! Collaborator contracts for the orchestration platform's registry:
//! - [`RunStore`]: read, refresh and persist run records
//! - [`ArtifactRegistry`]: materialize declared inputs and register outputs
//!
//! Two implementations ship with the workspace: [`MemoryStore`] for tests and
//! embedders, and [`SqliteStore`] persisting run records to a database.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use async_trait::async_trait;
use runbridge_spec::{RunRecord, RunStatus};
use serde::Serialize;
use serde_json::Value;

/// Error type for registry operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// The requested record was not found.
  #[error("not found: {0}")]
  NotFound(String),

  /// A declared input reference could not be materialized.
  #[error("artifact '{reference}' could not be resolved: {message}")]
  Artifact { reference: String, message: String },

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// A record could not be encoded or decoded.
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

/// A declared input materialized by the registry.
///
/// Carries the materialized value and, when the registry staged the artifact
/// locally, the path it lives at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactHandle {
  pub reference: String,
  pub value: Value,
  pub local_path: Option<PathBuf>,
}

/// Read/write access to persisted run records.
#[async_trait]
pub trait RunStore: Send + Sync {
  /// Fetch a run by id or full run key.
  async fn get_run(&self, project: &str, id_or_key: &str) -> Result<RunRecord, StoreError>;

  /// Re-read the persisted state of a run.
  async fn refresh(&self, run: &RunRecord) -> Result<RunRecord, StoreError>;

  /// Persist a run record. `update` distinguishes updating an existing
  /// record from creating a new one.
  async fn save(&self, run: &RunRecord, update: bool) -> Result<(), StoreError>;

  /// Persist only the status of an existing run.
  async fn set_status(&self, project: &str, id: &str, status: &RunStatus) -> Result<(), StoreError>;
}

/// Materialization of declared inputs and registration of named outputs.
#[async_trait]
pub trait ArtifactRegistry: Send + Sync {
  /// Materialize a declared input reference.
  ///
  /// Idempotent per reference: materializing the same reference twice within
  /// one run yields the same handle and must not corrupt state.
  async fn resolve_input(&self, project: &str, reference: &str)
  -> Result<ArtifactHandle, StoreError>;

  /// Register a resolved output value as a named artifact under the
  /// project/run scope, returning its reference.
  ///
  /// Idempotent per `(run_key, name)`.
  async fn register_output(
    &self,
    project: &str,
    run_key: &str,
    name: &str,
    value: &Value,
  ) -> Result<String, StoreError>;
}
