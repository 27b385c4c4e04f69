//! In-memory store for tests and embedders.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use runbridge_spec::{RunRecord, RunStatus};
use serde_json::Value;
use tracing::info;

use crate::{ArtifactHandle, ArtifactRegistry, RunStore, StoreError};

/// In-memory implementation of [`RunStore`] and [`ArtifactRegistry`].
#[derive(Default)]
pub struct MemoryStore {
  runs: RwLock<HashMap<(String, String), RunRecord>>,
  artifacts: RwLock<HashMap<(String, String), ArtifactHandle>>,
  outputs: RwLock<HashMap<(String, String), String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed a run record.
  pub fn put_run(&self, run: RunRecord) {
    let mut runs = self.runs.write().unwrap_or_else(|e| e.into_inner());
    runs.insert((run.project.clone(), run.id.clone()), run);
  }

  /// Seed an input artifact under a reference.
  pub fn put_artifact(&self, project: &str, reference: &str, value: Value) {
    self.put_artifact_at(project, reference, value, None);
  }

  /// Seed an input artifact with a local materialization path.
  pub fn put_artifact_at(
    &self,
    project: &str,
    reference: &str,
    value: Value,
    local_path: Option<PathBuf>,
  ) {
    let handle = ArtifactHandle {
      reference: reference.to_string(),
      value,
      local_path,
    };
    let mut artifacts = self.artifacts.write().unwrap_or_else(|e| e.into_inner());
    artifacts.insert((project.to_string(), reference.to_string()), handle);
  }

  /// Number of registered outputs, across all runs.
  pub fn registered_outputs(&self) -> usize {
    let outputs = self.outputs.read().unwrap_or_else(|e| e.into_inner());
    outputs.len()
  }

  fn id_from(id_or_key: &str) -> &str {
    match id_or_key.rsplit_once('/') {
      Some((_, id)) if id_or_key.starts_with("store://") => id,
      _ => id_or_key,
    }
  }
}

#[async_trait]
impl RunStore for MemoryStore {
  async fn get_run(&self, project: &str, id_or_key: &str) -> Result<RunRecord, StoreError> {
    let id = Self::id_from(id_or_key);
    let runs = self.runs.read().unwrap_or_else(|e| e.into_inner());
    runs
      .get(&(project.to_string(), id.to_string()))
      .cloned()
      .ok_or_else(|| StoreError::NotFound(format!("run '{id_or_key}' in project '{project}'")))
  }

  async fn refresh(&self, run: &RunRecord) -> Result<RunRecord, StoreError> {
    self.get_run(&run.project, &run.id).await
  }

  async fn save(&self, run: &RunRecord, update: bool) -> Result<(), StoreError> {
    let key = (run.project.clone(), run.id.clone());
    let mut runs = self.runs.write().unwrap_or_else(|e| e.into_inner());
    if update && !runs.contains_key(&key) {
      return Err(StoreError::NotFound(format!(
        "run '{}' in project '{}'",
        run.id, run.project
      )));
    }
    runs.insert(key, run.clone());
    Ok(())
  }

  async fn set_status(
    &self,
    project: &str,
    id: &str,
    status: &RunStatus,
  ) -> Result<(), StoreError> {
    let mut runs = self.runs.write().unwrap_or_else(|e| e.into_inner());
    let run = runs
      .get_mut(&(project.to_string(), id.to_string()))
      .ok_or_else(|| StoreError::NotFound(format!("run '{id}' in project '{project}'")))?;
    run.status = status.clone();
    Ok(())
  }
}

#[async_trait]
impl ArtifactRegistry for MemoryStore {
  async fn resolve_input(
    &self,
    project: &str,
    reference: &str,
  ) -> Result<ArtifactHandle, StoreError> {
    let artifacts = self.artifacts.read().unwrap_or_else(|e| e.into_inner());
    artifacts
      .get(&(project.to_string(), reference.to_string()))
      .cloned()
      .ok_or_else(|| StoreError::Artifact {
        reference: reference.to_string(),
        message: "no artifact registered under this reference".to_string(),
      })
  }

  async fn register_output(
    &self,
    project: &str,
    run_key: &str,
    name: &str,
    value: &Value,
  ) -> Result<String, StoreError> {
    let key = (run_key.to_string(), name.to_string());

    {
      let outputs = self.outputs.read().unwrap_or_else(|e| e.into_inner());
      if let Some(reference) = outputs.get(&key) {
        return Ok(reference.clone());
      }
    }

    let run_id = Self::id_from(run_key);
    let reference = format!("store://{project}/artifacts/{run_id}/{name}");
    info!(reference = %reference, "registered output artifact");

    self.put_artifact(project, &reference, value.clone());
    let mut outputs = self.outputs.write().unwrap_or_else(|e| e.into_inner());
    outputs.insert(key, reference.clone());
    Ok(reference)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use runbridge_spec::{RunSpec, RunState};
  use serde_json::json;

  fn seeded() -> MemoryStore {
    let store = MemoryStore::new();
    store.put_run(RunRecord::new("p1", "r1", RunSpec::default()));
    store
  }

  #[tokio::test]
  async fn get_run_accepts_id_or_full_key() {
    let store = seeded();
    let by_id = store.get_run("p1", "r1").await.unwrap();
    let by_key = store.get_run("p1", "store://p1/runs/r1").await.unwrap();
    assert_eq!(by_id, by_key);
  }

  #[tokio::test]
  async fn save_with_update_requires_an_existing_run() {
    let store = MemoryStore::new();
    let run = RunRecord::new("p1", "r1", RunSpec::default());
    assert!(matches!(
      store.save(&run, true).await,
      Err(StoreError::NotFound(_))
    ));
    store.save(&run, false).await.unwrap();
    store.save(&run, true).await.unwrap();
  }

  #[tokio::test]
  async fn set_status_is_visible_on_refresh() {
    let store = seeded();
    let run = store.get_run("p1", "r1").await.unwrap();

    let mut status = RunStatus::with_state(RunState::Completed);
    status.results.insert("a".into(), json!(1));
    store.set_status("p1", "r1", &status).await.unwrap();

    let refreshed = store.refresh(&run).await.unwrap();
    assert_eq!(refreshed.status, status);
  }

  #[tokio::test]
  async fn register_output_is_idempotent_per_run_and_name() {
    let store = MemoryStore::new();
    let first = store
      .register_output("p1", "store://p1/runs/r1", "y", &json!(10))
      .await
      .unwrap();
    let second = store
      .register_output("p1", "store://p1/runs/r1", "y", &json!(10))
      .await
      .unwrap();

    assert_eq!(first, second);
    assert_eq!(store.registered_outputs(), 1);

    let handle = store.resolve_input("p1", &first).await.unwrap();
    assert_eq!(handle.value, json!(10));
  }

  #[tokio::test]
  async fn unknown_input_reference_is_an_artifact_error() {
    let store = MemoryStore::new();
    let err = store.resolve_input("p1", "store://p1/missing").await;
    assert!(matches!(err, Err(StoreError::Artifact { .. })));
  }
}
