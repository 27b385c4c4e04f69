use serde::{Deserialize, Serialize};

use crate::spec::RunSpec;
use crate::status::RunStatus;

/// The platform's persisted entity for one tracked execution.
///
/// Exactly one record is mutated per invocation. The record is owned by the
/// finalizer during the execution window and by the platform at rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
  pub project: String,
  pub id: String,
  /// Project-scoped key, e.g. "store://proj/runs/abc".
  pub key: String,
  pub spec: RunSpec,
  #[serde(default)]
  pub status: RunStatus,
}

impl RunRecord {
  /// Create a pending run with a freshly derived key.
  pub fn new(project: impl Into<String>, id: impl Into<String>, spec: RunSpec) -> Self {
    let project = project.into();
    let id = id.into();
    let key = Self::run_key(&project, &id);
    Self {
      project,
      id,
      key,
      spec,
      status: RunStatus::default(),
    }
  }

  /// Derive the project-scoped run key for an id.
  pub fn run_key(project: &str, id: &str) -> String {
    format!("store://{project}/runs/{id}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn key_is_project_scoped() {
    let run = RunRecord::new("p1", "r1", RunSpec::default());
    assert_eq!(run.key, "store://p1/runs/r1");
    assert_eq!(run.status, RunStatus::default());
  }
}
