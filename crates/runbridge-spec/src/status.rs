use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle state of a run.
///
/// A run transitions pending/running -> completed or error exactly once per
/// invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
  #[default]
  Pending,
  Running,
  Completed,
  Error,
}

/// The mutable status of a run: its state plus the results payload.
///
/// Top-level fields the bridge does not own (written concurrently by other
/// platform components) are preserved in `extra` across merges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
  pub state: RunState,

  /// Named output artifact references.
  #[serde(default)]
  pub results: Map<String, Value>,

  /// Declared scalar result values, separate from artifact outputs.
  #[serde(default)]
  pub values: Map<String, Value>,

  /// Human-readable failure description, set on the error path.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,

  /// Fields owned by other platform components.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl RunStatus {
  /// Status for a given state with empty payloads.
  pub fn with_state(state: RunState) -> Self {
    Self {
      state,
      ..Self::default()
    }
  }

  /// Merge a status patch into this (freshly refreshed) snapshot.
  ///
  /// Last-writer-wins at the field level: the patch takes precedence on key
  /// conflicts, while fields only present on the snapshot are preserved.
  /// Commutative for disjoint key sets.
  pub fn merged_with(&self, patch: &RunStatus) -> RunStatus {
    RunStatus {
      state: patch.state,
      results: merge_maps(&self.results, &patch.results),
      values: merge_maps(&self.values, &patch.values),
      message: patch.message.clone().or_else(|| self.message.clone()),
      extra: merge_maps(&self.extra, &patch.extra),
    }
  }
}

fn merge_maps(current: &Map<String, Value>, patch: &Map<String, Value>) -> Map<String, Value> {
  let mut merged = current.clone();
  for (key, value) in patch {
    merged.insert(key.clone(), value.clone());
  }
  merged
}
