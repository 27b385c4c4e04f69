//! Status building.

use runbridge_spec::{RunState, RunStatus};

use crate::outputs::MaterializedOutputs;

/// Build the status patch for a completed run.
///
/// Pure: a deterministic mapping from materialized outputs to a status patch
/// with no side effects. The persisted record is never touched here.
pub fn build_status(outputs: &MaterializedOutputs) -> RunStatus {
  RunStatus {
    state: RunState::Completed,
    results: outputs.results.clone(),
    values: outputs.values.clone(),
    message: None,
    extra: serde_json::Map::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn status_carries_results_and_values() {
    let mut outputs = MaterializedOutputs::default();
    outputs
      .results
      .insert("y".into(), json!("store://p1/artifacts/r1/y"));
    outputs.values.insert("accuracy".into(), json!(0.9));

    let status = build_status(&outputs);
    assert_eq!(status.state, RunState::Completed);
    assert_eq!(status.results["y"], json!("store://p1/artifacts/r1/y"));
    assert_eq!(status.values["accuracy"], json!(0.9));
    assert!(status.message.is_none());
  }

  #[test]
  fn building_twice_yields_identical_patches() {
    let outputs = MaterializedOutputs::default();
    assert_eq!(build_status(&outputs), build_status(&outputs));
  }
}
