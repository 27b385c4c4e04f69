//! Output materialization.
//!
//! Interprets the function's raw return value against the declared outputs,
//! registering each resolved value as a named artifact under the project/run
//! scope. Declared scalar values are extracted into a separate values
//! channel, kept apart from artifact outputs.

use indexmap::IndexMap;
use runbridge_spec::OutputDecl;
use runbridge_store::ArtifactRegistry;
use serde_json::{Map, Value};
use tracing::info;

use crate::error::StageError;

/// Named outputs produced by interpreting a raw result.
///
/// Lifetime ends once folded into the status record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterializedOutputs {
  /// Output name -> registered artifact reference.
  pub results: Map<String, Value>,
  /// Declared scalar values extracted from the raw result.
  pub values: Map<String, Value>,
}

/// Materialize a plain function's raw result against the output declaration.
///
/// Deterministic for identical inputs: the same raw result and declarations
/// produce the same outputs, and artifact registration is idempotent per
/// `(run_key, name)`.
pub async fn materialize(
  raw: &Value,
  outputs: &IndexMap<String, OutputDecl>,
  declared_values: &[String],
  project: &str,
  run_key: &str,
  registry: &dyn ArtifactRegistry,
) -> Result<MaterializedOutputs, StageError> {
  let mut materialized = MaterializedOutputs::default();

  if !outputs.is_empty() {
    for (name, value) in pair_outputs(raw, outputs)? {
      let reference = registry
        .register_output(project, run_key, &name, &value)
        .await
        .map_err(|e| StageError::OutputMapping {
          name: name.clone(),
          message: e.to_string(),
        })?;
      info!(output = %name, reference = %reference, "materialized output");
      materialized.results.insert(name, Value::String(reference));
    }
  }

  materialized.values = extract_values(raw, declared_values);
  Ok(materialized)
}

/// Fold a wrapped function's raw result into outputs.
///
/// Wrapped functions register their own artifacts; their returned mapping is
/// taken as the results payload, minus the names routed to the values
/// channel. A name is never carried on both channels.
pub fn fold_registered(raw: &Value, declared_values: &[String]) -> MaterializedOutputs {
  let values = extract_values(raw, declared_values);
  let results = match raw {
    Value::Object(map) => map
      .iter()
      .filter(|(name, _)| !values.contains_key(name.as_str()))
      .map(|(name, value)| (name.clone(), value.clone()))
      .collect(),
    _ => Map::new(),
  };
  MaterializedOutputs { results, values }
}

/// Pair declared output names with entries of the raw result, by name for
/// mappings and positionally for sequences.
fn pair_outputs(
  raw: &Value,
  outputs: &IndexMap<String, OutputDecl>,
) -> Result<Vec<(String, Value)>, StageError> {
  match raw {
    Value::Object(map) => outputs
      .keys()
      .map(|name| {
        map
          .get(name)
          .map(|value| (name.clone(), value.clone()))
          .ok_or_else(|| StageError::OutputMapping {
            name: name.clone(),
            message: "result has no entry for declared output".to_string(),
          })
      })
      .collect(),
    Value::Array(items) => {
      if items.len() != outputs.len() {
        return Err(StageError::OutputMapping {
          name: "result".to_string(),
          message: format!(
            "{} outputs declared but result has {} entries",
            outputs.len(),
            items.len()
          ),
        });
      }
      Ok(
        outputs
          .keys()
          .cloned()
          .zip(items.iter().cloned())
          .collect(),
      )
    }
    Value::Null => Err(StageError::OutputMapping {
      name: "result".to_string(),
      message: format!(
        "{} outputs declared but the function returned no result",
        outputs.len()
      ),
    }),
    single => {
      if outputs.len() == 1 {
        let name = outputs.keys().next().cloned().unwrap_or_default();
        Ok(vec![(name, single.clone())])
      } else {
        Err(StageError::OutputMapping {
          name: "result".to_string(),
          message: format!(
            "{} outputs declared but result is a single value",
            outputs.len()
          ),
        })
      }
    }
  }
}

fn extract_values(raw: &Value, declared_values: &[String]) -> Map<String, Value> {
  let mut values = Map::new();
  if let Value::Object(map) = raw {
    for name in declared_values {
      if let Some(value) = map.get(name) {
        values.insert(name.clone(), value.clone());
      }
    }
  }
  values
}
