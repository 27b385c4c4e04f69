//! Input composition.
//!
//! Maps the run spec's declared inputs and parameters, plus the inbound
//! event, into the argument mapping the user function's signature accepts.
//! Declared inputs are materialized through the artifact registry; the
//! execution context and the event itself are injected by name when the
//! signature asks for them and nothing else supplies them.

use runbridge_function::{ArgMap, FunctionSignature, InputCoercion, Param, ParamBinding};
use runbridge_spec::{CallContext, Event, RunSpec};
use runbridge_store::{ArtifactHandle, ArtifactRegistry};
use serde_json::Value;
use tracing::warn;

use crate::error::StageError;

/// Compose the arguments for one invocation of the user function.
pub async fn compose_inputs(
  spec: &RunSpec,
  signature: &FunctionSignature,
  project: &str,
  registry: &dyn ArtifactRegistry,
  ctx: &CallContext,
  event: &Event,
) -> Result<ArgMap, StageError> {
  let mut args = ArgMap::new();

  // Declared inputs: resolve the reference, then coerce to what the
  // signature expects.
  for (name, reference) in &spec.inputs {
    let Some(param) = signature.param(name) else {
      warn!(input = %name, "declared input has no matching function parameter, skipping");
      continue;
    };

    let handle =
      registry
        .resolve_input(project, reference)
        .await
        .map_err(|e| StageError::InputResolution {
          name: name.clone(),
          message: e.to_string(),
        })?;

    args.insert(name.clone(), coerce_handle(name, &handle, param)?);
  }

  // Declared parameters: bind the literal value directly.
  for (name, value) in &spec.parameters {
    if signature.param(name).is_none() {
      warn!(parameter = %name, "declared parameter has no matching function parameter, skipping");
      continue;
    }
    args.insert(name.clone(), value.clone());
  }

  // Remaining signature parameters: inject context/event, reject missing
  // required data.
  for param in &signature.params {
    if args.contains_key(&param.name) {
      continue;
    }
    match param.binding {
      ParamBinding::Context => {
        args.insert(param.name.clone(), context_value(&param.name, ctx)?);
      }
      ParamBinding::Event => {
        let body = event
          .body_json()
          .map_err(|e| StageError::InputResolution {
            name: param.name.clone(),
            message: e.to_string(),
          })?;
        args.insert(param.name.clone(), body);
      }
      ParamBinding::Data(_) if param.required => {
        return Err(StageError::InputResolution {
          name: param.name.clone(),
          message: "required parameter has no matching input, parameter or injectable default"
            .to_string(),
        });
      }
      ParamBinding::Data(_) => {}
    }
  }

  Ok(args)
}

/// Compose the arguments for the user init function.
///
/// Init has no declared inputs and no event; only literal init parameters
/// and context injection apply.
pub fn compose_init(
  signature: &FunctionSignature,
  init_parameters: &serde_json::Map<String, Value>,
  ctx: &CallContext,
) -> Result<ArgMap, StageError> {
  let mut args = ArgMap::new();

  for (name, value) in init_parameters {
    if signature.param(name).is_none() {
      warn!(parameter = %name, "init parameter has no matching function parameter, skipping");
      continue;
    }
    args.insert(name.clone(), value.clone());
  }

  for param in &signature.params {
    if args.contains_key(&param.name) {
      continue;
    }
    match param.binding {
      ParamBinding::Context => {
        args.insert(param.name.clone(), context_value(&param.name, ctx)?);
      }
      ParamBinding::Data(_) if param.required => {
        return Err(StageError::InputResolution {
          name: param.name.clone(),
          message: "required init parameter has no declared value".to_string(),
        });
      }
      _ => {}
    }
  }

  Ok(args)
}

fn context_value(name: &str, ctx: &CallContext) -> Result<Value, StageError> {
  serde_json::to_value(ctx).map_err(|e| StageError::InputResolution {
    name: name.to_string(),
    message: e.to_string(),
  })
}

fn coerce_handle(name: &str, handle: &ArtifactHandle, param: &Param) -> Result<Value, StageError> {
  let coercion = match param.binding {
    ParamBinding::Data(coercion) => coercion,
    // A declared input explicitly targeting a context/event parameter
    // overrides injection; bind the materialized value.
    ParamBinding::Context | ParamBinding::Event => InputCoercion::Value,
  };

  match coercion {
    InputCoercion::Value => Ok(handle.value.clone()),
    InputCoercion::Handle => {
      serde_json::to_value(handle).map_err(|e| StageError::InputResolution {
        name: name.to_string(),
        message: e.to_string(),
      })
    }
    InputCoercion::Path => match &handle.local_path {
      Some(path) => Ok(Value::String(path.display().to_string())),
      None => Err(StageError::InputResolution {
        name: name.to_string(),
        message: format!("artifact '{}' has no local materialization", handle.reference),
      }),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use runbridge_spec::RunSpec;
  use runbridge_store::MemoryStore;
  use serde_json::json;
  use std::collections::BTreeSet;
  use std::path::PathBuf;

  fn ctx() -> CallContext {
    CallContext {
      project: "p1".to_string(),
      run_id: "r1".to_string(),
      run_key: "store://p1/runs/r1".to_string(),
      root: PathBuf::from("/shared"),
    }
  }

  fn event() -> Event {
    Event::structured(json!({ "project": "p1", "run": "r1" }))
  }

  fn spec(value: serde_json::Value) -> RunSpec {
    serde_json::from_value(value).unwrap()
  }

  #[tokio::test]
  async fn composed_keys_cover_the_required_data_parameters() {
    let store = MemoryStore::new();
    store.put_artifact("p1", "store://p1/data/train", json!([1, 2, 3]));

    let spec = spec(json!({
      "inputs": { "train": "store://p1/data/train" },
      "parameters": { "epochs": 3 }
    }));
    let signature = FunctionSignature::new(vec![Param::data("train"), Param::data("epochs")]);

    let args = compose_inputs(&spec, &signature, "p1", &store, &ctx(), &event())
      .await
      .unwrap();

    let keys: BTreeSet<&str> = args.keys().map(String::as_str).collect();
    let required: BTreeSet<&str> = signature.required_data_params().collect();
    assert_eq!(keys, required);
    assert_eq!(args["train"], json!([1, 2, 3]));
    assert_eq!(args["epochs"], json!(3));
  }

  #[tokio::test]
  async fn context_and_event_are_injected_by_name() {
    let store = MemoryStore::new();
    let spec = RunSpec::default();
    let signature = FunctionSignature::new(vec![Param::context("context"), Param::event("event")]);

    let args = compose_inputs(&spec, &signature, "p1", &store, &ctx(), &event())
      .await
      .unwrap();

    assert_eq!(args["context"]["project"], json!("p1"));
    assert_eq!(args["context"]["run_key"], json!("store://p1/runs/r1"));
    assert_eq!(args["event"]["run"], json!("r1"));
  }

  #[tokio::test]
  async fn a_declared_parameter_beats_injection() {
    let store = MemoryStore::new();
    let spec = spec(json!({ "parameters": { "event": "literal" } }));
    let signature = FunctionSignature::new(vec![Param::event("event")]);

    let args = compose_inputs(&spec, &signature, "p1", &store, &ctx(), &event())
      .await
      .unwrap();
    assert_eq!(args["event"], json!("literal"));
  }

  #[tokio::test]
  async fn unresolvable_input_fails_resolution() {
    let store = MemoryStore::new();
    let spec = spec(json!({ "inputs": { "train": "store://p1/missing" } }));
    let signature = FunctionSignature::new(vec![Param::data("train")]);

    let err = compose_inputs(&spec, &signature, "p1", &store, &ctx(), &event())
      .await
      .unwrap_err();
    assert!(matches!(err, StageError::InputResolution { name, .. } if name == "train"));
  }

  #[tokio::test]
  async fn missing_required_parameter_fails_resolution() {
    let store = MemoryStore::new();
    let spec = RunSpec::default();
    let signature = FunctionSignature::new(vec![Param::data("x")]);

    let err = compose_inputs(&spec, &signature, "p1", &store, &ctx(), &event())
      .await
      .unwrap_err();
    assert!(matches!(err, StageError::InputResolution { name, .. } if name == "x"));
  }

  #[tokio::test]
  async fn optional_parameters_are_simply_omitted() {
    let store = MemoryStore::new();
    let signature = FunctionSignature::new(vec![Param::optional("x")]);

    let args = compose_inputs(&RunSpec::default(), &signature, "p1", &store, &ctx(), &event())
      .await
      .unwrap();
    assert!(args.is_empty());
  }

  #[tokio::test]
  async fn path_coercion_requires_a_local_materialization() {
    let store = MemoryStore::new();
    store.put_artifact_at(
      "p1",
      "store://p1/data/model",
      json!(null),
      Some(PathBuf::from("/shared/model.bin")),
    );
    store.put_artifact("p1", "store://p1/data/raw", json!(null));

    let spec = spec(json!({ "inputs": { "model": "store://p1/data/model" } }));
    let signature =
      FunctionSignature::new(vec![Param::data_as("model", InputCoercion::Path)]);
    let args = compose_inputs(&spec, &signature, "p1", &store, &ctx(), &event())
      .await
      .unwrap();
    assert_eq!(args["model"], json!("/shared/model.bin"));

    let spec = spec_without_path();
    let signature = FunctionSignature::new(vec![Param::data_as("raw", InputCoercion::Path)]);
    let err = compose_inputs(&spec, &signature, "p1", &store, &ctx(), &event())
      .await
      .unwrap_err();
    assert!(matches!(err, StageError::InputResolution { name, .. } if name == "raw"));
  }

  fn spec_without_path() -> RunSpec {
    serde_json::from_value(json!({ "inputs": { "raw": "store://p1/data/raw" } })).unwrap()
  }

  #[tokio::test]
  async fn handle_coercion_binds_the_full_handle() {
    let store = MemoryStore::new();
    store.put_artifact("p1", "store://p1/data/train", json!(42));

    let spec = spec(json!({ "inputs": { "train": "store://p1/data/train" } }));
    let signature =
      FunctionSignature::new(vec![Param::data_as("train", InputCoercion::Handle)]);
    let args = compose_inputs(&spec, &signature, "p1", &store, &ctx(), &event())
      .await
      .unwrap();

    assert_eq!(args["train"]["reference"], json!("store://p1/data/train"));
    assert_eq!(args["train"]["value"], json!(42));
  }

  #[test]
  fn init_composition_binds_literals_and_context() {
    let signature =
      FunctionSignature::new(vec![Param::data("threshold"), Param::context("context")]);
    let mut init_parameters = serde_json::Map::new();
    init_parameters.insert("threshold".into(), json!(0.5));

    let args = compose_init(&signature, &init_parameters, &ctx()).unwrap();
    assert_eq!(args["threshold"], json!(0.5));
    assert_eq!(args["context"]["run_id"], json!("r1"));
  }

  #[test]
  fn init_composition_rejects_missing_required_parameters() {
    let signature = FunctionSignature::new(vec![Param::data("threshold")]);
    let err = compose_init(&signature, &serde_json::Map::new(), &ctx()).unwrap_err();
    assert!(matches!(err, StageError::InputResolution { name, .. } if name == "threshold"));
  }
}
