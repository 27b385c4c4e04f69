//! Function invocation.

use runbridge_function::{ArgMap, FunctionHandler};
use serde_json::Value;
use tracing::info;

use crate::error::StageError;

/// Invoke the user function with composed arguments.
///
/// The calling convention follows the handler's declared marker: wrapped
/// functions receive the project name and run key ahead of their arguments,
/// plain functions receive only the arguments. Any error raised by the user
/// function propagates unchanged; recovery is the orchestrator's decision.
pub fn invoke(
  function: &FunctionHandler,
  args: &ArgMap,
  project: &str,
  run_key: &str,
) -> Result<Value, StageError> {
  info!(
    convention = ?function.calling_convention(),
    args = args.len(),
    "invoking user function"
  );

  let result = match function {
    FunctionHandler::Wrapped(f) => f(project, run_key, args),
    FunctionHandler::Plain(f) => f(args),
  };

  result.map_err(|source| StageError::Execution { source })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn args_with_x(x: i64) -> ArgMap {
    let mut args = ArgMap::new();
    args.insert("x".into(), json!(x));
    args
  }

  #[test]
  fn plain_functions_receive_only_their_arguments() {
    let function = FunctionHandler::plain(|args| Ok(json!(args["x"].as_i64().unwrap() * 2)));
    let raw = invoke(&function, &args_with_x(5), "p1", "store://p1/runs/r1").unwrap();
    assert_eq!(raw, json!(10));
  }

  #[test]
  fn wrapped_functions_receive_project_and_run_key() {
    let function = FunctionHandler::wrapped(|project, run_key, _| {
      Ok(json!({ "project": project, "run_key": run_key }))
    });
    let raw = invoke(&function, &ArgMap::new(), "p1", "store://p1/runs/r1").unwrap();
    assert_eq!(raw["project"], json!("p1"));
    assert_eq!(raw["run_key"], json!("store://p1/runs/r1"));
  }

  #[test]
  fn user_errors_propagate_as_execution_errors() {
    let function = FunctionHandler::plain(|_| Err(anyhow::anyhow!("bad input")));
    let err = invoke(&function, &ArgMap::new(), "p1", "k").unwrap_err();
    assert!(matches!(err, StageError::Execution { .. }));
    assert!(err.response_message().contains("bad input"));
  }
}
