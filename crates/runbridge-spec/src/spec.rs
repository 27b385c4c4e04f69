use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where the user function's entry point comes from.
///
/// The actual loading of function source is owned by the function-resolution
/// collaborator; this type only names what to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
  /// Name of the entry point to resolve, e.g. "handler".
  pub handler: String,

  /// Optional inline source text for resolvers that support it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
}

/// Declared kind of a named output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
  #[default]
  Artifact,
  Dataitem,
  Model,
}

/// Declaration of a single named output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputDecl {
  #[serde(default)]
  pub kind: OutputKind,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// The run specification: what to execute and how to map its inputs and
/// outputs. Supplied once per run; read-only during execution.
///
/// Declaration maps preserve insertion order because outputs may be matched
/// positionally against the function's raw result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
  /// Declared inputs: argument name -> artifact reference.
  #[serde(default)]
  pub inputs: IndexMap<String, String>,

  /// Declared parameters: argument name -> literal value.
  #[serde(default)]
  pub parameters: IndexMap<String, Value>,

  /// Declared outputs: output name -> declaration.
  #[serde(default)]
  pub outputs: IndexMap<String, OutputDecl>,

  /// Declared scalar result names, extracted into a separate values channel.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub values: Vec<String>,

  /// Dependencies to provision before any invocation is accepted.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub requirements: Vec<String>,

  /// Literal parameters for the user init function.
  #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
  pub init_parameters: serde_json::Map<String, Value>,

  /// Source of the user function entry point.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<SourceSpec>,
}
