//! Startup configuration.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Environment variable naming the current project.
pub const ENV_PROJECT: &str = "RUNBRIDGE_PROJECT";
/// Environment variable naming the current run identifier.
pub const ENV_RUN_ID: &str = "RUNBRIDGE_RUN_ID";
/// Environment variable overriding the local working root.
pub const ENV_ROOT: &str = "RUNBRIDGE_ROOT";
/// Environment variable toggling dependency provisioning at init.
pub const ENV_PROVISION: &str = "RUNBRIDGE_PROVISION";

const DEFAULT_ROOT: &str = "/shared";

/// Errors validating startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("missing environment variable {0}")]
  MissingVar(&'static str),

  #[error("environment variable {0} is empty")]
  EmptyVar(&'static str),
}

/// Process startup configuration, validated once before any invocation is
/// accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
  /// Project the executing run belongs to.
  pub project: String,

  /// Identifier of the run this context executes.
  pub run_id: String,

  /// Local working root where function source and artifacts live.
  pub root: PathBuf,

  /// Provision declared requirements at context initialization.
  pub provision: bool,
}

impl HostConfig {
  /// Explicit configuration with the default working root.
  pub fn new(project: impl Into<String>, run_id: impl Into<String>) -> Self {
    Self {
      project: project.into(),
      run_id: run_id.into(),
      root: PathBuf::from(DEFAULT_ROOT),
      provision: true,
    }
  }

  /// Read and validate configuration from process-wide variables.
  pub fn from_env() -> Result<Self, ConfigError> {
    let project = required_var(ENV_PROJECT)?;
    let run_id = required_var(ENV_RUN_ID)?;

    let root = env::var(ENV_ROOT)
      .map(PathBuf::from)
      .unwrap_or_else(|_| PathBuf::from(DEFAULT_ROOT));

    let provision = env::var(ENV_PROVISION)
      .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
      .unwrap_or(true);

    Ok(Self {
      project,
      run_id,
      root,
      provision,
    })
  }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
  let value = env::var(name).map_err(|_| ConfigError::MissingVar(name))?;
  if value.trim().is_empty() {
    return Err(ConfigError::EmptyVar(name));
  }
  Ok(value)
}
