//! Execution context initialization and event dispatch.

use std::sync::Arc;

use runbridge_executor::{ExecutionTracker, Orchestrator, OrchestratorConfig, StageError, compose_init};
use runbridge_function::{FunctionResolver, ResolveError, ResolvedFunction};
use runbridge_spec::{CallContext, Event, Response, RunRecord, SourceSpec};
use runbridge_store::{ArtifactRegistry, RunStore, StoreError};
use tracing::info;

use crate::config::HostConfig;
use crate::provision::{ProvisionError, Provisioner};

/// Entry point resolved when the run spec does not name one.
const DEFAULT_HANDLER: &str = "handler";

/// Errors during context initialization.
///
/// Initialization failures happen before any invocation is accepted; per-event
/// failures are converted to responses instead.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
  #[error("configuration error: {0}")]
  Config(#[from] crate::config::ConfigError),

  #[error("registry error: {0}")]
  Store(#[from] StoreError),

  #[error("function resolution error: {0}")]
  Resolve(#[from] ResolveError),

  #[error("provisioning error: {0}")]
  Provision(#[from] ProvisionError),

  #[error("init composition error: {0}")]
  InitCompose(#[from] StageError),

  #[error("user init function raised: {source}")]
  Init { source: anyhow::Error },

  #[error("failed to create working root: {0}")]
  Root(#[from] std::io::Error),
}

/// The immutable execution context, constructed once at initialization.
#[derive(Clone)]
pub struct ExecutionContext {
  pub config: HostConfig,
  pub run: RunRecord,
  pub function: ResolvedFunction,
  pub call: CallContext,
  pub tracker: Arc<ExecutionTracker>,
}

/// An initialized host: execution context plus the orchestrator that serves
/// inbound events for it.
pub struct Host {
  context: ExecutionContext,
  orchestrator: Orchestrator,
}

impl std::fmt::Debug for Host {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Host").finish_non_exhaustive()
  }
}

impl Host {
  /// Initialize the execution context: fetch the run, resolve the user
  /// function, provision requirements and execute the user init function.
  pub async fn init(
    config: HostConfig,
    store: Arc<dyn RunStore>,
    artifacts: Arc<dyn ArtifactRegistry>,
    resolver: &dyn FunctionResolver,
    provisioner: &dyn Provisioner,
    orchestrator_config: OrchestratorConfig,
  ) -> Result<Self, HostError> {
    info!(project = %config.project, run_id = %config.run_id, "initializing execution context");

    tokio::fs::create_dir_all(&config.root).await?;

    let run = store.get_run(&config.project, &config.run_id).await?;

    let source = run.spec.source.clone().unwrap_or_else(|| SourceSpec {
      handler: DEFAULT_HANDLER.to_string(),
      source: None,
    });
    let function = resolver.resolve(&source, &config.root).await?;

    if config.provision && !run.spec.requirements.is_empty() {
      provisioner.provision(&run.spec.requirements).await?;
    }

    let call = CallContext {
      project: run.project.clone(),
      run_id: run.id.clone(),
      run_key: run.key.clone(),
      root: config.root.clone(),
    };

    if let Some(init) = &function.init {
      info!("executing user init function");
      let args = compose_init(&init.signature, &run.spec.init_parameters, &call)?;
      (init.handler)(&args).map_err(|source| HostError::Init { source })?;
    }

    let tracker = Arc::new(ExecutionTracker::new());
    let orchestrator = Orchestrator::new(
      store,
      artifacts,
      function.clone(),
      run.clone(),
      call.clone(),
      Arc::clone(&tracker),
      orchestrator_config,
    );

    info!("execution context initialized");
    Ok(Self {
      context: ExecutionContext {
        config,
        run,
        function,
        call,
        tracker,
      },
      orchestrator,
    })
  }

  /// Handle one inbound event through the run-execution lifecycle.
  pub async fn handle(&self, event: &Event) -> Response {
    self.orchestrator.handle(event).await
  }

  /// Serve-mode dispatch: return the user function's raw result.
  pub async fn serve(&self, event: &Event) -> Response {
    self.orchestrator.serve(event).await
  }

  /// The immutable execution context.
  pub fn context(&self) -> &ExecutionContext {
    &self.context
  }
}
