//! Function resolution.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use runbridge_spec::SourceSpec;
use tracing::info;

use crate::error::ResolveError;
use crate::handler::ResolvedFunction;

/// Contract for the external collaborator that turns a run's source spec
/// into a callable function (plus optional init function).
#[async_trait]
pub trait FunctionResolver: Send + Sync {
  async fn resolve(
    &self,
    source: &SourceSpec,
    search_path: &Path,
  ) -> Result<ResolvedFunction, ResolveError>;
}

/// In-process resolver backed by a name -> function registry.
///
/// Embedders register their functions at startup; the search path is unused
/// because nothing is loaded from disk.
pub struct RegistryResolver {
  functions: RwLock<HashMap<String, ResolvedFunction>>,
}

impl RegistryResolver {
  pub fn new() -> Self {
    Self {
      functions: RwLock::new(HashMap::new()),
    }
  }

  /// Register a function under an entry-point name.
  pub fn register(&self, handler: impl Into<String>, function: ResolvedFunction) {
    let handler = handler.into();
    info!(handler = %handler, "registered function");
    let mut functions = self.functions.write().unwrap_or_else(|e| e.into_inner());
    functions.insert(handler, function);
  }
}

impl Default for RegistryResolver {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl FunctionResolver for RegistryResolver {
  async fn resolve(
    &self,
    source: &SourceSpec,
    _search_path: &Path,
  ) -> Result<ResolvedFunction, ResolveError> {
    let functions = self.functions.read().unwrap_or_else(|e| e.into_inner());
    functions
      .get(&source.handler)
      .cloned()
      .ok_or_else(|| ResolveError::NotFound {
        handler: source.handler.clone(),
      })
  }
}
