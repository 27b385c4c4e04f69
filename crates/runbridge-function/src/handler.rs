use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::signature::FunctionSignature;

/// Composed arguments: parameter name -> resolved value, built fresh per
/// invocation and discarded with it.
pub type ArgMap = serde_json::Map<String, Value>;

type PlainFn = dyn Fn(&ArgMap) -> anyhow::Result<Value> + Send + Sync;
type WrappedFn = dyn Fn(&str, &str, &ArgMap) -> anyhow::Result<Value> + Send + Sync;
type InitFn = dyn Fn(&ArgMap) -> anyhow::Result<()> + Send + Sync;

/// The two calling conventions a user function can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
  /// `f(args)` - the raw return value passes through output materialization.
  Plain,
  /// `f(project, run_key, args)` - the function is platform-aware and
  /// registers its own outputs; its return value is the raw result.
  Wrapped,
}

/// A callable user function carrying its calling-convention marker.
#[derive(Clone)]
pub enum FunctionHandler {
  Plain(Arc<PlainFn>),
  Wrapped(Arc<WrappedFn>),
}

impl FunctionHandler {
  pub fn plain<F>(f: F) -> Self
  where
    F: Fn(&ArgMap) -> anyhow::Result<Value> + Send + Sync + 'static,
  {
    Self::Plain(Arc::new(f))
  }

  pub fn wrapped<F>(f: F) -> Self
  where
    F: Fn(&str, &str, &ArgMap) -> anyhow::Result<Value> + Send + Sync + 'static,
  {
    Self::Wrapped(Arc::new(f))
  }

  /// The convention this function declares.
  pub fn calling_convention(&self) -> CallingConvention {
    match self {
      Self::Plain(_) => CallingConvention::Plain,
      Self::Wrapped(_) => CallingConvention::Wrapped,
    }
  }
}

impl fmt::Debug for FunctionHandler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("FunctionHandler")
      .field(&self.calling_convention())
      .finish()
  }
}

/// An optional user init function, executed once at context initialization.
#[derive(Clone)]
pub struct InitFunction {
  pub handler: Arc<InitFn>,
  pub signature: FunctionSignature,
}

impl InitFunction {
  pub fn new<F>(signature: FunctionSignature, f: F) -> Self
  where
    F: Fn(&ArgMap) -> anyhow::Result<()> + Send + Sync + 'static,
  {
    Self {
      handler: Arc::new(f),
      signature,
    }
  }
}

impl fmt::Debug for InitFunction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InitFunction")
      .field("signature", &self.signature)
      .finish_non_exhaustive()
  }
}

/// A user function resolved and ready to invoke.
#[derive(Debug, Clone)]
pub struct ResolvedFunction {
  pub handler: FunctionHandler,
  pub signature: FunctionSignature,
  pub init: Option<InitFunction>,
}

impl ResolvedFunction {
  pub fn new(handler: FunctionHandler, signature: FunctionSignature) -> Self {
    Self {
      handler,
      signature,
      init: None,
    }
  }

  pub fn with_init(mut self, init: InitFunction) -> Self {
    self.init = Some(init);
    self
  }
}
