//! Function resolution errors.

use thiserror::Error;

/// Errors that can occur while resolving a user function.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// No function is registered or loadable under the requested entry point.
  #[error("function not found: '{handler}'")]
  NotFound { handler: String },

  /// The source spec cannot be satisfied by this resolver.
  #[error("invalid function source: {message}")]
  InvalidSource { message: String },
}
