//! Runbridge Function
//!
//! The user-function abstraction: what a resolved function looks like to the
//! pipeline, which of the two calling conventions it declares, and the
//! contract for resolving one from a run's source spec.
//!
//! Loading function source is owned by an external collaborator; this crate
//! only defines the [`FunctionResolver`] contract plus an in-process
//! [`RegistryResolver`] for embedders and tests.

mod error;
mod handler;
mod resolver;
mod signature;

pub use error::ResolveError;
pub use handler::{ArgMap, CallingConvention, FunctionHandler, InitFunction, ResolvedFunction};
pub use resolver::{FunctionResolver, RegistryResolver};
pub use signature::{FunctionSignature, InputCoercion, Param, ParamBinding};
