//! Runbridge Spec
//!
//! This crate contains the serializable domain types shared across the
//! runbridge workspace:
//! - The run specification ([`RunSpec`]) supplied once per run and read-only
//!   during execution
//! - The persisted run entity ([`RunRecord`]) and its mutable status
//!   ([`RunStatus`])
//! - The inbound [`Event`] and outbound [`Response`] shapes
//! - The immutable [`CallContext`] injected into platform-aware functions

mod context;
mod event;
mod response;
mod run;
mod spec;
mod status;

pub use context::CallContext;
pub use event::{Event, EventBody, EventError, EventPayload};
pub use response::Response;
pub use run::RunRecord;
pub use spec::{OutputDecl, OutputKind, RunSpec, SourceSpec};
pub use status::{RunState, RunStatus};
