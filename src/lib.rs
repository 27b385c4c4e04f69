//! Runbridge - the execution bridge between a serverless event host and a
//! user-supplied function tracked by an orchestration platform.
//!
//! One inbound event maps to one tracked run. The bridge composes the
//! function's arguments from the run specification, invokes the function
//! with the calling convention it declares, materializes its outputs into
//! registry-tracked artifacts, and persists a run status record - closing
//! the execution window on every exit path.
//!
//! The workspace crates:
//! - [`spec`]: serializable run/event/status domain types
//! - [`function`]: the user-function abstraction and resolution contract
//! - [`store`]: run-record and artifact-registry collaborators
//! - [`executor`]: the pipeline stages and the orchestrator
//! - [`host`]: startup configuration and the event-handler surface

pub use runbridge_executor as executor;
pub use runbridge_function as function;
pub use runbridge_host as host;
pub use runbridge_spec as spec;
pub use runbridge_store as store;

pub use runbridge_executor::{Orchestrator, OrchestratorConfig, StageError};
pub use runbridge_host::{Host, HostConfig};
pub use runbridge_spec::{Event, Response, RunRecord, RunSpec, RunStatus};
