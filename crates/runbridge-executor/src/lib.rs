//! Runbridge Executor
//!
//! The run-execution pipeline: the sequence of operations from "event
//! received" to "run status persisted".
//!
//! The [`Orchestrator`] sequences five stages per inbound event:
//! 1. Input composition ([`compose_inputs`])
//! 2. Function invocation ([`invoke`])
//! 3. Output materialization ([`materialize`])
//! 4. Status building ([`build_status`])
//! 5. Finalization ([`Finalizer`])
//!
//! Any stage failure transitions the invocation to its terminal failed state
//! and is converted into a uniform 500 response; the execution window is
//! closed and a best-effort error status is persisted on every failure path.

mod compose;
mod error;
mod finalize;
mod invoke;
mod orchestrator;
mod outputs;
mod status;

pub use compose::{compose_init, compose_inputs};
pub use error::StageError;
pub use finalize::{ExecutionTicket, ExecutionTracker, Finalizer};
pub use invoke::invoke;
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use outputs::{MaterializedOutputs, fold_registered, materialize};
pub use status::build_status;
