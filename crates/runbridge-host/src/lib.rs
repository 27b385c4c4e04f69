//! Runbridge Host
//!
//! The surface the event-processing host talks to:
//! - [`HostConfig`]: process startup configuration, read and validated once
//!   before any invocation is accepted
//! - [`Provisioner`]: one-time dependency provisioning, outside the
//!   per-event hot path
//! - [`Host`]: the initialized execution context plus the `handle`/`serve`
//!   dispatch entry points

mod config;
mod host;
mod provision;

pub use config::{ConfigError, ENV_PROJECT, ENV_PROVISION, ENV_ROOT, ENV_RUN_ID, HostConfig};
pub use host::{ExecutionContext, Host, HostError};
pub use provision::{NoopProvisioner, ProvisionError, Provisioner};
