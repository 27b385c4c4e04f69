//! Dependency provisioning.
//!
//! Installing dependencies is a process-wide mutation, so it runs exactly
//! once at context initialization, never inside the per-event hot path.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Errors installing declared requirements.
#[derive(Debug, Error)]
pub enum ProvisionError {
  #[error("failed to provision '{requirement}': {message}")]
  Install { requirement: String, message: String },
}

/// Contract for the environment-provisioning collaborator.
#[async_trait]
pub trait Provisioner: Send + Sync {
  async fn provision(&self, requirements: &[String]) -> Result<(), ProvisionError>;
}

/// Provisioner for environments where dependencies are pre-baked; accepts
/// every requirement list and only logs it.
pub struct NoopProvisioner;

#[async_trait]
impl Provisioner for NoopProvisioner {
  async fn provision(&self, requirements: &[String]) -> Result<(), ProvisionError> {
    info!(requirements = ?requirements, "environment is pre-provisioned, nothing to install");
    Ok(())
  }
}
