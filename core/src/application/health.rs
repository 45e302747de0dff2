//! Confirms the control plane itself is ready to serve.

use tracing::debug;

use crate::domain::first_failure;
use crate::error::{Error, Result};
use crate::ports::ApiClientPort;

/// Runs the control-plane self-check and folds it into pass/fail.
#[derive(Debug, Clone)]
pub struct HealthVerifier {
    namespace: String,
}

impl HealthVerifier {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
        }
    }

    /// Issues one self-check request.
    ///
    /// A transport failure is returned as-is (`ControlPlaneUnreachable` from the
    /// shipped clients). The first non-OK entry becomes `ControlPlaneUnavailable`;
    /// entries after it are not looked at. No entries at all is a pass.
    pub async fn verify<C: ApiClientPort>(&self, client: &C) -> Result<()> {
        let results = client.self_check().await?;

        if let Some(failure) = first_failure(&results) {
            return Err(Error::ControlPlaneUnavailable {
                namespace: self.namespace.clone(),
                subsystem: failure.subsystem_name.clone(),
                message: failure.friendly_message_to_user.clone(),
            });
        }

        debug!(checks = results.len(), "Control-plane self-check passed");
        Ok(())
    }
}
