//! Dashboard command options and their validation.
//!
//! Raw options come straight from the command line. `validate` turns them into
//! `ValidatedOptions` without touching the network, so a bad value never
//! reaches the tunnel or the cluster.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::{KubeContext, PresentationMode};
use crate::error::{Error, Result};

/// Namespace the control plane is installed into by default.
pub const DEFAULT_NAMESPACE: &str = "linkerd";

/// Raw, unvalidated options for a dashboard session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardOptions {
    /// Local proxy port. `0` picks a random free port.
    #[serde(default)]
    pub port: i64,

    /// One of `linkerd`, `grafana`, `url`.
    #[serde(default = "default_show")]
    pub show: String,

    /// Namespace of the control plane.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Direct control-plane API address, bypassing the API server.
    #[serde(default)]
    pub api_addr: Option<String>,

    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,

    #[serde(default)]
    pub context: Option<String>,
}

fn default_show() -> String {
    PresentationMode::default().as_str().to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            port: 0,
            show: default_show(),
            namespace: default_namespace(),
            api_addr: None,
            kubeconfig: None,
            context: None,
        }
    }
}

/// Options that passed validation. Immutable for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOptions {
    pub port: u16,
    pub mode: PresentationMode,
    pub namespace: String,
    pub api_addr: Option<String>,
    pub cluster: KubeContext,
}

impl DashboardOptions {
    /// Check every option. Performs no I/O.
    pub fn validate(&self) -> Result<ValidatedOptions> {
        if self.port < 0 {
            return Err(Error::ConfigInvalid(format!(
                "port must be greater than or equal to zero, was {}",
                self.port
            )));
        }
        let port = u16::try_from(self.port).map_err(|_| {
            Error::ConfigInvalid(format!("port must be at most {}, was {}", u16::MAX, self.port))
        })?;

        let mode = self.show.parse::<PresentationMode>()?;

        if self.namespace.trim().is_empty() {
            return Err(Error::ConfigInvalid("namespace must not be empty".to_string()));
        }

        let api_addr = self
            .api_addr
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(str::to_string);

        Ok(ValidatedOptions {
            port,
            mode,
            namespace: self.namespace.clone(),
            api_addr,
            cluster: KubeContext {
                kubeconfig: self.kubeconfig.clone(),
                context: self.context.clone(),
            },
        })
    }
}
