//! How the control plane's API is reached.

use std::path::PathBuf;

/// Cluster access settings shared by every kubectl invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubeContext {
    /// Explicit kubeconfig path. kubectl's own default applies when unset.
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context name. The current context applies when unset.
    pub context: Option<String>,
}

impl KubeContext {
    /// Global kubectl arguments selecting this cluster.
    pub fn kubectl_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(path) = &self.kubeconfig {
            args.push(format!("--kubeconfig={}", path.display()));
        }
        if let Some(context) = &self.context {
            args.push(format!("--context={context}"));
        }
        args
    }
}

/// Reachability to the control plane's API.
///
/// Exactly one variant is chosen per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterEndpoint {
    /// A known network address, no cluster mediation.
    Direct { address: String },
    /// Reached through the Kubernetes API server's service proxy.
    Proxied {
        cluster: KubeContext,
        namespace: String,
    },
}

impl ClusterEndpoint {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::Proxied { .. } => "proxied",
        }
    }
}
