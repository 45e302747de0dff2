//! Error types for the meshdash-core library.

use thiserror::Error;

/// Result type alias for meshdash operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can stop a dashboard session.
///
/// None of these are recovered locally. Each one is surfaced to the operator
/// and ends the session.
#[derive(Error, Debug)]
pub enum Error {
    /// A flag or option value is invalid. Raised before any I/O.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// kubectl could not be located.
    #[error("kubectl not found in PATH or common install locations")]
    KubectlNotFound,

    /// The local tunnel could not be created.
    #[error("Failed to initialize proxy: {0}")]
    TunnelInitFailed(String),

    /// A service selector could not be mapped to a local URL.
    #[error("Failed to generate URL for {selector}: {reason}")]
    ResolutionFailed { selector: String, reason: String },

    /// The cluster self-check reported a failing subsystem.
    #[error("Cannot connect to Kubernetes: {message}")]
    ClusterUnreachable { subsystem: String, message: String },

    /// The control-plane self-check request could not be completed.
    #[error("Could not reach the control plane in the \"{namespace}\" namespace: {reason}")]
    ControlPlaneUnreachable { namespace: String, reason: String },

    /// The control plane answered its self-check with a failing subsystem.
    #[error("Control plane in the \"{namespace}\" namespace is not ready ({subsystem}): {message}")]
    ControlPlaneUnavailable {
        namespace: String,
        subsystem: String,
        message: String,
    },

    /// The default browser could not be launched.
    #[error("Failed to open {url} in the default browser: {reason}")]
    BrowserLaunchFailed { url: String, reason: String },

    /// The tunnel stopped serving for a reason other than cancellation.
    #[error("Error running proxy: {0}")]
    ProxyRunFailed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns an operator-facing remediation hint, if one applies.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::KubectlNotFound => {
                Some("Install kubectl and make sure it is on your PATH".to_string())
            }
            Self::ClusterUnreachable { .. } => Some(
                "Check that your kubeconfig points at a reachable cluster (see `kubectl config current-context`)"
                    .to_string(),
            ),
            Self::ControlPlaneUnreachable { namespace, .. } => Some(format!(
                "Linkerd is not running in the \"{namespace}\" namespace\nInstall with: {}",
                install_command(namespace)
            )),
            Self::ControlPlaneUnavailable { namespace, .. } => Some(format!(
                "Wait for the control plane to become ready and try again, or reinstall with: {}",
                install_command(namespace)
            )),
            _ => None,
        }
    }

    /// Whether the error happened before any network activity.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigInvalid(_))
    }
}

/// The command that deploys the control plane into `namespace`.
pub fn install_command(namespace: &str) -> String {
    format!("linkerd install --linkerd-namespace {namespace} | kubectl apply -f -")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_hint_names_install_command() {
        let err = Error::ControlPlaneUnreachable {
            namespace: "mesh".to_string(),
            reason: "connection refused".to_string(),
        };
        let hint = err.hint().unwrap();
        assert!(hint.contains("not running in the \"mesh\" namespace"));
        assert!(hint.contains("linkerd install --linkerd-namespace mesh | kubectl apply -f -"));
    }

    #[test]
    fn test_unavailable_and_unreachable_are_distinct() {
        let unavailable = Error::ControlPlaneUnavailable {
            namespace: "linkerd".to_string(),
            subsystem: "linkerd-api".to_string(),
            message: "not ready".to_string(),
        };
        assert_eq!(
            unavailable.to_string(),
            "Control plane in the \"linkerd\" namespace is not ready (linkerd-api): not ready"
        );
        assert!(unavailable.hint().unwrap().starts_with("Wait for the control plane"));
    }

    #[test]
    fn test_config_error_has_no_hint() {
        let err = Error::ConfigInvalid("bad port".to_string());
        assert!(err.is_config_error());
        assert!(err.hint().is_none());
    }
}
