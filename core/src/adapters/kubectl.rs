//! kubectl discovery and invocation.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::KubeContext;

/// Well-known install locations checked after `PATH`.
const KUBECTL_PATHS: &[&str] = &[
    "/opt/homebrew/bin/kubectl", // Apple Silicon
    "/usr/local/bin/kubectl",    // Intel Mac / Homebrew
    "/usr/bin/kubectl",          // System
];

#[cfg(windows)]
const KUBECTL_BINARY: &str = "kubectl.exe";
#[cfg(not(windows))]
const KUBECTL_BINARY: &str = "kubectl";

/// Timeout for a single kubectl command.
pub const KUBECTL_TIMEOUT: Duration = Duration::from_secs(15);

/// Failure of a kubectl invocation.
#[derive(Error, Debug)]
pub enum KubectlError {
    #[error("kubectl not found")]
    NotFound,

    #[error("kubectl timed out after {}s", KUBECTL_TIMEOUT.as_secs())]
    Timeout,

    #[error("cluster not reachable: {0}")]
    ClusterNotConnected(String),

    #[error("{0}")]
    CommandFailed(String),

    #[error("kubectl produced invalid output: {0}")]
    ParsingFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl KubectlError {
    /// Classify kubectl's stderr.
    pub fn from_kubectl_error(stderr: &str) -> Self {
        let message = stderr.trim().to_string();
        let lower = message.to_lowercase();
        if lower.contains("connection refused")
            || lower.contains("no configuration has been provided")
            || lower.contains("dial tcp")
            || lower.contains("unable to connect to the server")
            || lower.contains("current-context is not set")
        {
            Self::ClusterNotConnected(message)
        } else {
            Self::CommandFailed(message)
        }
    }

    pub fn is_cluster_not_connected(&self) -> bool {
        matches!(self, Self::ClusterNotConnected(_))
    }
}

/// Locates kubectl and runs it against a cluster.
#[derive(Debug, Clone)]
pub struct KubectlDiscovery {
    kubectl_path: Option<PathBuf>,
}

impl KubectlDiscovery {
    /// Searches `PATH`, then well-known locations.
    pub fn new() -> Self {
        let from_path = std::env::var_os("PATH")
            .map(|paths| {
                std::env::split_paths(&paths)
                    .map(|dir| dir.join(KUBECTL_BINARY))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let kubectl_path = from_path
            .into_iter()
            .chain(KUBECTL_PATHS.iter().map(PathBuf::from))
            .find(|candidate| candidate.is_file());

        Self { kubectl_path }
    }

    /// Uses a fixed kubectl path (or none).
    pub fn with_path(kubectl_path: Option<PathBuf>) -> Self {
        Self { kubectl_path }
    }

    pub fn is_kubectl_available(&self) -> bool {
        self.kubectl_path.is_some()
    }

    /// Builds a kubectl command with the cluster selection arguments applied.
    pub fn command(&self, cluster: &KubeContext) -> Result<Command, KubectlError> {
        let kubectl_path = self.kubectl_path.as_ref().ok_or(KubectlError::NotFound)?;
        let mut command = Command::new(kubectl_path);
        command.args(cluster.kubectl_args());
        Ok(command)
    }

    /// Runs kubectl and returns stdout.
    pub async fn execute(
        &self,
        cluster: &KubeContext,
        args: &[&str],
    ) -> Result<String, KubectlError> {
        self.execute_with_input(cluster, args, None).await
    }

    /// Runs kubectl with `input` written to stdin and returns stdout.
    pub async fn execute_with_input(
        &self,
        cluster: &KubeContext,
        args: &[&str],
        input: Option<&[u8]>,
    ) -> Result<String, KubectlError> {
        let mut command = self.command(cluster)?;
        command
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(?args, "running kubectl");

        let result = timeout(KUBECTL_TIMEOUT, async {
            let mut child = command.spawn()?;
            if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
                stdin.write_all(input).await?;
            }
            child.wait_with_output().await
        })
        .await;

        match result {
            Ok(Ok(output)) => {
                if output.status.success() {
                    String::from_utf8(output.stdout)
                        .map_err(|e| KubectlError::ParsingFailed(e.to_string()))
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(KubectlError::from_kubectl_error(&stderr))
                }
            }
            Ok(Err(e)) => Err(KubectlError::Io(e)),
            Err(_) => Err(KubectlError::Timeout),
        }
    }
}

impl Default for KubectlDiscovery {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kubectl_error_detection() {
        let connection_refused = KubectlError::from_kubectl_error("connection refused");
        assert!(connection_refused.is_cluster_not_connected());

        let no_config = KubectlError::from_kubectl_error("no configuration has been provided");
        assert!(no_config.is_cluster_not_connected());

        let dial_error = KubectlError::from_kubectl_error("dial tcp 127.0.0.1:6443: connect");
        assert!(dial_error.is_cluster_not_connected());

        let other_error = KubectlError::from_kubectl_error("some other error");
        assert!(!other_error.is_cluster_not_connected());
    }

    #[tokio::test]
    async fn test_missing_kubectl() {
        let discovery = KubectlDiscovery::with_path(None);
        assert!(!discovery.is_kubectl_available());
        let err = discovery
            .execute(&KubeContext::default(), &["version"])
            .await
            .unwrap_err();
        assert!(matches!(err, KubectlError::NotFound));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_passes_cluster_args_and_stdin() {
        let (_dir, path) = testing::fake_kubectl(r#"echo "$@"; cat"#);
        let discovery = KubectlDiscovery::with_path(Some(path));
        let cluster = KubeContext {
            kubeconfig: None,
            context: Some("dev".to_string()),
        };

        let out = discovery
            .execute_with_input(&cluster, &["create", "--raw", "/x"], Some(b"{}".as_slice()))
            .await
            .unwrap();
        assert_eq!(out, "--context=dev create --raw /x\n{}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_failure_classifies_stderr() {
        let (_dir, path) = testing::fake_kubectl(
            "echo 'Unable to connect to the server: dial tcp 10.0.0.1:6443' >&2; exit 1",
        );
        let discovery = KubectlDiscovery::with_path(Some(path));
        let err = discovery
            .execute(&KubeContext::default(), &["version"])
            .await
            .unwrap_err();
        assert!(err.is_cluster_not_connected());
    }
}
