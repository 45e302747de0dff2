//! Kubernetes API server self-check via kubectl.

use serde::Deserialize;
use tracing::debug;

use super::kubectl::{KubectlDiscovery, KubectlError};
use crate::domain::{CheckResult, KubeContext};
use crate::ports::ClusterApiPort;

/// Oldest Kubernetes version the control plane supports.
pub const MIN_KUBERNETES_VERSION: (u32, u32) = (1, 16);

const KUBECTL_CHECK: &str = "kubectl-binary";
const CONFIG_CHECK: &str = "kubernetes-api-config";
const QUERY_CHECK: &str = "kubernetes-api-query";
const VERSION_CHECK: &str = "kubernetes-version";

/// Cluster self-check backed by kubectl.
#[derive(Debug, Clone)]
pub struct KubectlClusterApi {
    discovery: KubectlDiscovery,
    cluster: KubeContext,
}

impl KubectlClusterApi {
    pub fn new(discovery: KubectlDiscovery, cluster: KubeContext) -> Self {
        Self { discovery, cluster }
    }

    async fn check_config(&self) -> CheckResult {
        let description = "can load the kubeconfig";
        match self
            .discovery
            .execute(&self.cluster, &["config", "current-context"])
            .await
        {
            Ok(context) => {
                debug!(context = context.trim(), "Using kubeconfig context");
                CheckResult::ok(CONFIG_CHECK, description)
            }
            Err(e) => CheckResult::fail(
                CONFIG_CHECK,
                description,
                format!("Error loading kubeconfig: {e}"),
            ),
        }
    }

    async fn query_version(&self) -> Result<ServerVersion, CheckResult> {
        let description = "can query the Kubernetes API";
        let fail = |e: KubectlError| {
            let message = if e.is_cluster_not_connected() {
                format!("Error connecting to the Kubernetes API server: {e}")
            } else {
                format!("Error querying the Kubernetes API: {e}")
            };
            CheckResult::fail(QUERY_CHECK, description, message)
        };

        let output = self
            .discovery
            .execute(
                &self.cluster,
                &["version", "-o", "json", "--request-timeout=10s"],
            )
            .await
            .map_err(fail)?;

        let response: VersionResponse = serde_json::from_str(&output)
            .map_err(|e| fail(KubectlError::ParsingFailed(e.to_string())))?;

        response.server_version.ok_or_else(|| {
            fail(KubectlError::ParsingFailed(
                "response carried no server version".to_string(),
            ))
        })
    }
}

impl ClusterApiPort for KubectlClusterApi {
    async fn self_check(&self) -> Vec<CheckResult> {
        let mut results = Vec::with_capacity(4);

        if !self.discovery.is_kubectl_available() {
            results.push(CheckResult::fail(
                KUBECTL_CHECK,
                "can find kubectl",
                "kubectl not found in PATH or common install locations",
            ));
            return results;
        }
        results.push(CheckResult::ok(KUBECTL_CHECK, "can find kubectl"));

        let config = self.check_config().await;
        let config_ok = config.is_ok();
        results.push(config);
        if !config_ok {
            return results;
        }

        let version = match self.query_version().await {
            Ok(version) => version,
            Err(failure) => {
                results.push(failure);
                return results;
            }
        };
        results.push(CheckResult::ok(QUERY_CHECK, "can query the Kubernetes API"));
        results.push(check_version(&version));

        results
    }
}

/// `kubectl version -o json` output.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionResponse {
    server_version: Option<ServerVersion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerVersion {
    major: String,
    minor: String,
    #[serde(default)]
    git_version: String,
}

impl ServerVersion {
    /// Managed clusters report minors like `"27+"`.
    fn parsed(&self) -> Option<(u32, u32)> {
        let number = |s: &str| {
            s.chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
                .parse::<u32>()
                .ok()
        };
        Some((number(&self.major)?, number(&self.minor)?))
    }
}

fn check_version(version: &ServerVersion) -> CheckResult {
    let description = "is running the minimum Kubernetes API version";
    let (min_major, min_minor) = MIN_KUBERNETES_VERSION;
    match version.parsed() {
        Some(parsed) if parsed >= MIN_KUBERNETES_VERSION => {
            CheckResult::ok(VERSION_CHECK, description)
        }
        Some(_) => CheckResult::fail(
            VERSION_CHECK,
            description,
            format!(
                "Kubernetes is on version {}, but version {min_major}.{min_minor} or more recent is required",
                version.git_version
            ),
        ),
        None => CheckResult::fail(
            VERSION_CHECK,
            description,
            format!(
                "Could not parse Kubernetes version {}.{}",
                version.major, version.minor
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(major: &str, minor: &str) -> ServerVersion {
        ServerVersion {
            major: major.to_string(),
            minor: minor.to_string(),
            git_version: format!("v{major}.{minor}"),
        }
    }

    #[test]
    fn test_check_version() {
        assert!(check_version(&version("1", "27+")).is_ok());
        assert!(check_version(&version("1", "16")).is_ok());
        assert!(check_version(&version("2", "0")).is_ok());

        let old = check_version(&version("1", "15"));
        assert!(!old.is_ok());
        assert!(old.friendly_message_to_user.contains("1.16 or more recent"));

        assert!(!check_version(&version("", "x")).is_ok());
    }

    #[tokio::test]
    async fn test_missing_kubectl_fails_first_check() {
        let api = KubectlClusterApi::new(KubectlDiscovery::with_path(None), KubeContext::default());
        let results = api.self_check().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].subsystem_name, KUBECTL_CHECK);
        assert!(!results[0].is_ok());
    }

    #[cfg(unix)]
    mod process {
        use super::super::*;
        use crate::adapters::kubectl::testing::fake_kubectl;

        const HEALTHY: &str = r#"
case "$1" in
  config) echo "kind-dev" ;;
  version) echo '{"clientVersion":{"major":"1","minor":"29"},"serverVersion":{"major":"1","minor":"28","gitVersion":"v1.28.2"}}' ;;
esac"#;

        #[tokio::test]
        async fn test_healthy_cluster() {
            let (_dir, path) = fake_kubectl(HEALTHY);
            let api = KubectlClusterApi::new(
                KubectlDiscovery::with_path(Some(path)),
                KubeContext::default(),
            );

            let results = api.self_check().await;
            let names: Vec<_> = results.iter().map(|r| r.subsystem_name.as_str()).collect();
            assert_eq!(names, [KUBECTL_CHECK, CONFIG_CHECK, QUERY_CHECK, VERSION_CHECK]);
            assert!(results.iter().all(CheckResult::is_ok));
        }

        #[tokio::test]
        async fn test_unreachable_api_server_stops_checks() {
            let (_dir, path) = fake_kubectl(
                r#"
case "$1" in
  config) echo "kind-dev" ;;
  version) echo 'Unable to connect to the server: dial tcp 127.0.0.1:6443: connect: connection refused' >&2; exit 1 ;;
esac"#,
            );
            let api = KubectlClusterApi::new(
                KubectlDiscovery::with_path(Some(path)),
                KubeContext::default(),
            );

            let results = api.self_check().await;
            assert_eq!(results.len(), 3);
            let last = results.last().unwrap();
            assert_eq!(last.subsystem_name, QUERY_CHECK);
            assert!(last
                .friendly_message_to_user
                .starts_with("Error connecting to the Kubernetes API server"));
        }
    }
}
