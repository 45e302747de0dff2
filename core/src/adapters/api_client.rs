//! Control-plane API clients.
//!
//! Both variants speak the same self-check contract: `POST .../api/v1/SelfCheck`
//! with an empty JSON body, answered by a `SelfCheckResponse`.

use std::time::Duration;

use tracing::debug;

use super::kubectl::KubectlDiscovery;
use crate::domain::{CheckResult, ClusterEndpoint, KubeContext, SelfCheckResponse, ServiceSelector};
use crate::error::{Error, Result};
use crate::ports::{ApiClientFactory, ApiClientPort};

/// Service fronting the control-plane API.
pub const API_SERVICE: &str = "linkerd-controller-api:http";

/// Path of the self-check method below the API prefix.
const SELF_CHECK_PATH: &str = "api/v1/SelfCheck";

/// Connect timeout for the direct client. The request itself uses the transport default.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to the control plane at a known address.
#[derive(Debug, Clone)]
pub struct DirectApiClient {
    base_url: String,
    namespace: String,
    client: reqwest::Client,
}

impl DirectApiClient {
    pub fn new(address: &str, namespace: &str) -> Result<Self> {
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", address.trim_end_matches('/'))
        };
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::ConfigInvalid(format!("Invalid API client settings: {e}")))?;

        Ok(Self {
            base_url,
            namespace: namespace.to_string(),
            client,
        })
    }

    pub fn self_check_url(&self) -> String {
        format!("{}/{SELF_CHECK_PATH}", self.base_url)
    }

    async fn self_check(&self) -> Result<Vec<CheckResult>> {
        let url = self.self_check_url();
        debug!(%url, "Requesting control-plane self-check");

        let unreachable = |reason: String| Error::ControlPlaneUnreachable {
            namespace: self.namespace.clone(),
            reason,
        };

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| unreachable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(unreachable(format!("{status}: {}", body.trim())));
        }

        let body: SelfCheckResponse = response
            .json()
            .await
            .map_err(|e| unreachable(format!("invalid self-check response: {e}")))?;
        Ok(body.results)
    }
}

/// Talks to the control plane through the Kubernetes API server's service proxy.
#[derive(Debug, Clone)]
pub struct ProxiedApiClient {
    discovery: KubectlDiscovery,
    cluster: KubeContext,
    namespace: String,
}

impl ProxiedApiClient {
    pub fn new(discovery: KubectlDiscovery, cluster: KubeContext, namespace: &str) -> Self {
        Self {
            discovery,
            cluster,
            namespace: namespace.to_string(),
        }
    }

    pub fn self_check_path(&self) -> Result<String> {
        let selector: ServiceSelector = API_SERVICE.parse()?;
        Ok(format!("{}{SELF_CHECK_PATH}", selector.proxy_path(&self.namespace)))
    }

    async fn self_check(&self) -> Result<Vec<CheckResult>> {
        let path = self.self_check_path()?;
        debug!(%path, "Requesting control-plane self-check through the API server");

        let unreachable = |reason: String| Error::ControlPlaneUnreachable {
            namespace: self.namespace.clone(),
            reason,
        };

        let output = self
            .discovery
            .execute_with_input(
                &self.cluster,
                &["create", "--raw", path.as_str(), "-f", "-"],
                Some(b"{}".as_slice()),
            )
            .await
            .map_err(|e| unreachable(e.to_string()))?;

        let body: SelfCheckResponse = serde_json::from_str(&output)
            .map_err(|e| unreachable(format!("invalid self-check response: {e}")))?;
        Ok(body.results)
    }
}

/// The control-plane client chosen for this run.
#[derive(Debug, Clone)]
pub enum ApiClient {
    Direct(DirectApiClient),
    Proxied(ProxiedApiClient),
}

impl ApiClientPort for ApiClient {
    async fn self_check(&self) -> Result<Vec<CheckResult>> {
        match self {
            Self::Direct(client) => client.self_check().await,
            Self::Proxied(client) => client.self_check().await,
        }
    }
}

/// Builds `ApiClient`s, sharing one kubectl discovery.
#[derive(Debug, Clone)]
pub struct KubectlApiClientFactory {
    discovery: KubectlDiscovery,
    namespace: String,
}

impl KubectlApiClientFactory {
    pub fn new(discovery: KubectlDiscovery, namespace: &str) -> Self {
        Self {
            discovery,
            namespace: namespace.to_string(),
        }
    }
}

impl ApiClientFactory for KubectlApiClientFactory {
    type Client = ApiClient;

    fn build(&self, endpoint: ClusterEndpoint) -> Result<ApiClient> {
        match endpoint {
            ClusterEndpoint::Direct { address } => {
                DirectApiClient::new(&address, &self.namespace).map(ApiClient::Direct)
            }
            ClusterEndpoint::Proxied { cluster, namespace } => Ok(ApiClient::Proxied(
                ProxiedApiClient::new(self.discovery.clone(), cluster, &namespace),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_url() {
        let client = DirectApiClient::new("localhost:8085", "linkerd").unwrap();
        assert_eq!(client.self_check_url(), "http://localhost:8085/api/v1/SelfCheck");

        let client = DirectApiClient::new("https://api.example.com/", "linkerd").unwrap();
        assert_eq!(client.self_check_url(), "https://api.example.com/api/v1/SelfCheck");
    }

    #[test]
    fn test_proxied_path() {
        let client = ProxiedApiClient::new(
            KubectlDiscovery::with_path(None),
            KubeContext::default(),
            "mesh",
        );
        assert_eq!(
            client.self_check_path().unwrap(),
            "/api/v1/namespaces/mesh/services/linkerd-controller-api:http/proxy/api/v1/SelfCheck"
        );
    }

    #[test]
    fn test_factory_picks_variant() {
        let factory = KubectlApiClientFactory::new(KubectlDiscovery::with_path(None), "linkerd");

        let direct = factory
            .build(ClusterEndpoint::Direct {
                address: "10.0.0.5:8085".to_string(),
            })
            .unwrap();
        assert!(matches!(direct, ApiClient::Direct(_)));

        let proxied = factory
            .build(ClusterEndpoint::Proxied {
                cluster: KubeContext::default(),
                namespace: "linkerd".to_string(),
            })
            .unwrap();
        assert!(matches!(proxied, ApiClient::Proxied(_)));
    }

    #[tokio::test]
    async fn test_direct_transport_failure_is_unreachable() {
        // Port 1 on loopback refuses connections.
        let client = ApiClient::Direct(DirectApiClient::new("127.0.0.1:1", "linkerd").unwrap());
        assert!(matches!(
            client.self_check().await,
            Err(Error::ControlPlaneUnreachable { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_proxied_self_check() {
        use crate::adapters::kubectl::testing::fake_kubectl;

        let (_dir, path) = fake_kubectl(
            r#"cat >/dev/null; echo '{"results":[{"subsystemName":"linkerd-api","status":"FAIL","friendlyMessageToUser":"no pods"}]}'"#,
        );
        let client = ApiClient::Proxied(ProxiedApiClient::new(
            KubectlDiscovery::with_path(Some(path)),
            KubeContext::default(),
            "linkerd",
        ));

        let results = client.self_check().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].friendly_message_to_user, "no pods");
    }
}
