//! Chooses how the control-plane API is reached and builds the client.

use tracing::debug;

use crate::domain::{first_failure, ClusterEndpoint, KubeContext};
use crate::error::{Error, Result};
use crate::ports::{ApiClientFactory, ClusterApiPort};

/// Produces exactly one API client per run.
///
/// A configured direct address always wins and skips the cluster self-check
/// entirely. Otherwise the cluster must pass its self-check before a proxied
/// client is built.
pub struct ClientResolver<K: ClusterApiPort, F: ApiClientFactory> {
    cluster_api: K,
    factory: F,
}

impl<K: ClusterApiPort, F: ApiClientFactory> ClientResolver<K, F> {
    pub fn new(cluster_api: K, factory: F) -> Self {
        Self {
            cluster_api,
            factory,
        }
    }

    /// Decide on an endpoint, running the cluster self-check when needed.
    pub async fn endpoint(
        &self,
        api_addr: Option<&str>,
        cluster: &KubeContext,
        namespace: &str,
    ) -> Result<ClusterEndpoint> {
        if let Some(address) = api_addr {
            debug!(address, "Using direct control-plane address");
            return Ok(ClusterEndpoint::Direct {
                address: address.to_string(),
            });
        }

        let results = self.cluster_api.self_check().await;
        if let Some(failure) = first_failure(&results) {
            return Err(Error::ClusterUnreachable {
                subsystem: failure.subsystem_name.clone(),
                message: failure.friendly_message_to_user.clone(),
            });
        }
        debug!(checks = results.len(), "Cluster self-check passed");

        Ok(ClusterEndpoint::Proxied {
            cluster: cluster.clone(),
            namespace: namespace.to_string(),
        })
    }

    /// Resolve the endpoint and build its client.
    pub async fn resolve(
        &self,
        api_addr: Option<&str>,
        cluster: &KubeContext,
        namespace: &str,
    ) -> Result<F::Client> {
        let endpoint = self.endpoint(api_addr, cluster, namespace).await?;
        debug!(kind = endpoint.kind(), "Building API client");
        self.factory.build(endpoint)
    }
}
