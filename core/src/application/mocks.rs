//! Mock port implementations shared by the application tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::adapters::tunnel::proxy_url;
use crate::domain::{CheckResult, ClusterEndpoint};
use crate::error::{Error, Result};
use crate::ports::{
    ApiClientFactory, ApiClientPort, BrowserPort, ClusterApiPort, TunnelOpener, TunnelPort,
};

/// Port a mock tunnel reports when asked for port `0`.
pub const ASSIGNED_PORT: u16 = 40123;

#[derive(Debug, Clone, Default)]
pub struct MockTunnelOpener {
    pub opens: Arc<AtomicUsize>,
    pub runs: Arc<AtomicUsize>,
    pub fail: bool,
    pub fail_resolve: bool,
}

impl TunnelOpener for MockTunnelOpener {
    type Tunnel = MockTunnel;

    async fn open(&self, namespace: &str, local_port: u16) -> Result<MockTunnel> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::TunnelInitFailed("port 8080 is already in use".to_string()));
        }
        Ok(MockTunnel {
            namespace: namespace.to_string(),
            port: if local_port == 0 { ASSIGNED_PORT } else { local_port },
            runs: self.runs.clone(),
            fail_resolve: self.fail_resolve,
        })
    }
}

#[derive(Debug)]
pub struct MockTunnel {
    namespace: String,
    port: u16,
    runs: Arc<AtomicUsize>,
    fail_resolve: bool,
}

impl TunnelPort for MockTunnel {
    fn resolve(&self, selector: &str) -> Result<String> {
        if self.fail_resolve {
            return Err(Error::ResolutionFailed {
                selector: selector.to_string(),
                reason: "service not found".to_string(),
            });
        }
        proxy_url("127.0.0.1", self.port, &self.namespace, selector)
    }

    async fn run(self, cancel: CancellationToken) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        cancel.cancelled().await;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockClusterApi {
    pub calls: Arc<AtomicUsize>,
    pub results: Vec<CheckResult>,
}

impl MockClusterApi {
    pub fn with_results(results: Vec<CheckResult>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }
}

impl ClusterApiPort for MockClusterApi {
    async fn self_check(&self) -> Vec<CheckResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results.clone()
    }
}

/// `None` simulates a transport failure.
#[derive(Debug, Clone, Default)]
pub struct MockApiClient {
    pub calls: Arc<AtomicUsize>,
    pub results: Option<Vec<CheckResult>>,
}

impl MockApiClient {
    pub fn healthy() -> Self {
        Self {
            results: Some(Vec::new()),
            ..Default::default()
        }
    }

    pub fn with_results(results: Vec<CheckResult>) -> Self {
        Self {
            results: Some(results),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }
}

impl ApiClientPort for MockApiClient {
    async fn self_check(&self) -> Result<Vec<CheckResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .clone()
            .ok_or_else(|| Error::ControlPlaneUnreachable {
                namespace: "linkerd".to_string(),
                reason: "connection refused".to_string(),
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockClientFactory {
    pub built: Arc<Mutex<Vec<ClusterEndpoint>>>,
    pub client: MockApiClient,
}

impl MockClientFactory {
    pub fn new(client: MockApiClient) -> Self {
        Self {
            client,
            ..Default::default()
        }
    }

    pub fn built(&self) -> Vec<ClusterEndpoint> {
        self.built.lock().unwrap().clone()
    }
}

impl ApiClientFactory for MockClientFactory {
    type Client = MockApiClient;

    fn build(&self, endpoint: ClusterEndpoint) -> Result<MockApiClient> {
        self.built.lock().unwrap().push(endpoint);
        Ok(self.client.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockBrowser {
    pub opened: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl MockBrowser {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl BrowserPort for MockBrowser {
    async fn open(&self, url: &str) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(Error::BrowserLaunchFailed {
                url: url.to_string(),
                reason: "no display".to_string(),
            });
        }
        Ok(())
    }
}
