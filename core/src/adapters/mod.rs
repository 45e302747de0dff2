//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Everything cluster-facing goes through kubectl.

pub mod api_client;
pub mod browser;
pub mod cluster;
pub mod kubectl;
pub mod tunnel;

// Re-export main types for convenience
pub use api_client::{ApiClient, DirectApiClient, KubectlApiClientFactory, ProxiedApiClient};
pub use browser::SystemBrowser;
pub use cluster::KubectlClusterApi;
pub use kubectl::{KubectlDiscovery, KubectlError};
pub use tunnel::{KubectlProxy, KubectlProxyOpener};
