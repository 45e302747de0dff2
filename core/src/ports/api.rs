//! Control-plane API client port (interface).

use crate::domain::{CheckResult, ClusterEndpoint};
use crate::error::Result;

/// A client able to ask the control plane for its self-check.
pub trait ApiClientPort: Send + Sync {
    /// Issue one self-check request.
    ///
    /// `Err` means the request could not be completed. A reachable but
    /// unhealthy control plane returns `Ok` with `FAIL` entries.
    fn self_check(&self) -> impl std::future::Future<Output = Result<Vec<CheckResult>>> + Send;
}

/// Builds an API client for a resolved endpoint.
pub trait ApiClientFactory: Send + Sync {
    type Client: ApiClientPort;

    fn build(&self, endpoint: ClusterEndpoint) -> Result<Self::Client>;
}
