//! Cluster meta-API port (interface).

use crate::domain::CheckResult;

/// Port for the Kubernetes API server's own self-check.
pub trait ClusterApiPort: Send + Sync {
    /// Run the cluster self-check (reachability, auth, version).
    ///
    /// Failures are reported as `FAIL` entries, never as errors.
    fn self_check(&self) -> impl std::future::Future<Output = Vec<CheckResult>> + Send;
}
