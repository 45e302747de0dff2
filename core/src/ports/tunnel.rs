//! Tunnel port (interface).

use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Creates tunnels into a remote namespace.
pub trait TunnelOpener: Send + Sync {
    type Tunnel: TunnelPort;

    /// Open a tunnel on `local_port` (`0` lets the OS pick a free port).
    fn open(
        &self,
        namespace: &str,
        local_port: u16,
    ) -> impl std::future::Future<Output = Result<Self::Tunnel>> + Send;
}

/// An open local-to-remote forwarding channel.
pub trait TunnelPort: Send {
    /// Map a `<service>:<port>` selector to a local URL.
    ///
    /// Pure with respect to the tunnel's state; may be called any number of times.
    fn resolve(&self, selector: &str) -> Result<String>;

    /// Serve until `cancel` fires.
    ///
    /// Consumes the tunnel, so it can only run once.
    fn run(
        self,
        cancel: CancellationToken,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
