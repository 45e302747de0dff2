//! Browser launcher port (interface).

use crate::error::Result;

/// Port for opening a URL in the operator's browser.
pub trait BrowserPort: Send + Sync {
    fn open(&self, url: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
