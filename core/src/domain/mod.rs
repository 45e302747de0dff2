//! Domain layer - Pure data models.
//!
//! These types have no I/O dependencies and can be tested in isolation.

mod check;
mod endpoint;
mod presentation;
mod selector;

pub use check::{first_failure, CheckResult, CheckStatus, SelfCheckResponse};
pub use endpoint::{ClusterEndpoint, KubeContext};
pub use presentation::PresentationMode;
pub use selector::{ServiceSelector, PRIMARY_SERVICE, SECONDARY_SERVICE};
