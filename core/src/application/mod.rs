//! Application layer - Use case services.
//!
//! Services are thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs

mod client_resolver;
mod health;
mod session;

#[cfg(test)]
pub(crate) mod mocks;

pub use client_resolver::ClientResolver;
pub use health::HealthVerifier;
pub use session::{DashboardUrls, Session, SessionState};
